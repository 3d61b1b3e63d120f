//! Caption faces.

// crates.io
use rusttype::{Font, Scale, point};
// self
use crate::_prelude::*;

/// Face used to measure and rasterize caption lines.
pub trait Typeface
where
	Self: Send + Sync,
{
	/// Horizontal advance of `text` at `px` pixels.
	fn measure(&self, text: &str, px: f32) -> f32;

	/// Rasterizes `text` with its baseline origin at `origin`, reporting per-pixel coverage in
	/// `0.0..=1.0` through `plot(x, y, coverage)`.
	fn rasterize(
		&self,
		text: &str,
		px: f32,
		origin: (f32, f32),
		plot: &mut dyn FnMut(i32, i32, f32),
	);
}

/// TrueType/OpenType face parsed with `rusttype`.
#[derive(Clone)]
pub struct RustTypeface {
	font: Font<'static>,
}
impl RustTypeface {
	/// Parses font file bytes, returning `None` when they are not a usable face.
	pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
		Font::try_from_vec(bytes).map(|font| Self { font })
	}
}
impl Debug for RustTypeface {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RustTypeface").field("glyphs", &self.font.glyph_count()).finish()
	}
}
impl Typeface for RustTypeface {
	fn measure(&self, text: &str, px: f32) -> f32 {
		self.font
			.layout(text, Scale::uniform(px), point(0., 0.))
			.last()
			.map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
			.unwrap_or(0.)
	}

	fn rasterize(
		&self,
		text: &str,
		px: f32,
		origin: (f32, f32),
		plot: &mut dyn FnMut(i32, i32, f32),
	) {
		for glyph in self.font.layout(text, Scale::uniform(px), point(origin.0, origin.1)) {
			if let Some(bb) = glyph.pixel_bounding_box() {
				glyph.draw(|gx, gy, v| plot(bb.min.x + gx as i32, bb.min.y + gy as i32, v));
			}
		}
	}
}
