//! Fixed card geometry.

// crates.io
use tiny_skia::{Path, PathBuilder};

/// Canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 1080;
/// Canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 1920;

/// Cover edge length.
pub const COVER_SIZE: u32 = 920;
/// Cover left edge; centers the cover horizontally.
pub const COVER_LEFT: u32 = (CANVAS_WIDTH - COVER_SIZE) / 2;
/// Cover top edge.
pub const COVER_TOP: u32 = 80;
/// Cover corner radius.
pub const COVER_RADIUS: f32 = 40.;

/// Vertical shadow offset.
pub const SHADOW_OFFSET_Y: f32 = 12.;
/// Shadow blur radius.
pub const SHADOW_BLUR: f32 = 20.;
/// Shadow opacity.
pub const SHADOW_ALPHA: f32 = 0.4;

/// Caption face size.
pub const CAPTION_PX: f32 = 65.;
/// Caption left edge, aligned with the cover.
pub const CAPTION_LEFT: u32 = COVER_LEFT;
/// Widest line the caption may occupy.
pub const CAPTION_MAX_WIDTH: f32 = COVER_SIZE as f32;
/// Baseline of the first caption line.
pub const CAPTION_FIRST_BASELINE: u32 = COVER_TOP + COVER_SIZE + 80;
/// Distance between caption baselines.
pub const CAPTION_LINE_HEIGHT: u32 = 80;

/// Logo edge length.
pub const LOGO_SIZE: u32 = 150;
/// Logo left edge; centers the logo horizontally.
pub const LOGO_LEFT: u32 = (CANVAS_WIDTH - LOGO_SIZE) / 2;
/// Logo top edge, 40px above the bottom of the canvas.
pub const LOGO_TOP: u32 = CANVAS_HEIGHT - LOGO_SIZE - 40;

/// Flat background color.
pub const FLAT_BACKGROUND: [u8; 3] = [0x12, 0x12, 0x12];
/// Background used when no dominant color can be extracted.
pub const PALETTE_FALLBACK: [u8; 3] = [0x20, 0x20, 0x20];
/// Opacity of the black gradient at the bottom edge.
pub const GRADIENT_END_ALPHA: f32 = 0.3;

/// Baseline of caption line `index`.
pub fn caption_baseline(index: usize) -> f32 {
	(CAPTION_FIRST_BASELINE + CAPTION_LINE_HEIGHT * index as u32) as f32
}

/// Rounded rectangle made of four edges and four quadratic corners.
pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
	let mut pb = PathBuilder::new();

	pb.move_to(x + r, y);
	pb.line_to(x + w - r, y);
	pb.quad_to(x + w, y, x + w, y + r);
	pb.line_to(x + w, y + h - r);
	pb.quad_to(x + w, y + h, x + w - r, y + h);
	pb.line_to(x + r, y + h);
	pb.quad_to(x, y + h, x, y + h - r);
	pb.line_to(x, y + r);
	pb.quad_to(x, y, x + r, y);
	pb.close();

	pb.finish()
}

/// Outline of the cover on the canvas.
pub fn cover_outline() -> Option<Path> {
	rounded_rect(
		COVER_LEFT as f32,
		COVER_TOP as f32,
		COVER_SIZE as f32,
		COVER_SIZE as f32,
		COVER_RADIUS,
	)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn geometry_is_centered() {
		assert_eq!(COVER_LEFT, 80);
		assert_eq!(LOGO_LEFT, 465);
		assert_eq!(LOGO_TOP, 1730);
		assert_eq!(caption_baseline(0), 1080.);
		assert_eq!(caption_baseline(2), 1240.);
	}

	#[test]
	fn cover_outline_spans_the_cover_square() {
		let bounds = cover_outline().expect("Cover outline should build.").bounds();

		assert_eq!(bounds.left(), 80.);
		assert_eq!(bounds.top(), 80.);
		assert_eq!(bounds.right(), 1000.);
		assert_eq!(bounds.bottom(), 1000.);
	}
}
