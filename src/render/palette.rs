//! Dominant color extraction for the palette background.

// crates.io
use color_thief::ColorFormat;
use image::RgbaImage;

/// Sampling step handed to the quantizer (1 = every pixel).
pub const PALETTE_QUALITY: u8 = 10;
/// Swatches requested from the quantizer.
pub const PALETTE_SIZE: u8 = 10;

/// Returns the first swatch of a 10-color palette, or `None` when the image yields nothing.
///
/// Pixels that are mostly transparent or near-white are ignored; a cover made only of those
/// has no palette.
pub fn dominant_color(image: &RgbaImage) -> Option<[u8; 3]> {
	if !has_samples(image) {
		return None;
	}

	let palette =
		color_thief::get_palette(image.as_raw(), ColorFormat::Rgba, PALETTE_QUALITY, PALETTE_SIZE)
			.ok()?;

	palette.first().map(|swatch| [swatch.r, swatch.g, swatch.b])
}

// The quantizer walks every `4 * quality`-th pixel and skips the same pixels; with nothing left
// it reports a synthetic white swatch instead of failing.
fn has_samples(image: &RgbaImage) -> bool {
	image
		.pixels()
		.step_by(4 * PALETTE_QUALITY as usize)
		.any(|px| px[3] >= 125 && !(px[0] > 250 && px[1] > 250 && px[2] > 250))
}
