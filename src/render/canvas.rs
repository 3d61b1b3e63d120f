//! Drawing primitives for one card pass. Every helper returns `None` when the surface rejects
//! an operation, which aborts the pass.

// crates.io
use image::{
	GrayImage, RgbaImage,
	imageops::{self, FilterType},
};
use tiny_skia::{
	Color, FillRule, GradientStop, IntSize, LinearGradient, Mask, Paint, Path, Pixmap,
	PixmapPaint, Point, Rect, SpreadMode, Transform,
};
// self
use crate::render::{layout::*, typeface::Typeface};

/// Converts straight-alpha RGBA into a premultiplied pixmap.
pub(crate) fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
	let size = IntSize::from_wh(image.width(), image.height())?;
	let mut data = image.as_raw().clone();

	for px in data.chunks_exact_mut(4) {
		let alpha = u16::from(px[3]);

		for channel in &mut px[..3] {
			*channel = ((u16::from(*channel) * alpha + 127) / 255) as u8;
		}
	}

	Pixmap::from_vec(data, size)
}

/// Fills the canvas with `base`, then overlays the legibility gradient when requested.
pub(crate) fn paint_background(pixmap: &mut Pixmap, base: [u8; 3], gradient: bool) -> Option<()> {
	pixmap.fill(Color::from_rgba8(base[0], base[1], base[2], 255));

	if !gradient {
		return Some(());
	}

	let height = pixmap.height() as f32;
	let mut paint = Paint::default();

	paint.shader = LinearGradient::new(
		Point::from_xy(0., 0.),
		Point::from_xy(0., height),
		vec![
			GradientStop::new(0., Color::from_rgba(0., 0., 0., 0.)?),
			GradientStop::new(1., Color::from_rgba(0., 0., 0., GRADIENT_END_ALPHA)?),
		],
		SpreadMode::Pad,
		Transform::identity(),
	)?;
	pixmap.fill_rect(full_rect(pixmap)?, &paint, Transform::identity(), None);

	Some(())
}

/// Draws the blurred drop shadow of `outline`, offset downwards.
pub(crate) fn paint_shadow(pixmap: &mut Pixmap, outline: &Path) -> Option<()> {
	let (width, height) = (pixmap.width(), pixmap.height());
	let mut mask = Mask::new(width, height)?;

	mask.fill_path(
		outline,
		FillRule::Winding,
		true,
		Transform::from_translate(0., SHADOW_OFFSET_Y),
	);

	let sharp = GrayImage::from_raw(width, height, mask.data().to_vec())?;
	let blurred = imageops::fast_blur(&sharp, SHADOW_BLUR / 2.);

	mask.data_mut().copy_from_slice(blurred.as_raw());

	let mut paint = Paint::default();

	paint.set_color(Color::from_rgba(0., 0., 0., SHADOW_ALPHA)?);
	pixmap.fill_rect(full_rect(pixmap)?, &paint, Transform::identity(), Some(&mask));

	Some(())
}

/// Draws `cover` scaled to the cover square and clipped to `outline`.
pub(crate) fn paint_cover(pixmap: &mut Pixmap, cover: &RgbaImage, outline: &Path) -> Option<()> {
	let scaled = imageops::resize(cover, COVER_SIZE, COVER_SIZE, FilterType::Lanczos3);
	let cover = to_pixmap(&scaled)?;
	let mut clip = Mask::new(pixmap.width(), pixmap.height())?;

	clip.fill_path(outline, FillRule::Winding, true, Transform::identity());
	pixmap.draw_pixmap(
		COVER_LEFT as i32,
		COVER_TOP as i32,
		cover.as_ref(),
		&PixmapPaint::default(),
		Transform::identity(),
		Some(&clip),
	);

	Some(())
}

/// Draws caption `lines` in white, one baseline per line.
pub(crate) fn paint_caption(
	pixmap: &mut Pixmap,
	face: &dyn Typeface,
	lines: &[String],
) -> Option<()> {
	let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
	let mut mask = Mask::new(pixmap.width(), pixmap.height())?;
	let coverage = mask.data_mut();

	for (index, line) in lines.iter().enumerate() {
		let origin = (CAPTION_LEFT as f32, caption_baseline(index));

		face.rasterize(line, CAPTION_PX, origin, &mut |x, y, v| {
			if (0..width).contains(&x) && (0..height).contains(&y) {
				let cell = &mut coverage[(y * width + x) as usize];

				*cell = (*cell).max((v.clamp(0., 1.) * 255.).round() as u8);
			}
		});
	}

	let mut paint = Paint::default();

	paint.set_color(Color::WHITE);
	pixmap.fill_rect(full_rect(pixmap)?, &paint, Transform::identity(), Some(&mask));

	Some(())
}

/// Draws `logo` scaled into the logo square.
pub(crate) fn paint_logo(pixmap: &mut Pixmap, logo: &RgbaImage) -> Option<()> {
	let scaled = imageops::resize(logo, LOGO_SIZE, LOGO_SIZE, FilterType::Lanczos3);
	let logo = to_pixmap(&scaled)?;

	pixmap.draw_pixmap(
		LOGO_LEFT as i32,
		LOGO_TOP as i32,
		logo.as_ref(),
		&PixmapPaint::default(),
		Transform::identity(),
		None,
	);

	Some(())
}

fn full_rect(pixmap: &Pixmap) -> Option<Rect> {
	Rect::from_xywh(0., 0., pixmap.width() as f32, pixmap.height() as f32)
}

#[cfg(test)]
mod tests {
	// crates.io
	use image::Rgba;
	// self
	use super::*;

	#[test]
	fn premultiplies_alpha() {
		let image = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 128]));
		let pixmap = to_pixmap(&image).expect("Pixmap should build.");
		let px = pixmap.pixel(0, 0).expect("Pixel should exist.");

		assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (100, 50, 25, 128));
	}

	#[test]
	fn flat_background_has_no_gradient() {
		let mut pixmap = Pixmap::new(4, 8).expect("Pixmap should allocate.");

		paint_background(&mut pixmap, FLAT_BACKGROUND, false).expect("Background should paint.");

		let bottom = pixmap.pixel(0, 7).expect("Pixel should exist.");

		assert_eq!((bottom.red(), bottom.green(), bottom.blue()), (0x12, 0x12, 0x12));
	}

	#[test]
	fn gradient_darkens_towards_the_bottom() {
		let mut pixmap = Pixmap::new(4, 100).expect("Pixmap should allocate.");

		paint_background(&mut pixmap, [200, 200, 200], true).expect("Background should paint.");

		let top = pixmap.pixel(0, 0).expect("Pixel should exist.");
		let bottom = pixmap.pixel(0, 99).expect("Pixel should exist.");

		assert!(top.red() >= 195, "top was {}", top.red());
		assert!(bottom.red() < 150, "bottom was {}", bottom.red());
	}

	#[test]
	fn cover_is_clipped_to_rounded_corners() {
		let mut pixmap =
			Pixmap::new(CANVAS_WIDTH, CANVAS_HEIGHT).expect("Canvas should allocate.");
		let cover = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
		let outline = cover_outline().expect("Outline should build.");

		paint_cover(&mut pixmap, &cover, &outline).expect("Cover should paint.");

		let corner = pixmap.pixel(COVER_LEFT, COVER_TOP).expect("Pixel should exist.");
		let center = pixmap.pixel(540, 540).expect("Pixel should exist.");

		assert_eq!(corner.alpha(), 0);
		assert_eq!((center.red(), center.alpha()), (255, 255));
	}
}
