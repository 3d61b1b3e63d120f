//! Generation-guarded card compositor.

// std
use std::{
	fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
};
// crates.io
use image::RgbaImage;
use tiny_skia::Pixmap;
// self
use crate::{
	_prelude::*,
	catalog::EntityMetadata,
	error::RenderError,
	obs::{self, FlowKind, FlowSpan},
	render::{
		assets::{AssetSource, FontProvider},
		caption::{compose_caption, wrap_lines},
		canvas,
		layout::*,
		palette,
		typeface::Typeface,
	},
};

/// File name used when saving a card.
pub const EXPORT_FILE_NAME: &str = "track_info.png";

/// Background variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background {
	/// Fixed dark color.
	Flat,
	/// Dominant cover color under a darkening gradient.
	#[default]
	Palette,
}

/// Summary of a committed card.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedCard {
	/// Generation the card was drawn for.
	pub generation: u64,
	/// Full caption text.
	pub caption: String,
	/// Caption after wrapping.
	pub lines: Vec<String>,
	/// Base background color that was painted.
	pub background: [u8; 3],
}

/// Result of one render pass.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutcome {
	/// The card was drawn and committed to the surface.
	Drawn(RenderedCard),
	/// A newer pass started before this one finished; nothing was committed.
	Superseded,
	/// The drawing surface was unavailable; nothing was committed.
	Aborted,
}

/// Composes cards onto a single shared surface.
pub struct Compositor {
	assets: Arc<dyn AssetSource>,
	font: Arc<dyn FontProvider>,
	logo_location: String,
	background: Background,
	generation: AtomicU64,
	surface: Mutex<Option<Pixmap>>,
}
impl Compositor {
	/// Creates a compositor loading images from `assets` and the caption face from `font`.
	pub fn new(
		assets: Arc<dyn AssetSource>,
		font: Arc<dyn FontProvider>,
		logo_location: impl Into<String>,
	) -> Self {
		Self {
			assets,
			font,
			logo_location: logo_location.into(),
			background: Background::default(),
			generation: AtomicU64::new(0),
			surface: Mutex::new(None),
		}
	}

	/// Selects the background variant.
	pub fn with_background(mut self, background: Background) -> Self {
		self.background = background;

		self
	}

	/// Generation of the most recently started pass.
	pub fn current_generation(&self) -> u64 {
		self.generation.load(Ordering::SeqCst)
	}

	/// Renders a card for `metadata` and the raw `statistic`.
	///
	/// Cover, face, and logo are loaded concurrently and joined before anything is drawn. If
	/// another pass starts meanwhile, this one returns [`RenderOutcome::Superseded`] and leaves
	/// the surface untouched.
	pub async fn render(
		&self,
		metadata: &EntityMetadata,
		statistic: &str,
	) -> Result<RenderOutcome> {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

		obs::observe(FlowKind::Render, "render", async move {
			let (cover, face, logo) = futures::join!(
				self.load_image("cover", &metadata.cover_image_url),
				self.font.ready(),
				self.load_image("logo", &self.logo_location),
			);

			if self.is_stale(generation) {
				tracing::debug!(generation, "discarding superseded render");

				return Ok(RenderOutcome::Superseded);
			}

			let (cover, face, logo) = (cover?, face?, logo?);
			let caption = compose_caption(metadata, statistic);
			let lines =
				wrap_lines(&caption, CAPTION_MAX_WIDTH, |text| face.measure(text, CAPTION_PX));
			let Some((pixmap, background)) = self.draw(&cover, face.as_ref(), &lines, &logo) else {
				tracing::warn!(generation, "drawing surface unavailable, render aborted");

				return Ok(RenderOutcome::Aborted);
			};
			let mut surface = self.surface.lock();

			if self.is_stale(generation) {
				tracing::debug!(generation, "discarding superseded render");

				return Ok(RenderOutcome::Superseded);
			}

			*surface = Some(pixmap);

			Ok(RenderOutcome::Drawn(RenderedCard { generation, caption, lines, background }))
		})
		.await
	}

	/// PNG bytes of the last committed card.
	pub fn export_png(&self) -> Result<Vec<u8>> {
		let surface = self.surface.lock();
		let pixmap = surface.as_ref().ok_or(RenderError::NothingRendered)?;

		pixmap.encode_png().map_err(|e| RenderError::Encode { message: e.to_string() }.into())
	}

	/// Writes the last committed card to `dir/track_info.png` and returns the path.
	pub fn save_png(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
		let bytes = self.export_png()?;
		let path = dir.as_ref().join(EXPORT_FILE_NAME);

		fs::write(&path, bytes)
			.map_err(|source| RenderError::Write { path: path.display().to_string(), source })?;

		Ok(path)
	}

	async fn load_image(
		&self,
		what: &'static str,
		location: &str,
	) -> Result<RgbaImage, RenderError> {
		let bytes = self.assets.load(what, location).await?;
		let image = image::load_from_memory(&bytes)
			.map_err(|source| RenderError::Decode { what, source })?;

		Ok(image.to_rgba8())
	}

	fn is_stale(&self, generation: u64) -> bool {
		self.generation.load(Ordering::SeqCst) != generation
	}

	fn draw(
		&self,
		cover: &RgbaImage,
		face: &dyn Typeface,
		lines: &[String],
		logo: &RgbaImage,
	) -> Option<(Pixmap, [u8; 3])> {
		let _span = FlowSpan::new(FlowKind::Render, "draw").entered();
		let mut pixmap = Pixmap::new(CANVAS_WIDTH, CANVAS_HEIGHT)?;
		let outline = cover_outline()?;
		let background = match self.background {
			Background::Flat => FLAT_BACKGROUND,
			Background::Palette => palette::dominant_color(cover).unwrap_or_else(|| {
				tracing::debug!("palette extraction yielded nothing, using fallback background");

				PALETTE_FALLBACK
			}),
		};

		canvas::paint_background(&mut pixmap, background, self.background == Background::Palette)?;
		canvas::paint_shadow(&mut pixmap, &outline)?;
		canvas::paint_cover(&mut pixmap, cover, &outline)?;
		canvas::paint_caption(&mut pixmap, face, lines)?;
		canvas::paint_logo(&mut pixmap, logo)?;

		Some((pixmap, background))
	}
}
impl Debug for Compositor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Compositor")
			.field("logo_location", &self.logo_location)
			.field("background", &self.background)
			.field("generation", &self.current_generation())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use image::Rgba;
	// self
	use super::*;
	use crate::{
		_preludet::{BlockFace, solid_png},
		catalog::Artist,
		render::assets::{MemoryAssets, ReadyFont},
		resolve::EntityType,
	};

	fn compositor(assets: MemoryAssets) -> Compositor {
		Compositor::new(Arc::new(assets), Arc::new(ReadyFont(Arc::new(BlockFace::default()))), "logo")
	}

	fn metadata(cover: &str) -> EntityMetadata {
		EntityMetadata {
			kind: EntityType::Track,
			name: "Foo".into(),
			artists: vec![Artist { name: "A".into() }],
			cover_image_url: cover.into(),
		}
	}

	#[test]
	fn export_before_any_render_fails() {
		let err = compositor(MemoryAssets::default()).export_png().expect_err("Nothing drawn yet.");

		assert!(matches!(err, Error::Render(RenderError::NothingRendered)));
	}

	#[tokio::test]
	async fn flat_background_is_reported() {
		let assets = MemoryAssets::default()
			.with("cover", solid_png(4, 4, [250, 250, 250, 255]))
			.with("logo", solid_png(2, 2, [0, 0, 255, 255]));
		let compositor = compositor(assets).with_background(Background::Flat);
		let outcome = compositor.render(&metadata("cover"), "500").await.expect("Render should succeed.");

		assert!(matches!(
			outcome,
			RenderOutcome::Drawn(RenderedCard { generation: 1, background: FLAT_BACKGROUND, .. })
		));
	}

	#[tokio::test]
	async fn palette_background_uses_the_first_cover_swatch() {
		let assets = MemoryAssets::default()
			.with("cover", solid_png(16, 16, [200, 30, 30, 255]))
			.with("logo", solid_png(2, 2, [0, 0, 255, 255]));
		let cover = RgbaImage::from_pixel(16, 16, Rgba([200, 30, 30, 255]));
		let expected =
			palette::dominant_color(&cover).expect("An opaque cover should yield a swatch.");
		let outcome =
			compositor(assets).render(&metadata("cover"), "500").await.expect("Render should succeed.");

		assert_ne!(expected, PALETTE_FALLBACK);
		assert!(matches!(
			outcome,
			RenderOutcome::Drawn(RenderedCard { background, .. }) if background == expected
		));
	}

	#[tokio::test]
	async fn cover_without_palette_falls_back() {
		let assets = MemoryAssets::default()
			.with("cover", solid_png(16, 16, [200, 30, 30, 0]))
			.with("logo", solid_png(2, 2, [0, 0, 255, 255]));
		let outcome =
			compositor(assets).render(&metadata("cover"), "500").await.expect("Render should succeed.");

		assert!(matches!(
			outcome,
			RenderOutcome::Drawn(RenderedCard { background: PALETTE_FALLBACK, .. })
		));
	}

	#[tokio::test]
	async fn palette_gradient_darkens_towards_the_bottom() {
		let assets = MemoryAssets::default()
			.with("cover", solid_png(16, 16, [200, 30, 30, 255]))
			.with("logo", solid_png(2, 2, [0, 0, 255, 255]));
		let compositor = compositor(assets);
		let outcome =
			compositor.render(&metadata("cover"), "500").await.expect("Render should succeed.");
		let RenderOutcome::Drawn(card) = outcome else {
			panic!("Render should commit.");
		};
		let png = compositor.export_png().expect("Committed card should export.");
		let image = image::load_from_memory(&png).expect("Export should decode.").to_rgba8();
		let top = image.get_pixel(5, 5);
		let bottom = image.get_pixel(5, CANVAS_HEIGHT - 5);

		assert!(top[0].abs_diff(card.background[0]) <= 2, "top {top:?} vs {:?}", card.background);
		assert!(bottom[0] < top[0], "bottom {bottom:?} should be darker than top {top:?}");
		assert!(bottom[0] > card.background[0] / 2, "gradient ends at partial opacity");
	}

	#[tokio::test]
	async fn undecodable_cover_fails_without_committing() {
		let assets = MemoryAssets::default()
			.with("cover", b"not an image".to_vec())
			.with("logo", solid_png(2, 2, [0, 0, 255, 255]));
		let compositor = compositor(assets);
		let err = compositor.render(&metadata("cover"), "500").await.expect_err("Decode should fail.");

		assert!(matches!(err, Error::Render(RenderError::Decode { what: "cover", .. })));
		assert!(compositor.export_png().is_err());
	}
}
