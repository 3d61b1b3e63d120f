// crates.io
use tokio::sync::Notify;
// self
use track_card::{
	_preludet::*,
	catalog::{Artist, EntityMetadata},
	error::RenderError,
	render::{
		AssetFuture, AssetSource, Background, Compositor, MemoryAssets, ReadyFont, RenderOutcome,
		layout::{CANVAS_HEIGHT, CANVAS_WIDTH},
	},
	resolve::EntityType,
};

struct GatedAssets {
	inner: MemoryAssets,
	gated: &'static str,
	gate: Arc<Notify>,
}
impl AssetSource for GatedAssets {
	fn load<'a>(&'a self, what: &'static str, location: &'a str) -> AssetFuture<'a> {
		Box::pin(async move {
			if location == self.gated {
				self.gate.notified().await;
			}

			self.inner.load(what, location).await
		})
	}
}

fn assets() -> MemoryAssets {
	MemoryAssets::default()
		.with("cover-a", ramp_png(32, 32, 220))
		.with("cover-b", solid_png(32, 32, [40, 40, 220, 255]))
		.with("logo", solid_png(16, 16, [255, 255, 255, 255]))
}

fn metadata(name: &str, cover: &str) -> EntityMetadata {
	EntityMetadata {
		kind: EntityType::Track,
		name: name.into(),
		artists: vec![Artist { name: "A".into() }, Artist { name: "B".into() }],
		cover_image_url: cover.into(),
	}
}

fn compositor(source: Arc<dyn AssetSource>) -> Compositor {
	Compositor::new(source, Arc::new(ReadyFont(Arc::new(BlockFace::default()))), "logo")
}

#[tokio::test]
async fn drawn_card_exports_full_size_png() {
	let compositor = compositor(Arc::new(assets()));
	let outcome = compositor
		.render(&metadata("Foo", "cover-a"), "1500000")
		.await
		.expect("Render should succeed.");
	let RenderOutcome::Drawn(card) = outcome else {
		panic!("Expected a drawn card, got {outcome:?}.");
	};

	assert_eq!(card.caption, "A and B just passed 1.5 million streams on their song, \"Foo\".");
	assert_eq!(card.lines.join(" "), card.caption);
	assert!(card.lines.len() > 1);

	let png = compositor.export_png().expect("Export should succeed.");
	let decoded = image::load_from_memory(&png).expect("Export should be a valid PNG.");

	assert_eq!((decoded.width(), decoded.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));

	let rgba = decoded.to_rgba8();

	// Cover center, caption block, logo center.
	assert!(rgba.get_pixel(540, 540)[0] > 200);
	assert_eq!(rgba.get_pixel(1060, 1900)[3], 255);
	assert_eq!(rgba.get_pixel(540, 1805).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn superseded_render_never_reaches_the_surface() {
	let gate = Arc::new(Notify::new());
	let source = GatedAssets { inner: assets(), gated: "cover-a", gate: gate.clone() };
	let compositor = compositor(Arc::new(source)).with_background(Background::Flat);
	let stale = metadata("Stale", "cover-a");
	let fresh = metadata("Fresh", "cover-b");
	let mut pending = Box::pin(compositor.render(&stale, "10"));

	// The stale pass has claimed its generation and is parked on the cover.
	assert!(futures::poll!(&mut pending).is_pending());

	let second = compositor.render(&fresh, "20").await;

	gate.notify_one();

	let first = pending.await;

	assert_eq!(first.expect("Stale render should resolve."), RenderOutcome::Superseded);

	let RenderOutcome::Drawn(card) = second.expect("Fresh render should succeed.") else {
		panic!("Fresh render should be drawn.");
	};

	assert_eq!(card.generation, 2);
	assert!(card.caption.contains("\"Fresh\""));
	assert_eq!(compositor.current_generation(), 2);

	let rgba = image::load_from_memory(&compositor.export_png().expect("Export should succeed."))
		.expect("Export should be a valid PNG.")
		.to_rgba8();

	// The fresh (blue) cover is what was committed.
	let center = rgba.get_pixel(540, 540);

	assert!(center[2] > 200 && center[0] < 80, "unexpected cover pixel {center:?}");
}

#[tokio::test]
async fn missing_logo_fails_the_pass() {
	let source = MemoryAssets::default().with("cover-a", solid_png(8, 8, [1, 2, 3, 255]));
	let compositor = compositor(Arc::new(source));
	let err = compositor
		.render(&metadata("Foo", "cover-a"), "1")
		.await
		.expect_err("Missing logo should fail.");

	assert!(matches!(err, Error::Render(RenderError::Asset { what: "logo", .. })));
}

#[tokio::test]
async fn save_png_writes_track_info() {
	let compositor = compositor(Arc::new(assets()));

	compositor.render(&metadata("Foo", "cover-a"), "42").await.expect("Render should succeed.");

	let dir = std::env::temp_dir().join(format!("track_card_save_{}", std::process::id()));

	std::fs::create_dir_all(&dir).expect("Output directory should be created.");

	let path = compositor.save_png(&dir).expect("Save should succeed.");

	assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("track_info.png"));
	assert!(std::fs::metadata(&path).expect("Saved file should exist.").len() > 0);

	std::fs::remove_dir_all(&dir).expect("Output directory should be removed.");
}
