//! Command-line front end: look up catalog entities and render promotional cards.

// std
use std::{path::PathBuf, sync::Arc};
// crates.io
use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::eyre};
use tracing_subscriber::EnvFilter;
// self
use track_card::{
	config::Settings,
	render::{AssetFont, AssetSource, Background, Compositor, RenderOutcome, RoutedAssets},
	resolve::{EntityRef, EntityType},
};

#[derive(Debug, Parser)]
#[command(name = "track-card", version, about)]
struct Cli {
	#[command(subcommand)]
	cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Print the raw catalog JSON for a track or album.
	Lookup(LookupArgs),
	/// Render a promotional card for a track.
	Render(RenderArgs),
}

#[derive(Debug, Parser)]
struct LookupArgs {
	/// Identifier, web link, or `spotify:` URI.
	input: String,

	/// Treat the input as an album.
	#[arg(long, default_value_t = false)]
	album: bool,
}

#[derive(Debug, Parser)]
struct RenderArgs {
	/// Identifier, web link, or `spotify:` URI.
	input: String,

	/// Stream count to feature in the caption.
	streams: String,

	/// Bold caption font file.
	#[arg(long)]
	font: PathBuf,

	/// Logo image file.
	#[arg(long)]
	logo: PathBuf,

	/// Directory `track_info.png` is written to.
	#[arg(long, default_value = ".")]
	out: PathBuf,

	/// Use the flat background instead of the cover palette.
	#[arg(long, default_value_t = false)]
	flat: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let cli = Cli::parse();
	let settings = Settings::from_env()?;

	match cli.cmd {
		Command::Lookup(args) => lookup(&settings, args).await,
		Command::Render(args) => render(&settings, args).await,
	}
}

async fn lookup(settings: &Settings, args: LookupArgs) -> Result<()> {
	let kind = if args.album { EntityType::Album } else { EntityType::Track };
	let entity = EntityRef::parse(&args.input, kind)?;
	let raw = settings.catalog()?.fetch_raw(&entity).await?;

	println!("{}", serde_json::to_string_pretty(&raw)?);

	Ok(())
}

async fn render(settings: &Settings, args: RenderArgs) -> Result<()> {
	let entity = EntityRef::parse(&args.input, EntityType::Track)?;
	let metadata = settings.catalog()?.fetch_entity(&entity).await?;
	let assets: Arc<dyn AssetSource> = Arc::new(RoutedAssets::default());
	let font = Arc::new(AssetFont::new(assets.clone(), args.font.display().to_string()));
	let background = if args.flat { Background::Flat } else { Background::Palette };
	let compositor = Compositor::new(assets, font, args.logo.display().to_string())
		.with_background(background);

	match compositor.render(&metadata, &args.streams).await? {
		RenderOutcome::Drawn(card) => {
			let path = compositor.save_png(&args.out)?;

			println!("{}", card.caption);
			println!("Saved {}.", path.display());

			Ok(())
		},
		outcome => Err(eyre!("Card was not drawn: {outcome:?}.")),
	}
}
