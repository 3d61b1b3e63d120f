//! Resource loading for render passes: cover and logo bytes plus the caption face.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	error::RenderError,
	render::typeface::{RustTypeface, Typeface},
};

/// Boxed future returned by [`AssetSource::load`].
pub type AssetFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, RenderError>> + 'a + Send>>;
/// Boxed future returned by [`FontProvider::ready`].
pub type FontFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Arc<dyn Typeface>, RenderError>> + 'a + Send>>;

/// Fetches raw resource bytes by location.
pub trait AssetSource
where
	Self: Send + Sync,
{
	/// Loads the resource at `location`; `what` names it in errors (`cover`, `logo`, `font`).
	fn load<'a>(&'a self, what: &'static str, location: &'a str) -> AssetFuture<'a>;
}

/// Resolves once the caption face is parsed and usable.
pub trait FontProvider
where
	Self: Send + Sync,
{
	/// Waits for the face to be ready.
	fn ready(&self) -> FontFuture<'_>;
}

/// Loads resources over HTTP(S).
#[derive(Clone, Debug, Default)]
pub struct HttpAssets {
	client: ReqwestClient,
}
impl HttpAssets {
	/// Reuses the caller-provided reqwest client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client }
	}
}
impl AssetSource for HttpAssets {
	fn load<'a>(&'a self, what: &'static str, location: &'a str) -> AssetFuture<'a> {
		Box::pin(async move {
			let failed = |message: String| RenderError::Asset {
				what,
				location: location.to_owned(),
				message,
			};
			let response =
				self.client.get(location).send().await.map_err(|e| failed(e.to_string()))?;
			let status = response.status();

			if !status.is_success() {
				return Err(failed(format!("server answered {status}")));
			}

			let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

			Ok(bytes.to_vec())
		})
	}
}

/// Loads resources from the local filesystem, optionally relative to a root directory.
///
/// Reads are synchronous and run on whichever task polls the future; keep the files small
/// (fonts, logos) or load large inputs up front and serve them through [`MemoryAssets`].
#[derive(Clone, Debug, Default)]
pub struct FsAssets {
	root: Option<PathBuf>,
}
impl FsAssets {
	/// Resolves relative locations against `root`.
	pub fn rooted(root: impl Into<PathBuf>) -> Self {
		Self { root: Some(root.into()) }
	}
}
impl AssetSource for FsAssets {
	fn load<'a>(&'a self, what: &'static str, location: &'a str) -> AssetFuture<'a> {
		Box::pin(async move {
			let path = match &self.root {
				Some(root) => root.join(location),
				None => PathBuf::from(location),
			};

			std::fs::read(&path).map_err(|e| RenderError::Asset {
				what,
				location: path.display().to_string(),
				message: e.to_string(),
			})
		})
	}
}

/// In-process resources keyed by location.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
	entries: HashMap<String, Arc<[u8]>>,
}
impl MemoryAssets {
	/// Adds (or replaces) the bytes served for `location`.
	pub fn with(mut self, location: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
		self.entries.insert(location.into(), bytes.into());

		self
	}
}
impl AssetSource for MemoryAssets {
	fn load<'a>(&'a self, what: &'static str, location: &'a str) -> AssetFuture<'a> {
		let found = self.entries.get(location).map(|bytes| bytes.to_vec());

		Box::pin(async move {
			found.ok_or_else(|| RenderError::Asset {
				what,
				location: location.to_owned(),
				message: "no such entry".into(),
			})
		})
	}
}

/// Sends `http://` and `https://` locations to [`HttpAssets`] and everything else to
/// [`FsAssets`].
#[derive(Clone, Debug, Default)]
pub struct RoutedAssets {
	/// Remote loader.
	pub http: HttpAssets,
	/// Local loader.
	pub fs: FsAssets,
}
impl AssetSource for RoutedAssets {
	fn load<'a>(&'a self, what: &'static str, location: &'a str) -> AssetFuture<'a> {
		if location.starts_with("http://") || location.starts_with("https://") {
			self.http.load(what, location)
		} else {
			self.fs.load(what, location)
		}
	}
}

/// Face loaded through an [`AssetSource`] and parsed once.
pub struct AssetFont {
	source: Arc<dyn AssetSource>,
	location: String,
	parsed: Mutex<Option<Arc<dyn Typeface>>>,
}
impl AssetFont {
	/// Creates a provider reading the font file at `location`.
	pub fn new(source: Arc<dyn AssetSource>, location: impl Into<String>) -> Self {
		Self { source, location: location.into(), parsed: Mutex::new(None) }
	}
}
impl Debug for AssetFont {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AssetFont")
			.field("location", &self.location)
			.field("parsed", &self.parsed.lock().is_some())
			.finish()
	}
}
impl FontProvider for AssetFont {
	fn ready(&self) -> FontFuture<'_> {
		Box::pin(async move {
			let cached = self.parsed.lock().clone();

			if let Some(face) = cached {
				return Ok(face);
			}

			let bytes = self.source.load("font", &self.location).await?;
			let face: Arc<dyn Typeface> = Arc::new(
				RustTypeface::from_bytes(bytes)
					.ok_or_else(|| RenderError::Font { location: self.location.clone() })?,
			);

			*self.parsed.lock() = Some(face.clone());

			Ok(face)
		})
	}
}

/// Face that is already available.
#[derive(Clone)]
pub struct ReadyFont(pub Arc<dyn Typeface>);
impl Debug for ReadyFont {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReadyFont(..)")
	}
}
impl FontProvider for ReadyFont {
	fn ready(&self) -> FontFuture<'_> {
		let face = self.0.clone();

		Box::pin(async move { Ok(face) })
	}
}
