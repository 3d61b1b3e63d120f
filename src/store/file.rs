//! File-backed [`CredentialStore`] that lets several processes on one host share a token.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
	process,
	sync::atomic::{AtomicU64, Ordering},
};
// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreError, StoreFuture, StoredValue},
};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Persists values to a JSON file after each write and re-reads it before each read.
///
/// Writers stage the snapshot in a private temporary file and rename it over the target, so
/// readers always see a complete snapshot and concurrent writers settle on the last rename.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, StoredValue>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_or_empty(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, StoredValue>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	// An unreadable snapshot is a cache miss; the next write replaces it.
	fn load_or_empty(path: &Path) -> Result<HashMap<String, StoredValue>, StoreError> {
		match Self::load_snapshot(path) {
			Err(StoreError::Serialization { message }) => {
				tracing::warn!(%message, "ignoring unreadable credential store snapshot");

				Ok(HashMap::new())
			},
			result => result,
		}
	}

	fn staging_path(&self) -> PathBuf {
		let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();

		name.push(format!(".{}.{}.tmp", process::id(), TMP_SEQ.fetch_add(1, Ordering::Relaxed)));

		self.path.with_file_name(name)
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, StoredValue>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let tmp_path = self.staging_path();

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| {
			let _ = fs::remove_file(&tmp_path);

			StoreError::Backend {
				message: format!("Failed to replace {}: {e}", self.path.display()),
			}
		})
	}
}
impl CredentialStore for FileStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move {
			// Another process may have refreshed the token since the last read.
			let snapshot = Self::load_or_empty(&self.path)?;
			let now = OffsetDateTime::now_utc();
			let mut guard = self.inner.write();

			*guard = snapshot;

			Ok(guard.get(key).filter(|entry| !entry.is_expired_at(now)).map(|e| e.value.clone()))
		})
	}

	fn set_with_ttl<'a>(
		&'a self,
		key: &'a str,
		value: String,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let snapshot = Self::load_or_empty(&self.path)?;
			let now = OffsetDateTime::now_utc();
			let mut guard = self.inner.write();

			*guard = snapshot;
			guard.retain(|_, entry| !entry.is_expired_at(now));
			guard.insert(key.to_owned(), StoredValue::new(value, ttl, now));
			self.persist_locked(&guard)?;

			Ok(())
		})
	}
}
