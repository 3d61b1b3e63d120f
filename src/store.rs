//! Credential store contract and the built-in key/value backends.
//!
//! The broker only needs two operations from a store: read a value and write a value with an
//! optional time-to-live. Stores are shared across requests (and, for the file and REST
//! backends, across processes) and are not transactional; concurrent writers simply race and
//! the last write wins.

pub mod file;
pub mod memory;
pub mod rest;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use rest::RestStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key/value backend with optional per-key expiry.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the value stored under `key`, if present and not expired.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Stores `value` under `key`, replacing any previous value.
	///
	/// When `ttl` is provided the backend drops the value once it elapses.
	fn set_with_ttl<'a>(
		&'a self,
		key: &'a str,
		value: String,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// A stored value with its optional absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
	/// Raw value.
	pub value: String,
	/// Instant after which the value is treated as absent.
	#[serde(default)]
	pub expires_at: Option<OffsetDateTime>,
}
impl StoredValue {
	/// Wraps `value`, deriving the absolute expiry from `ttl` relative to `now`.
	pub fn new(value: String, ttl: Option<Duration>, now: OffsetDateTime) -> Self {
		Self { value, expires_at: ttl.map(|ttl| now + ttl) }
	}

	/// Returns `true` once the value has expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|at| instant >= at)
	}
}
