//! Thread-safe in-memory [`CredentialStore`] for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreError, StoreFuture, StoredValue},
};

type StoreMap = Arc<RwLock<HashMap<String, StoredValue>>>;

/// Storage backend that keeps values in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn get_now(map: StoreMap, key: &str, now: OffsetDateTime) -> Option<String> {
		{
			let guard = map.read();

			match guard.get(key) {
				Some(entry) if !entry.is_expired_at(now) => return Some(entry.value.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		Self::evict_expired(&map, key, now);

		None
	}

	// A writer may have replaced the entry since the read guard was dropped.
	fn evict_expired(map: &StoreMap, key: &str, now: OffsetDateTime) {
		let mut guard = map.write();

		if guard.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
			guard.remove(key);
		}
	}

	fn set_now(
		map: StoreMap,
		key: &str,
		value: String,
		ttl: Option<Duration>,
		now: OffsetDateTime,
	) -> Result<(), StoreError> {
		map.write().insert(key.to_owned(), StoredValue::new(value, ttl, now));

		Ok(())
	}

	/// Number of live (unexpired) entries; mainly useful in tests.
	pub fn len(&self) -> usize {
		let now = OffsetDateTime::now_utc();

		self.0.read().values().filter(|entry| !entry.is_expired_at(now)).count()
	}

	/// Returns `true` when no live entry is held.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl CredentialStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(map, key, OffsetDateTime::now_utc())) })
	}

	fn set_with_ttl<'a>(
		&'a self,
		key: &'a str,
		value: String,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, key, value, ttl, OffsetDateTime::now_utc()) })
	}
}
