//! The single cached bearer token and its expiry bookkeeping.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token persisted in the credential store.
///
/// The token is usable while `now < expires_at_ms`. Records are only ever written by the
/// broker after a successful exchange and are overwritten by the next refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Bearer token value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Expiry instant in Unix epoch milliseconds.
	pub expires_at_ms: i64,
}
impl CachedToken {
	/// Creates a record that expires `lifetime` after `issued_at`.
	pub fn issue(value: impl Into<String>, issued_at: OffsetDateTime, lifetime: Duration) -> Self {
		Self {
			value: TokenSecret::new(value),
			expires_at_ms: epoch_millis(issued_at)
				.saturating_add(lifetime.whole_milliseconds() as i64),
		}
	}

	/// Returns `true` while the token may still be presented at `instant`.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		epoch_millis(instant) < self.expires_at_ms
	}

	/// Remaining lifetime relative to `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let left = self.expires_at_ms.saturating_sub(epoch_millis(instant));

		if left <= 0 { Duration::ZERO } else { Duration::milliseconds(left) }
	}

	/// Encodes the record for the credential store.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Decodes a record previously written by [`CachedToken::to_json`].
	pub fn from_json(raw: &str) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_str(raw))
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("value", &"<redacted>")
			.field("expires_at_ms", &self.expires_at_ms)
			.finish()
	}
}

/// Converts an instant into Unix epoch milliseconds.
pub fn epoch_millis(instant: OffsetDateTime) -> i64 {
	(instant.unix_timestamp_nanos() / 1_000_000) as i64
}
