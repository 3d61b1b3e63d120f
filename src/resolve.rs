//! Normalizes free-form catalog references (raw IDs, web links, `spotify:` URIs) into
//! canonical entity identifiers.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

/// Length of every catalog identifier.
pub const ENTITY_ID_LEN: usize = 22;

/// Catalog entity kinds that can be looked up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
	/// A single track.
	#[default]
	Track,
	/// An album.
	Album,
}
impl EntityType {
	/// Returns the singular label used in links and URIs.
	pub const fn as_str(self) -> &'static str {
		match self {
			EntityType::Track => "track",
			EntityType::Album => "album",
		}
	}

	/// Returns the plural path segment used by the catalog API.
	pub const fn collection(self) -> &'static str {
		match self {
			EntityType::Track => "tracks",
			EntityType::Album => "albums",
		}
	}
}
impl Display for EntityType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error returned when a string is not a valid catalog identifier.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("`{0}` is not a 22-character alphanumeric catalog identifier.")]
pub struct EntityIdError(pub String);

/// Validated 22-character alphanumeric catalog identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);
impl EntityId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, EntityIdError> {
		let view = value.as_ref();

		if is_entity_id(view) {
			Ok(Self(view.to_owned()))
		} else {
			Err(EntityIdError(view.to_owned()))
		}
	}
}
impl Deref for EntityId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for EntityId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<EntityId> for String {
	fn from(value: EntityId) -> Self {
		value.0
	}
}
impl TryFrom<String> for EntityId {
	type Error = EntityIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if is_entity_id(&value) { Ok(Self(value)) } else { Err(EntityIdError(value)) }
	}
}
impl Debug for EntityId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "EntityId({})", self.0)
	}
}
impl Display for EntityId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for EntityId {
	type Err = EntityIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Typed reference to a single catalog entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
	/// Entity kind.
	#[serde(rename = "type")]
	pub kind: EntityType,
	/// Canonical identifier.
	pub id: EntityId,
}
impl EntityRef {
	/// Creates a reference from parts.
	pub fn new(kind: EntityType, id: EntityId) -> Self {
		Self { kind, id }
	}

	/// Resolves raw input into a reference, failing with [`Error::InvalidInput`].
	pub fn parse(raw: &str, kind: EntityType) -> Result<Self> {
		resolve(raw, kind)
			.map(|id| Self::new(kind, id))
			.ok_or_else(|| Error::InvalidInput { input: raw.to_owned(), kind })
	}
}

/// Resolves free-form input into a canonical identifier for `kind`.
///
/// Rules are tried in order and the first match wins:
///
/// 1. the trimmed input is itself a 22-character alphanumeric identifier;
/// 2. the input contains `{kind}/` followed by an identifier (web links);
/// 3. the input contains `spotify:{kind}:` followed by an identifier (URIs).
pub fn resolve(raw: &str, kind: EntityType) -> Option<EntityId> {
	let trimmed = raw.trim();

	if is_entity_id(trimmed) {
		return Some(EntityId(trimmed.to_owned()));
	}

	let link = format!("{}/", kind.as_str());
	let uri = format!("spotify:{}:", kind.as_str());

	id_after(trimmed, &link)
		.or_else(|| id_after(trimmed, &uri))
		.map(|id| EntityId(id.to_owned()))
}

fn id_after<'a>(haystack: &'a str, prefix: &str) -> Option<&'a str> {
	haystack.match_indices(prefix).find_map(|(at, _)| {
		let rest = &haystack[at + prefix.len()..];
		let candidate = rest.get(..ENTITY_ID_LEN)?;

		candidate.bytes().all(|b| b.is_ascii_alphanumeric()).then_some(candidate)
	})
}

fn is_entity_id(view: &str) -> bool {
	view.len() == ENTITY_ID_LEN && view.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const ID: &str = "4cOdK2wGLETKBW3PvgPWqT";

	#[test]
	fn bare_identifier_is_returned_unchanged() {
		assert_eq!(resolve(ID, EntityType::Track).as_deref(), Some(ID));
		assert_eq!(resolve(&format!("  {ID}\n"), EntityType::Album).as_deref(), Some(ID));
	}

	#[test]
	fn web_links_and_uris_yield_the_identifier() {
		let link = format!("https://open.spotify.com/track/{ID}?si=abc123");
		let uri = format!("spotify:album:{ID}");

		assert_eq!(resolve(&link, EntityType::Track).as_deref(), Some(ID));
		assert_eq!(resolve(&uri, EntityType::Album).as_deref(), Some(ID));
	}

	#[test]
	fn mismatched_kind_or_short_ids_are_rejected() {
		let link = format!("https://open.spotify.com/album/{ID}");

		assert!(resolve(&link, EntityType::Track).is_none());
		assert!(resolve("https://open.spotify.com/track/short", EntityType::Track).is_none());
		assert!(resolve("spotify:track:4cOdK2wGLETKBW3Pvg-PWqT", EntityType::Track).is_none());
		assert!(resolve("", EntityType::Track).is_none());
	}

	#[test]
	fn later_occurrences_are_considered() {
		let link = format!("https://example.com/track/nope/track/{ID}");

		assert_eq!(resolve(&link, EntityType::Track).as_deref(), Some(ID));
	}

	#[test]
	fn non_ascii_input_does_not_split_characters() {
		assert!(resolve("track/ééééééééééééééééééééééé", EntityType::Track).is_none());
	}

	#[test]
	fn parse_reports_invalid_input() {
		let err = EntityRef::parse("not a track", EntityType::Track)
			.expect_err("Unresolvable input should be rejected.");

		assert!(matches!(err, Error::InvalidInput { kind: EntityType::Track, .. }));
		assert_eq!(err.to_string(), "Invalid Spotify track ID");
	}

	#[test]
	fn entity_id_round_trips_through_serde() {
		let id = EntityId::new(ID).expect("Fixture identifier should be valid.");
		let payload = serde_json::to_string(&id).expect("Identifier should serialize.");

		assert_eq!(payload, format!("\"{ID}\""));
		assert!(serde_json::from_str::<EntityId>("\"short\"").is_err());
	}
}
