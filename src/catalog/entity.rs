//! Narrowed entity metadata.

// self
use crate::{_prelude::*, error::MetadataError, resolve::EntityType};

/// Performer credited on an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
	/// Display name.
	pub name: String,
}

/// Catalog entity reduced to the fields a card needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
	/// Entity kind.
	#[serde(rename = "type")]
	pub kind: EntityType,
	/// Track or album title.
	pub name: String,
	/// Credited artists in catalog order.
	pub artists: Vec<Artist>,
	/// Largest available cover image.
	pub cover_image_url: String,
}
impl EntityMetadata {
	/// Narrows a raw catalog payload.
	///
	/// Tracks take their cover from `album.images[0]`, albums from `images[0]`.
	pub fn from_slice(payload: &[u8]) -> Result<Self> {
		let wire: WireEntity =
			serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(payload))
				.map_err(|source| MetadataError::Schema { source })?;
		let images = match wire.kind {
			EntityType::Track => wire.album.map(|album| album.images).unwrap_or_default(),
			EntityType::Album => wire.images,
		};
		let Some(cover) = images.into_iter().next() else {
			return Err(MetadataError::MissingCover { name: wire.name }.into());
		};

		Ok(Self {
			kind: wire.kind,
			name: wire.name,
			artists: wire.artists,
			cover_image_url: cover.url,
		})
	}

	/// Artist names in catalog order.
	pub fn artist_names(&self) -> Vec<&str> {
		self.artists.iter().map(|a| a.name.as_str()).collect()
	}
}

#[derive(Deserialize)]
struct WireEntity {
	#[serde(rename = "type")]
	kind: EntityType,
	name: String,
	#[serde(default)]
	artists: Vec<Artist>,
	#[serde(default)]
	album: Option<WireAlbum>,
	#[serde(default)]
	images: Vec<WireImage>,
}

#[derive(Deserialize)]
struct WireAlbum {
	#[serde(default)]
	images: Vec<WireImage>,
}

#[derive(Deserialize)]
struct WireImage {
	url: String,
}
