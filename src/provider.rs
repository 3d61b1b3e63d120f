//! Catalog descriptor: where tokens are minted and where entities are fetched.
//!
//! The descriptor is validated once at construction so flows never have to re-check
//! endpoint schemes.

/// Builder API and validation for catalog descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, resolve::EntityRef};

/// Default OAuth token endpoint of the catalog.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
/// Default catalog API base.
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Immutable catalog descriptor consumed by the broker and the lookup client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDescriptor {
	/// Token endpoint used for the client-credentials exchange.
	pub token_endpoint: Url,
	/// Base URL entity paths are appended to.
	pub api_base: Url,
}
impl CatalogDescriptor {
	/// Creates a new builder.
	pub fn builder() -> CatalogDescriptorBuilder {
		CatalogDescriptorBuilder::default()
	}

	/// Descriptor for the public catalog endpoints.
	pub fn spotify() -> Result<Self, CatalogDescriptorError> {
		let parse = |endpoint: &'static str, raw: &str| {
			Url::parse(raw).map_err(|_| CatalogDescriptorError::InvalidEndpoint {
				endpoint,
				url: raw.to_owned(),
			})
		};

		Self::builder()
			.token_endpoint(parse("token", DEFAULT_TOKEN_ENDPOINT)?)
			.api_base(parse("api", DEFAULT_API_BASE)?)
			.build()
	}

	/// URL of the entity resource: `{api_base}/{type}s/{id}`.
	pub fn entity_url(&self, entity: &EntityRef) -> Result<Url, CatalogDescriptorError> {
		let raw = format!(
			"{}/{}/{}",
			self.api_base.as_str().trim_end_matches('/'),
			entity.kind.collection(),
			entity.id
		);

		Url::parse(&raw)
			.map_err(|_| CatalogDescriptorError::InvalidEndpoint { endpoint: "entity", url: raw })
	}
}
