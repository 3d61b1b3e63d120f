//! Catalog lookup: authenticated entity fetches on top of the token broker.

pub mod entity;

pub use entity::*;

// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	broker::TokenBroker,
	error::{ConfigError, LookupError, MetadataError, TransportError},
	http::{ReqwestHttpClient, TokenHttpClient},
	obs::{self, FlowKind},
	resolve::EntityRef,
};

/// Fetches catalog entities with bearer tokens minted by a [`TokenBroker`].
#[derive(Clone)]
pub struct Catalog<C = ReqwestHttpClient>
where
	C: ?Sized + TokenHttpClient,
{
	broker: TokenBroker<C>,
	client: ReqwestClient,
}
impl<C> Catalog<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a lookup client with a default reqwest client.
	pub fn new(broker: TokenBroker<C>) -> Self {
		Self::with_client(broker, ReqwestClient::default())
	}

	/// Creates a lookup client that reuses the caller-provided reqwest client.
	pub fn with_client(broker: TokenBroker<C>, client: ReqwestClient) -> Self {
		Self { broker, client }
	}

	/// Broker the client draws tokens from.
	pub fn broker(&self) -> &TokenBroker<C> {
		&self.broker
	}

	/// Fetches the entity and returns the catalog JSON untouched.
	pub async fn fetch_raw(&self, entity: &EntityRef) -> Result<serde_json::Value> {
		obs::observe(FlowKind::CatalogLookup, "fetch_raw", async move {
			let body = self.fetch_body(entity).await?;
			let raw: serde_json::Value =
				serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&body))
					.map_err(|source| MetadataError::Schema { source })?;

			Ok(raw)
		})
		.await
	}

	/// Fetches the entity and narrows it to what the compositor needs.
	pub async fn fetch_entity(&self, entity: &EntityRef) -> Result<EntityMetadata> {
		obs::observe(FlowKind::CatalogLookup, "fetch_entity", async move {
			let body = self.fetch_body(entity).await?;

			EntityMetadata::from_slice(&body)
		})
		.await
	}

	async fn fetch_body(&self, entity: &EntityRef) -> Result<Vec<u8>> {
		let url = self.broker.descriptor.entity_url(entity).map_err(ConfigError::from)?;
		let token = self.broker.access_token().await?;
		let response = self
			.client
			.get(url)
			.header(AUTHORIZATION, token.bearer_header())
			.send()
			.await
			.map_err(|e| TransportError::network("the catalog", e))?;
		let status = response.status();
		let body = response.bytes().await.map_err(|e| TransportError::network("the catalog", e))?;

		if !status.is_success() {
			tracing::debug!(status = status.as_u16(), id = %entity.id, "catalog rejected lookup");

			return Err(LookupError {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&body).into_owned(),
			}
			.into());
		}

		Ok(body.to_vec())
	}
}
impl<C> Debug for Catalog<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Catalog").field("broker", &self.broker).finish()
	}
}
