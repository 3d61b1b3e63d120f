//! Token broker: read-through cache for the catalog bearer token.
//!
//! The broker reads the cached token from a shared [`CredentialStore`], and on a miss (or an
//! expired record) performs a client-credentials exchange and writes the fresh token back
//! with its lifetime as the store TTL. There is deliberately no lock around the refresh:
//! concurrent misses may each mint a token, every minted token stays valid until its own
//! expiry, and the last write wins.

mod access_token;

// self
use crate::{
	_prelude::*,
	http::{ReqwestHttpClient, TokenHttpClient},
	provider::CatalogDescriptor,
	store::CredentialStore,
};

/// Store key holding the cached bearer token.
pub const TOKEN_CACHE_KEY: &str = "spotify_token";

/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestTokenBroker = TokenBroker<ReqwestHttpClient>;

/// Hands out valid bearer tokens for one catalog, refreshing them on demand.
#[derive(Clone)]
pub struct TokenBroker<C = ReqwestHttpClient>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client wrapper used for token exchanges.
	pub http_client: Arc<C>,
	/// Shared store holding the cached token.
	pub store: Arc<dyn CredentialStore>,
	/// Catalog endpoints.
	pub descriptor: CatalogDescriptor,
	/// OAuth 2.0 client identifier, if configured.
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret, if configured.
	pub client_secret: Option<String>,
	/// Store key the token is cached under.
	pub cache_key: String,
}
impl<C> TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		descriptor: CatalogDescriptor,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			descriptor,
			client_id: None,
			client_secret: None,
			cache_key: TOKEN_CACHE_KEY.into(),
		}
	}

	/// Sets the client identifier and secret used for the exchange.
	pub fn with_client_credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Overrides the store key (defaults to [`TOKEN_CACHE_KEY`]).
	pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
		self.cache_key = key.into();

		self
	}
}
impl TokenBroker<ReqwestHttpClient> {
	/// Creates a broker that provisions its own reqwest transport.
	pub fn new(store: Arc<dyn CredentialStore>, descriptor: CatalogDescriptor) -> Self {
		Self::with_http_client(store, descriptor, ReqwestHttpClient::default())
	}
}
impl<C> Debug for TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBroker")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("cache_key", &self.cache_key)
			.finish()
	}
}
