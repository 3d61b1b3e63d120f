//! Environment-driven settings for the broker, the credential store, and the catalog.

// std
use std::{env, path::PathBuf};
// self
use crate::{
	_prelude::*,
	broker::TokenBroker,
	catalog::Catalog,
	error::ConfigError,
	http::ReqwestHttpClient,
	provider::{CatalogDescriptor, DEFAULT_API_BASE, DEFAULT_TOKEN_ENDPOINT},
	store::{CredentialStore, FileStore, MemoryStore, RestStore},
};

/// OAuth client identifier.
pub const CLIENT_ID: &str = "CLIENT_ID";
/// OAuth client secret.
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
/// Credential store address.
pub const CREDENTIAL_STORE_URL: &str = "CREDENTIAL_STORE_URL";
/// Credential store access token.
pub const CREDENTIAL_STORE_TOKEN: &str = "CREDENTIAL_STORE_TOKEN";
/// Token endpoint override.
pub const TOKEN_ENDPOINT: &str = "TOKEN_ENDPOINT";
/// Catalog API base override.
pub const CATALOG_BASE_URL: &str = "CATALOG_BASE_URL";

const CLIENT_ID_ALIAS: &str = "SPOTIFY_CLIENT_ID";
const CLIENT_SECRET_ALIAS: &str = "SPOTIFY_CLIENT_SECRET";
const STORE_URL_ALIAS: &str = "UPSTASH_REDIS_REST_URL";
const STORE_TOKEN_ALIAS: &str = "UPSTASH_REDIS_REST_TOKEN";

/// Where the cached bearer token lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreAddress {
	/// Process-local map (`memory:`).
	Memory,
	/// JSON file shared by processes on one host (`file:<path>` or a bare path).
	File(PathBuf),
	/// Redis-over-HTTP service (`http://` or `https://`).
	Rest(Url),
}
impl FromStr for StoreAddress {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();

		if s == "memory:" || s == "memory" {
			return Ok(Self::Memory);
		}
		if let Some(path) = s.strip_prefix("file:") {
			return Ok(Self::File(PathBuf::from(path.trim_start_matches("//"))));
		}
		if s.starts_with("http://") || s.starts_with("https://") {
			return Url::parse(s)
				.map(Self::Rest)
				.map_err(|source| ConfigError::InvalidUrl { value: s.to_owned(), source });
		}

		Ok(Self::File(PathBuf::from(s)))
	}
}

/// Resolved runtime settings.
#[derive(Clone)]
pub struct Settings {
	/// OAuth client identifier, if configured.
	pub client_id: Option<String>,
	/// OAuth client secret, if configured.
	pub client_secret: Option<String>,
	/// Credential store address.
	pub store: StoreAddress,
	/// Credential store access token, if configured.
	pub store_token: Option<String>,
	/// Catalog endpoints.
	pub descriptor: CatalogDescriptor,
}
impl Settings {
	/// Reads settings from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Reads settings through an arbitrary variable lookup.
	///
	/// Blank values count as unset. Client credentials are optional here and only checked
	/// when the first token refresh happens.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
		let store = var(CREDENTIAL_STORE_URL)
			.or_else(|| var(STORE_URL_ALIAS))
			.ok_or(ConfigError::MissingVar { name: CREDENTIAL_STORE_URL })?
			.parse::<StoreAddress>()?;
		let endpoint = |name: &'static str, default: &str| {
			let raw = var(name).unwrap_or_else(|| default.to_owned());

			Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { value: raw, source })
		};
		let descriptor = CatalogDescriptor::builder()
			.token_endpoint(endpoint(TOKEN_ENDPOINT, DEFAULT_TOKEN_ENDPOINT)?)
			.api_base(endpoint(CATALOG_BASE_URL, DEFAULT_API_BASE)?)
			.build()
			.map_err(ConfigError::from)?;

		Ok(Self {
			client_id: var(CLIENT_ID).or_else(|| var(CLIENT_ID_ALIAS)),
			client_secret: var(CLIENT_SECRET).or_else(|| var(CLIENT_SECRET_ALIAS)),
			store,
			store_token: var(CREDENTIAL_STORE_TOKEN).or_else(|| var(STORE_TOKEN_ALIAS)),
			descriptor,
		})
	}

	/// Opens the configured credential store.
	pub fn open_store(&self, client: &ReqwestClient) -> Result<Arc<dyn CredentialStore>> {
		let store: Arc<dyn CredentialStore> = match &self.store {
			StoreAddress::Memory => Arc::new(MemoryStore::default()),
			StoreAddress::File(path) => Arc::new(FileStore::open(path)?),
			StoreAddress::Rest(url) => Arc::new(RestStore::with_client(
				url.clone(),
				self.store_token.clone(),
				client.clone(),
			)),
		};

		Ok(store)
	}

	/// Builds the shared reqwest client.
	pub fn http_client(&self) -> Result<ReqwestClient> {
		ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(|e| ConfigError::http_client_build(e).into())
	}

	/// Builds a broker wired to the configured store and credentials.
	pub fn broker(&self) -> Result<TokenBroker> {
		let client = self.http_client()?;
		let store = self.open_store(&client)?;
		let mut broker = TokenBroker::with_http_client(
			store,
			self.descriptor.clone(),
			ReqwestHttpClient::with_client(client),
		);

		broker.client_id = self.client_id.clone();
		broker.client_secret = self.client_secret.clone();

		Ok(broker)
	}

	/// Builds a catalog lookup client on top of [`Settings::broker`].
	pub fn catalog(&self) -> Result<Catalog> {
		let broker = self.broker()?;
		let client = broker.http_client.0.clone();

		Ok(Catalog::with_client(broker, client))
	}
}
impl Debug for Settings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Settings")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("store", &self.store)
			.field("store_token_set", &self.store_token.is_some())
			.field("descriptor", &self.descriptor)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
		move |name: &str| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| (*v).to_owned())
	}

	#[test]
	fn store_addresses_parse_by_scheme() {
		assert_eq!("memory:".parse::<StoreAddress>().expect("memory parses"), StoreAddress::Memory);
		assert_eq!(
			"file:/tmp/token.json".parse::<StoreAddress>().expect("file parses"),
			StoreAddress::File(PathBuf::from("/tmp/token.json")),
		);
		assert_eq!(
			"cache/token.json".parse::<StoreAddress>().expect("bare path parses"),
			StoreAddress::File(PathBuf::from("cache/token.json")),
		);
		assert!(matches!(
			"https://eu1-demo.upstash.io".parse::<StoreAddress>().expect("url parses"),
			StoreAddress::Rest(url) if url.host_str() == Some("eu1-demo.upstash.io")
		));
	}

	#[test]
	fn missing_store_address_is_reported() {
		let err = Settings::from_lookup(lookup(&[(CLIENT_ID, "id")]))
			.expect_err("Store address is required.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingVar { name: CREDENTIAL_STORE_URL })
		));
	}

	#[test]
	fn aliases_and_defaults_apply() {
		let settings = Settings::from_lookup(lookup(&[
			(CLIENT_ID, "democlient"),
			(CLIENT_SECRET, "  "),
			(CLIENT_ID_ALIAS, "ignored"),
			(STORE_URL_ALIAS, "https://eu1-demo.upstash.io"),
			(STORE_TOKEN_ALIAS, "store-token"),
		]))
		.expect("Settings should load.");

		assert_eq!(settings.client_id.as_deref(), Some("democlient"));
		assert_eq!(settings.client_secret, None);
		assert_eq!(settings.store_token.as_deref(), Some("store-token"));
		assert_eq!(settings.descriptor.token_endpoint.as_str(), DEFAULT_TOKEN_ENDPOINT);
		assert_eq!(settings.descriptor.api_base.as_str(), DEFAULT_API_BASE);
		assert!(!format!("{settings:?}").contains("store-token"));
	}

	#[test]
	fn insecure_endpoint_overrides_are_rejected() {
		let err = Settings::from_lookup(lookup(&[
			(CREDENTIAL_STORE_URL, "memory:"),
			(TOKEN_ENDPOINT, "http://accounts.example.com/api/token"),
		]))
		.expect_err("Plain HTTP to a remote host should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::Descriptor(_))));
	}
}
