//! [`CredentialStore`] backed by a Redis-over-HTTP service (Upstash REST protocol).
//!
//! Each operation POSTs one Redis command encoded as a JSON array to the service root, e.g.
//! `["SET","spotify_token","…","PX","3600000"]`, authenticated with a bearer token. Replies are
//! `{"result": …}` on success and `{"error": "…"}` on failure.

// crates.io
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CredentialStore, StoreError, StoreFuture},
};

#[derive(Debug, Deserialize)]
struct Reply {
	#[serde(default)]
	result: Option<serde_json::Value>,
	#[serde(default)]
	error: Option<String>,
}

/// Shared key/value store reached over HTTP, visible to every process holding the address.
#[derive(Clone)]
pub struct RestStore {
	endpoint: Url,
	token: Option<TokenSecret>,
	client: ReqwestClient,
}
impl RestStore {
	/// Creates a store that talks to `endpoint` with the default reqwest client.
	pub fn new(endpoint: Url, token: Option<String>) -> Self {
		Self::with_client(endpoint, token, ReqwestClient::default())
	}

	/// Creates a store that reuses the caller-provided reqwest client.
	pub fn with_client(endpoint: Url, token: Option<String>, client: ReqwestClient) -> Self {
		Self { endpoint, token: token.map(TokenSecret::new), client }
	}

	async fn command(&self, args: Vec<String>) -> Result<Option<serde_json::Value>, StoreError> {
		let body = serde_json::to_vec(&args).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode store command: {e}"),
		})?;
		let mut request = self
			.client
			.post(self.endpoint.clone())
			.header(CONTENT_TYPE, "application/json")
			.body(body);

		if let Some(token) = &self.token {
			request = request.header(AUTHORIZATION, token.bearer_header());
		}

		let response = request.send().await.map_err(|e| StoreError::Backend {
			message: format!("Failed to reach credential store: {e}"),
		})?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(|e| StoreError::Backend {
			message: format!("Failed to read credential store reply: {e}"),
		})?;
		let reply: Reply = serde_json::from_slice(&bytes).map_err(|e| {
			if status.is_success() {
				StoreError::Serialization {
					message: format!("Failed to parse credential store reply: {e}"),
				}
			} else {
				StoreError::Backend {
					message: format!(
						"Credential store returned {status}: {}",
						String::from_utf8_lossy(&bytes)
					),
				}
			}
		})?;

		if let Some(error) = reply.error {
			return Err(StoreError::Backend {
				message: format!("Credential store rejected command: {error}"),
			});
		}
		if !status.is_success() {
			return Err(StoreError::Backend {
				message: format!("Credential store returned {status}"),
			});
		}

		Ok(reply.result)
	}
}
impl Debug for RestStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RestStore")
			.field("endpoint", &self.endpoint.as_str())
			.field("token_set", &self.token.is_some())
			.finish()
	}
}
impl CredentialStore for RestStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move {
			match self.command(vec!["GET".into(), key.to_owned()]).await? {
				None | Some(serde_json::Value::Null) => Ok(None),
				Some(serde_json::Value::String(value)) => Ok(Some(value)),
				// Some clients let the service JSON-decode stored values.
				Some(other) => Ok(Some(other.to_string())),
			}
		})
	}

	fn set_with_ttl<'a>(
		&'a self,
		key: &'a str,
		value: String,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut args = vec!["SET".into(), key.to_owned(), value];

			if let Some(ttl) = ttl.filter(|ttl| ttl.is_positive()) {
				args.push("PX".into());
				args.push(ttl.whole_milliseconds().to_string());
			}

			self.command(args).await.map(|_| ())
		})
	}
}
