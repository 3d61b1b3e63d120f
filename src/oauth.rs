//! Client-credentials exchange against the catalog token endpoint.
//!
//! The exchange goes through the `oauth2` crate's [`BasicClient`] with HTTP Basic client
//! authentication (`Authorization: Basic base64(client_id:client_secret)`) and a
//! form-encoded `grant_type=client_credentials` body.

pub use oauth2;

// crates.io
use oauth2::{
	ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, RequestTokenError,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	error::{ConfigError, CredentialError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::CatalogDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Successful token endpoint answer, narrowed to what the broker caches.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Newly minted bearer token.
	pub access_token: String,
	/// Lifetime reported by the token endpoint.
	pub expires_in: Duration,
}

pub(crate) struct BasicFacade<C>
where
	C: ?Sized + TokenHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
}
impl<C> BasicFacade<C>
where
	C: ?Sized + TokenHttpClient,
{
	pub(crate) fn from_descriptor(
		descriptor: &CatalogDescriptor,
		credentials: &ClientCredentials,
		http_client: Arc<C>,
	) -> Result<Self> {
		let value = descriptor.token_endpoint.to_string();
		let token_url = TokenUrl::new(value.clone())
			.map_err(|source| ConfigError::InvalidUrl { value, source })?;
		let oauth_client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client })
	}

	pub(crate) fn exchange_client_credentials(&self) -> FacadeFuture<'_, TokenGrant> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let response = self
				.oauth_client
				.exchange_client_credentials()
				.request_async(&instrumented)
				.await
				.map_err(|err| map_request_error(meta.take(), err))?;

			map_token_response(response)
		})
	}
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenGrant> {
	let expires_in = response.expires_in().ok_or(CredentialError::MissingExpiresIn)?.as_secs();
	let expires_in =
		i64::try_from(expires_in).map_err(|_| CredentialError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(CredentialError::NonPositiveExpiresIn.into());
	}

	Ok(TokenGrant {
		access_token: response.access_token().secret().to_owned(),
		expires_in: Duration::seconds(expires_in),
	})
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	// Non-success answers are reported verbatim, whatever the body looked like.
	if let Some((status, body)) = meta.as_ref().and_then(ResponseMetadata::failure) {
		return CredentialError::Exchange { status, body: body.to_owned() }.into();
	}

	let status = meta.and_then(|m| m.status).unwrap_or_default();

	match err {
		RequestTokenError::ServerResponse(response) => CredentialError::Exchange {
			status,
			body: serde_json::to_string(&response)
				.unwrap_or_else(|_| response.error().as_ref().to_owned()),
		}
		.into(),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) =>
			CredentialError::MalformedResponse { source }.into(),
		RequestTokenError::Other(message) =>
			CredentialError::Exchange { status, body: message }.into(),
	}
}

fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) =>
			TransportError::network("the token endpoint", *inner).into(),
		HttpClientError::Http(inner) => CredentialError::Request(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			TransportError::Io(std::io::Error::other(message)).into(),
		_ => TransportError::Io(std::io::Error::other("unrecognized HTTP client failure")).into(),
	}
}
