//! Read-through access token flow.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, ClientCredentials, TokenSecret},
	broker::TokenBroker,
	http::TokenHttpClient,
	oauth::BasicFacade,
	obs::{self, FlowKind},
	store::{CredentialStore, StoreError},
};

impl<C> TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Returns a bearer token that is valid right now, refreshing it when needed.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		self.access_token_at(OffsetDateTime::now_utc()).await
	}

	/// Returns a bearer token that is valid at `now`, refreshing it when needed.
	///
	/// At most one exchange is issued per call. A failed exchange caches nothing.
	pub async fn access_token_at(&self, now: OffsetDateTime) -> Result<TokenSecret> {
		obs::observe(FlowKind::AccessToken, "access_token", async move {
			if let Some(current) = self.cached_token(now).await? {
				tracing::debug!(
					remaining_ms = current.remaining_at(now).whole_milliseconds() as i64,
					"reusing cached bearer token"
				);

				return Ok(current.value);
			}

			tracing::debug!("bearer token missing or expired, refreshing");

			Ok(self.refresh(now).await?.value)
		})
		.await
	}

	/// Reads the cached token, returning it only if it is still usable at `now`.
	///
	/// Unreadable records count as a miss so a corrupted entry heals on the next refresh.
	pub async fn cached_token(&self, now: OffsetDateTime) -> Result<Option<CachedToken>> {
		let raw = <dyn CredentialStore>::get(self.store.as_ref(), &self.cache_key).await?;
		let token = raw.and_then(|raw| match CachedToken::from_json(&raw) {
			Ok(token) => Some(token),
			Err(e) => {
				tracing::warn!(
					error = %e,
					key = %self.cache_key,
					"discarding unreadable cached token"
				);

				None
			},
		});

		Ok(token.filter(|token| token.is_usable_at(now)))
	}

	/// Performs one client-credentials exchange and caches the result.
	///
	/// Fails with [`crate::error::CredentialError::MissingClientCredentials`] before any network
	/// call when the client identifier or secret is absent.
	pub async fn refresh(&self, now: OffsetDateTime) -> Result<CachedToken> {
		let credentials = ClientCredentials::from_parts(
			self.client_id.as_deref(),
			self.client_secret.as_deref(),
		)?;
		let facade =
			BasicFacade::from_descriptor(&self.descriptor, &credentials, self.http_client.clone())?;
		let grant = facade.exchange_client_credentials().await?;
		let token = CachedToken::issue(grant.access_token, now, grant.expires_in);
		let raw = token.to_json().map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode cached token: {e}"),
		})?;

		<dyn CredentialStore>::set_with_ttl(
			self.store.as_ref(),
			&self.cache_key,
			raw,
			Some(grant.expires_in),
		)
		.await?;

		tracing::info!(expires_at_ms = token.expires_at_ms, "cached fresh bearer token");

		Ok(token)
	}
}
