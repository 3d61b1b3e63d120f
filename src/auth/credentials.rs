//! Statically configured OAuth client credentials.

// self
use crate::{_prelude::*, auth::TokenSecret, error::CredentialError};

/// Client identifier and secret used for the client-credentials exchange.
#[derive(Clone)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Builds credentials from optional configuration values.
	///
	/// Blank values count as missing so an empty environment variable never reaches the
	/// token endpoint.
	pub fn from_parts(
		client_id: Option<&str>,
		client_secret: Option<&str>,
	) -> Result<Self, CredentialError> {
		match (non_blank(client_id), non_blank(client_secret)) {
			(Some(id), Some(secret)) =>
				Ok(Self { client_id: id.to_owned(), client_secret: TokenSecret::new(secret) }),
			_ => Err(CredentialError::MissingClientCredentials),
		}
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}
