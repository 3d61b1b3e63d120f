//! Lookup boundary: turns a JSON request body into a status code plus JSON reply.
//!
//! Request: `{"id": "<id, link, or URI>", "type": "track" | "album"}` (`type` defaults to
//! `track`). Replies carry the raw catalog entity on success and `{"error": "…"}` otherwise:
//! 400 for unresolvable input, the upstream status for catalog rejections, and an opaque 500
//! for anything else.

// self
use crate::{
	_prelude::*,
	catalog::Catalog,
	http::TokenHttpClient,
	resolve::{EntityRef, EntityType},
};

const INTERNAL_ERROR: &str = "Internal Server Error";

/// Inbound lookup request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
	/// Raw identifier, web link, or URI.
	pub id: String,
	/// Entity kind the input refers to.
	#[serde(default, rename = "type")]
	pub kind: EntityType,
}

/// Status code plus JSON body produced by the boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// JSON reply body.
	pub body: serde_json::Value,
}
impl ApiResponse {
	/// Successful reply carrying `body`.
	pub fn ok(body: serde_json::Value) -> Self {
		Self { status: 200, body }
	}

	/// Failure reply of the form `{"error": message}`.
	pub fn error(status: u16, message: impl Into<String>) -> Self {
		Self { status, body: serde_json::json!({ "error": message.into() }) }
	}

	/// Whether the status is 2xx.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Handles one lookup request body.
pub async fn handle_lookup<C>(catalog: &Catalog<C>, body: &[u8]) -> ApiResponse
where
	C: ?Sized + TokenHttpClient,
{
	let request = match serde_json::from_slice::<LookupRequest>(body) {
		Ok(request) => request,
		Err(e) => {
			tracing::debug!(error = %e, "rejecting malformed lookup body");

			return ApiResponse::error(400, invalid_input_message(EntityType::Track));
		},
	};
	let entity = match EntityRef::parse(&request.id, request.kind) {
		Ok(entity) => entity,
		Err(e) => return ApiResponse::error(400, e.to_string()),
	};

	match catalog.fetch_raw(&entity).await {
		Ok(raw) => ApiResponse::ok(raw),
		Err(e) => into_response(e),
	}
}

fn into_response(err: Error) -> ApiResponse {
	match err {
		Error::InvalidInput { kind, .. } => ApiResponse::error(400, invalid_input_message(kind)),
		Error::Lookup(lookup) => ApiResponse::error(lookup.status, lookup.body),
		other => {
			tracing::error!(error = %other, "lookup failed unexpectedly");

			ApiResponse::error(500, INTERNAL_ERROR)
		},
	}
}

fn invalid_input_message(kind: EntityType) -> String {
	format!("Invalid Spotify {kind} ID")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{CredentialError, LookupError};

	#[test]
	fn request_type_defaults_to_track() {
		let request: LookupRequest =
			serde_json::from_str(r#"{"id":"abc"}"#).expect("Request should parse.");

		assert_eq!(request.kind, EntityType::Track);
	}

	#[test]
	fn lookup_failures_pass_through_verbatim() {
		let response = into_response(LookupError { status: 404, body: "non existing id".into() }.into());

		assert_eq!(response.status, 404);
		assert_eq!(response.body, serde_json::json!({ "error": "non existing id" }));
	}

	#[test]
	fn credential_failures_stay_opaque() {
		let response = into_response(
			CredentialError::Exchange { status: 400, body: "invalid_client secret=xyz".into() }
				.into(),
		);

		assert_eq!(response.status, 500);
		assert_eq!(response.body, serde_json::json!({ "error": "Internal Server Error" }));
		assert!(!response.is_success());
	}
}
