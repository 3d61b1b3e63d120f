//! Crate-level error types shared by the broker, catalog, stores, and compositor.

// self
use crate::{_prelude::*, resolve::EntityType};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Input could not be resolved into a catalog identifier.
	#[error("Invalid Spotify {kind} ID")]
	InvalidInput {
		/// Raw input supplied by the caller.
		input: String,
		/// Entity type the input was resolved against.
		kind: EntityType,
	},
	/// Bearer credential could not be obtained.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Catalog answered with a non-success status.
	#[error(transparent)]
	Lookup(#[from] LookupError),
	/// Catalog payload does not carry what rendering needs.
	#[error(transparent)]
	Metadata(#[from] MetadataError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Compositor failure.
	#[error(transparent)]
	Render(#[from] RenderError),
}

/// Failures raised while minting or caching the catalog bearer token.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// Client identifier or secret is not configured.
	#[error("Client credentials are not configured.")]
	MissingClientCredentials,
	/// Token endpoint rejected the exchange.
	#[error("Token exchange failed with status {status}: {body}")]
	Exchange {
		/// HTTP status returned by the token endpoint.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	Request(#[from] oauth2::http::Error),
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}

/// Non-success answer from the catalog, carried verbatim to the boundary.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Catalog lookup failed with status {status}: {body}")]
pub struct LookupError {
	/// Upstream HTTP status code.
	pub status: u16,
	/// Raw upstream body text.
	pub body: String,
}

/// Catalog payload narrowing failures.
#[derive(Debug, ThisError)]
pub enum MetadataError {
	/// Payload does not match the entity schema.
	#[error("Catalog entity payload is malformed.")]
	Schema {
		/// Structured parsing failure naming the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Entity carries no cover image.
	#[error("Catalog entity `{name}` has no cover image.")]
	MissingCover {
		/// Entity display name.
		name: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Required environment variable is absent.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Endpoint or store address cannot be parsed.
	#[error("`{value}` is not a valid URL.")]
	InvalidUrl {
		/// Offending value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Descriptor validation failed.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::CatalogDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Short label of the remote being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(target: &'static str, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { target, source: Box::new(src) }
	}
}

/// Compositor failures.
#[derive(Debug, ThisError)]
pub enum RenderError {
	/// A resource could not be fetched.
	#[error("Failed to load {what} from `{location}`: {message}")]
	Asset {
		/// Which resource failed (cover, logo, font).
		what: &'static str,
		/// Location the resource was requested from.
		location: String,
		/// Human-readable failure.
		message: String,
	},
	/// Image bytes could not be decoded.
	#[error("Failed to decode the {what} image.")]
	Decode {
		/// Which image failed.
		what: &'static str,
		/// Decoder failure.
		#[source]
		source: image::ImageError,
	},
	/// Font bytes could not be parsed.
	#[error("Font data from `{location}` is not a usable face.")]
	Font {
		/// Location the font was loaded from.
		location: String,
	},
	/// PNG serialization failed.
	#[error("Failed to encode the card as PNG: {message}")]
	Encode {
		/// Encoder failure.
		message: String,
	},
	/// Exported card could not be written to disk.
	#[error("Failed to write the card to {path}.")]
	Write {
		/// Destination path.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Nothing has been committed to the surface yet.
	#[error("No card has been rendered yet.")]
	NothingRendered,
}
