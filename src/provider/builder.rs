// self
use crate::{_prelude::*, provider::CatalogDescriptor};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CatalogDescriptorError {
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Catalog API base is mandatory.
	#[error("Missing catalog API base.")]
	MissingApiBase,
	/// Endpoints must use HTTPS unless they point at the local machine.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint could not be parsed or joined.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Offending URL text.
		url: String,
	},
}

/// Builder for [`CatalogDescriptor`] values.
#[derive(Debug, Default)]
pub struct CatalogDescriptorBuilder {
	/// Token endpoint used for exchanges.
	pub token_endpoint: Option<Url>,
	/// Catalog API base.
	pub api_base: Option<Url>,
}
impl CatalogDescriptorBuilder {
	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the catalog API base.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<CatalogDescriptor, CatalogDescriptorError> {
		let token_endpoint =
			self.token_endpoint.ok_or(CatalogDescriptorError::MissingTokenEndpoint)?;
		let api_base = self.api_base.ok_or(CatalogDescriptorError::MissingApiBase)?;

		validate_endpoint("token", &token_endpoint)?;
		validate_endpoint("api", &api_base)?;

		Ok(CatalogDescriptor { token_endpoint, api_base })
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), CatalogDescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(CatalogDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}
