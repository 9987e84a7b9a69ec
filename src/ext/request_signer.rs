//! "Before send" hook contract: anything that can carry an `Authorization` header value can be
//! signed by [`HeaderFactory::sign_request`](crate::factory::HeaderFactory::sign_request).

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Describes how to attach a minted header value to an outbound request without constraining
/// the HTTP client type.
///
/// Implementations must replace (not append to) any existing `Authorization` value, so a
/// request that is signed twice carries only the newest sequence number.
pub trait AuthorizationTarget
where
	Self: Sized,
{
	/// Consumes the request and returns it with `Authorization: <value>` set.
	fn set_authorization(self, value: &str) -> Result<Self>;
}

#[cfg(feature = "reqwest")]
impl AuthorizationTarget for reqwest::Request {
	fn set_authorization(mut self, value: &str) -> Result<Self> {
		let value = authorization_value(value)?;

		self.headers_mut().insert(reqwest::header::AUTHORIZATION, value);

		Ok(self)
	}
}

#[cfg(feature = "reqwest")]
impl AuthorizationTarget for reqwest::RequestBuilder {
	fn set_authorization(self, value: &str) -> Result<Self> {
		let (client, request) = self.build_split();
		let request = request.map_err(ConfigError::invalid_request)?.set_authorization(value)?;

		Ok(reqwest::RequestBuilder::from_parts(client, request))
	}
}

#[cfg(feature = "reqwest")]
fn authorization_value(value: &str) -> Result<reqwest::header::HeaderValue> {
	let mut value = reqwest::header::HeaderValue::from_str(value).map_err(ConfigError::from)?;

	value.set_sensitive(true);

	Ok(value)
}
