//! Authorization provider endpoints (data) and strategies (behavior).
//!
//! [`ProviderEndpoints`] names the consent and token endpoints and defaults to Google's
//! production URLs. [`ProviderStrategy`] classifies token-endpoint rejections into the
//! crate's error taxonomy without tying the credential manager to an HTTP client.

pub mod strategy;

pub use strategy::*;

// self
use crate::_prelude::*;

/// Google's OAuth 2.0 consent endpoint.
pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/token";

/// OAuth 2.0 grants used by the credential manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// One-time authorization code exchanged after user consent.
	AuthorizationCode,
	/// Refresh token grant used when the stored access token has expired.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Consent and token endpoints of the authorization provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Consent redirect endpoint.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
}
impl ProviderEndpoints {
	/// Builds an endpoint pair from string URLs.
	pub fn parse(authorization: &str, token: &str) -> Result<Self, url::ParseError> {
		Ok(Self { authorization: Url::parse(authorization)?, token: Url::parse(token)? })
	}

	/// Google's production endpoints.
	pub fn google() -> Self {
		Self::parse(GOOGLE_AUTHORIZATION_ENDPOINT, GOOGLE_TOKEN_ENDPOINT)
			.unwrap_or_else(|_| unreachable!("Google endpoint constants are valid URLs."))
	}
}
impl Default for ProviderEndpoints {
	fn default() -> Self {
		Self::google()
	}
}
