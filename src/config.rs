//! Serde-loadable configuration for the credential manager and the partner client.
//!
//! ```
//! use yt_partner::config::Config;
//!
//! let config = Config::from_json_str(
//! 	r#"{
//! 		"credential": {
//! 			"client_id": "1234.apps.googleusercontent.com",
//! 			"client_secret": "shh",
//! 			"scopes": ["https://www.googleapis.com/auth/youtubepartner"]
//! 		},
//! 		"partner": { "is_partner": true, "on_behalf_of_content_owner": "owner-1" }
//! 	}"#,
//! )
//! .expect("Config should parse.");
//!
//! assert_eq!(config.partner.calls_per_second, 2);
//! ```

// std
use std::{path::Path, time::Duration as StdDuration};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret},
	error::ConfigError,
	provider::ProviderEndpoints,
};

/// Production base URL of the partner API.
pub const PARTNER_API_BASE_URL: &str = "https://www.googleapis.com/youtube/partner/v1/";
/// Default number of partner calls admitted per second.
pub const DEFAULT_CALLS_PER_SECOND: u32 = 2;
/// Default timeout for token-endpoint and partner API requests.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default upper bound on a rate-gate wait.
pub const DEFAULT_GATE_TIMEOUT_MS: u64 = 10_000;

/// Client identity and token-endpoint settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Scopes requested at consent time.
	#[serde(default)]
	pub scopes: ScopeSet,
	/// Authorization and token endpoints.
	#[serde(default)]
	pub endpoints: ProviderEndpoints,
	/// Whole-request timeout for token-endpoint calls, in milliseconds.
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
}
impl CredentialConfig {
	/// Creates a configuration with Google endpoints and no scopes.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Secret::new(client_secret),
			scopes: ScopeSet::default(),
			endpoints: ProviderEndpoints::default(),
			request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
		}
	}

	/// Replaces the requested scopes.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}

	/// Replaces the provider endpoints.
	pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Overrides the token-endpoint request timeout.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

		self
	}

	/// Token-endpoint request timeout.
	pub fn request_timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.request_timeout_ms)
	}
}

/// Partner mode, rate limit, and partner API settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerConfig {
	/// Enables partner-only operations.
	pub is_partner: bool,
	/// Content owner on whose behalf partner calls are made.
	pub on_behalf_of_content_owner: Option<String>,
	/// Maximum partner calls admitted per wall-clock second.
	pub calls_per_second: u32,
	/// Upper bound on a rate-gate wait, in milliseconds. `null` waits indefinitely.
	pub gate_timeout_ms: Option<u64>,
	/// Upper bound on each partner API call, in milliseconds. `null` removes the bound.
	pub call_timeout_ms: Option<u64>,
	/// Base URL of the partner API.
	pub api_base_url: Url,
}
impl PartnerConfig {
	/// Enables partner mode for `owner`.
	pub fn partner(owner: impl Into<String>) -> Self {
		Self { is_partner: true, on_behalf_of_content_owner: Some(owner.into()), ..Self::default() }
	}

	/// Overrides the per-second call limit.
	pub fn with_calls_per_second(mut self, limit: u32) -> Self {
		self.calls_per_second = limit;

		self
	}

	/// Bounds every rate-gate wait.
	pub fn with_gate_timeout(mut self, timeout: StdDuration) -> Self {
		self.gate_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));

		self
	}

	/// Bounds every partner API call.
	pub fn with_call_timeout(mut self, timeout: StdDuration) -> Self {
		self.call_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));

		self
	}

	/// Points the partner API at another base URL.
	pub fn with_api_base_url(mut self, url: Url) -> Self {
		self.api_base_url = url;

		self
	}

	/// Owner id when partner mode is enabled and an id is configured.
	pub fn content_owner(&self) -> Option<&str> {
		self.on_behalf_of_content_owner
			.as_deref()
			.filter(|owner| self.is_partner && !owner.is_empty())
	}

	/// Rate-gate wait bound.
	pub fn gate_timeout(&self) -> Option<StdDuration> {
		self.gate_timeout_ms.map(StdDuration::from_millis)
	}

	/// Partner call bound.
	pub fn call_timeout(&self) -> Option<StdDuration> {
		self.call_timeout_ms.map(StdDuration::from_millis)
	}
}
impl Default for PartnerConfig {
	fn default() -> Self {
		Self {
			is_partner: false,
			on_behalf_of_content_owner: None,
			calls_per_second: DEFAULT_CALLS_PER_SECOND,
			gate_timeout_ms: Some(DEFAULT_GATE_TIMEOUT_MS),
			call_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
			api_base_url: default_api_base_url(),
		}
	}
}

/// Complete configuration document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
	/// Credential manager settings.
	pub credential: CredentialConfig,
	/// Partner client settings.
	#[serde(default)]
	pub partner: PartnerConfig,
}
impl Config {
	/// Parses a JSON document, reporting the failing field path.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(|e| ConfigError::Parse {
			path: e.path().to_string(),
			source: e.into_inner(),
		})
	}

	/// Reads and parses a JSON file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;

		Self::from_json_str(&raw)
	}
}

fn default_request_timeout_ms() -> u64 {
	DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_api_base_url() -> Url {
	Url::parse(PARTNER_API_BASE_URL)
		.unwrap_or_else(|_| unreachable!("Partner API base URL constant is a valid URL."))
}
