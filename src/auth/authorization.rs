//! Opaque provider token bundle plus the credential view derived from it.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret},
};

/// Expiry leeway applied by [`RawAuthorization::is_expired_at`].
pub const EXPIRY_LEEWAY: Duration = Duration::seconds(30);

const SECRET_FIELDS: [&str; 3] = ["access_token", "refresh_token", "id_token"];

/// Provider token bundle exactly as returned by the token endpoint.
///
/// The bundle is persisted by the host through a [`TokenStore`](crate::store::TokenStore)
/// and is otherwise opaque: only `access_token`, `refresh_token`, `expires_in`, `created`,
/// and `scope` are read, and every other field survives refreshes untouched. `created`
/// (unix seconds) is stamped when the bundle is installed so expiry can be computed from
/// the issue time plus the declared lifetime.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAuthorization(JsonMap<String, JsonValue>);
impl RawAuthorization {
	/// Wraps a JSON object.
	pub fn from_map(map: JsonMap<String, JsonValue>) -> Self {
		Self(map)
	}

	/// Parses a bundle from JSON bytes; the top-level value must be an object.
	pub fn from_json_slice(
		bytes: &[u8],
	) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Parses a bundle from a JSON string.
	pub fn from_json_str(
		raw: &str,
	) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		Self::from_json_slice(raw.as_bytes())
	}

	/// Serializes the bundle back into its JSON form.
	pub fn to_json_string(&self) -> String {
		JsonValue::Object(self.0.clone()).to_string()
	}

	/// Borrows the underlying JSON object.
	pub fn as_map(&self) -> &JsonMap<String, JsonValue> {
		&self.0
	}

	/// Consumes the bundle, returning the JSON object.
	pub fn into_map(self) -> JsonMap<String, JsonValue> {
		self.0
	}

	/// Returns the access token, if present and non-empty.
	pub fn access_token(&self) -> Option<&str> {
		self.non_empty_str("access_token")
	}

	/// Returns the refresh token, if present and non-empty.
	pub fn refresh_token(&self) -> Option<&str> {
		self.non_empty_str("refresh_token")
	}

	/// Returns the raw `scope` field (space-delimited).
	pub fn scope(&self) -> Option<&str> {
		self.non_empty_str("scope")
	}

	/// Declared lifetime in seconds.
	///
	/// Numeric strings are accepted because some stores round-trip numbers as text.
	pub fn expires_in(&self) -> Option<i64> {
		read_i64(self.0.get("expires_in")?)
	}

	/// Issue instant stamped into the bundle.
	pub fn created(&self) -> Option<OffsetDateTime> {
		let secs = read_i64(self.0.get("created")?)?;

		OffsetDateTime::from_unix_timestamp(secs).ok()
	}

	/// Absolute expiry (`created + expires_in`), or `None` without a declared lifetime.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let lifetime = self.expires_in()?;
		let created = self.created().unwrap_or(OffsetDateTime::UNIX_EPOCH);

		created.checked_add(Duration::seconds(lifetime))
	}

	/// Expiry predicate evaluated at `now`.
	///
	/// A bundle without `expires_in` is always expired; a missing `created` counts as the
	/// unix epoch. The access token is treated as expired [`EXPIRY_LEEWAY`] early.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		match self.expires_at() {
			Some(expires_at) => expires_at - EXPIRY_LEEWAY < now,
			None => true,
		}
	}

	/// Expiry predicate evaluated against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Sets or replaces a top-level field.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
		self.0.insert(key.into(), value.into());
	}

	/// Stamps `created` with `now` unless the provider already supplied one.
	pub(crate) fn stamp_created(&mut self, now: OffsetDateTime) {
		if self.created().is_none() {
			self.set("created", now.unix_timestamp());
		}
	}

	fn non_empty_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(JsonValue::as_str).filter(|value| !value.is_empty())
	}
}
impl Debug for RawAuthorization {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (key, value) in &self.0 {
			if SECRET_FIELDS.contains(&key.as_str()) {
				map.entry(key, &"<redacted>");
			} else {
				map.entry(key, value);
			}
		}

		map.finish()
	}
}

/// Client identity plus the currently installed token state.
#[derive(Clone, Debug)]
pub struct Credential {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Current access token.
	pub access_token: Option<Secret>,
	/// Refresh token used to renew the access token.
	pub refresh_token: Option<Secret>,
	/// Absolute expiry of the access token.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes granted by the provider, or the configured scopes when the bundle omits them.
	pub scopes: ScopeSet,
}
impl Credential {
	/// Builds the credential view for `authorization`.
	pub fn from_authorization(
		client_id: impl Into<String>,
		client_secret: Secret,
		configured_scopes: &ScopeSet,
		authorization: &RawAuthorization,
	) -> Self {
		let scopes = authorization
			.scope()
			.and_then(|raw| raw.parse::<ScopeSet>().ok())
			.unwrap_or_else(|| configured_scopes.clone());

		Self {
			client_id: client_id.into(),
			client_secret,
			access_token: authorization.access_token().map(Secret::new),
			refresh_token: authorization.refresh_token().map(Secret::new),
			expires_at: authorization.expires_at(),
			scopes,
		}
	}

	/// Returns `true` when the credential carries a refresh token.
	pub fn is_refreshable(&self) -> bool {
		self.refresh_token.as_ref().is_some_and(|secret| !secret.is_empty())
	}
}

fn read_i64(value: &JsonValue) -> Option<i64> {
	match value {
		JsonValue::Number(number) => number.as_i64(),
		JsonValue::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}
