//! Classification of token-endpoint rejections.

// self
use crate::{_prelude::*, provider::GrantType};

/// Hook that classifies token-endpoint failures and may extend the code-exchange form.
pub trait ProviderStrategy: Send + Sync {
	/// Maps a token-endpoint rejection onto the crate's error taxonomy.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Adds provider-specific parameters to the authorization-code exchange form.
	fn augment_token_request(&self, _grant: GrantType, _form: &mut BTreeMap<String, String>) {}
}

/// Error categories a strategy can pick from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The code or refresh token is no longer accepted; the user must consent again.
	InvalidGrant,
	/// The OAuth client itself was rejected.
	InvalidClient,
	/// The grant does not cover the requested scopes.
	InsufficientScope,
	/// Temporary failure; retrying later may succeed.
	Transient,
}

/// What the token endpoint said, reduced to plain data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Grant that was being requested.
	pub grant_type: GrantType,
	/// HTTP status of the rejection.
	pub http_status: Option<u16>,
	/// OAuth `error` code.
	pub oauth_error: Option<String>,
	/// OAuth `error_description`.
	pub error_description: Option<String>,
	/// Leading part of a body that was not an OAuth error document.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Empty context for `grant_type`.
	pub fn new(grant_type: GrantType) -> Self {
		Self {
			grant_type,
			http_status: None,
			oauth_error: None,
			error_description: None,
			body_preview: None,
		}
	}

	/// Sets the HTTP status.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Sets the OAuth `error` code.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Sets the OAuth `error_description`.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Keeps at most 256 characters of `body`, marking a cut with `…`.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		let body = body.into();
		let mut preview = body.chars().take(Self::BODY_PREVIEW_LIMIT).collect::<String>();

		if preview.len() < body.len() {
			preview.push('…');
		}

		self.body_preview = Some(preview);

		self
	}
}

/// Classification tuned to the error codes Google's token endpoint returns.
///
/// A known `error` code decides first. Without one, the description is checked for the
/// revocation and rate-limit wording Google uses, and the HTTP status decides last.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoogleTokenStrategy;
impl GoogleTokenStrategy {
	fn classify_code(code: &str, grant: GrantType) -> Option<ProviderErrorKind> {
		let kind = match code.to_ascii_lowercase().as_str() {
			"invalid_grant" | "access_denied" | "admin_policy_enforced" =>
				ProviderErrorKind::InvalidGrant,
			"invalid_client" | "unauthorized_client" | "deleted_client" | "disabled_client"
			| "redirect_uri_mismatch" | "org_internal" => ProviderErrorKind::InvalidClient,
			"invalid_scope" | "insufficient_scope" | "insufficientpermissions" =>
				ProviderErrorKind::InsufficientScope,
			"temporarily_unavailable" | "server_error" | "internal_failure" | "backenderror"
			| "rate_limit_exceeded" | "ratelimitexceeded" | "userratelimitexceeded" =>
				ProviderErrorKind::Transient,
			// A malformed refresh token is reported this way; for a code exchange it means
			// the client sent a bad request.
			"invalid_request" => match grant {
				GrantType::RefreshToken => ProviderErrorKind::InvalidGrant,
				GrantType::AuthorizationCode => ProviderErrorKind::InvalidClient,
			},
			_ => return None,
		};

		Some(kind)
	}

	fn classify_text(text: &str) -> Option<ProviderErrorKind> {
		let text = text.to_ascii_lowercase();

		if text.contains("revoked") || text.contains("expired") || text.contains("invalid_grant") {
			Some(ProviderErrorKind::InvalidGrant)
		} else if text.contains("rate limit") || text.contains("try again") {
			Some(ProviderErrorKind::Transient)
		} else {
			None
		}
	}

	fn classify_status(status: Option<u16>) -> ProviderErrorKind {
		match status {
			Some(401) => ProviderErrorKind::InvalidClient,
			Some(403) => ProviderErrorKind::InsufficientScope,
			Some(429) => ProviderErrorKind::Transient,
			Some(code) if (400..500).contains(&code) => ProviderErrorKind::InvalidGrant,
			_ => ProviderErrorKind::Transient,
		}
	}
}
impl ProviderStrategy for GoogleTokenStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		ctx.oauth_error
			.as_deref()
			.and_then(|code| Self::classify_code(code, ctx.grant_type))
			.or_else(|| ctx.error_description.as_deref().and_then(Self::classify_text))
			.or_else(|| ctx.body_preview.as_deref().and_then(Self::classify_text))
			.unwrap_or_else(|| Self::classify_status(ctx.http_status))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn refresh(status: u16) -> ProviderErrorContext {
		ProviderErrorContext::new(GrantType::RefreshToken).with_http_status(status)
	}

	#[test]
	fn revoked_refresh_token_is_invalid_grant() {
		let ctx = refresh(400)
			.with_oauth_error("invalid_grant")
			.with_error_description("Token has been expired or revoked.");

		assert_eq!(GoogleTokenStrategy.classify_token_error(&ctx), ProviderErrorKind::InvalidGrant);

		// Same wording without the code.
		let ctx = refresh(400).with_error_description("Token has been expired or revoked.");

		assert_eq!(GoogleTokenStrategy.classify_token_error(&ctx), ProviderErrorKind::InvalidGrant);
	}

	#[test]
	fn deleted_client_is_invalid_client() {
		let ctx = refresh(401)
			.with_oauth_error("deleted_client")
			.with_error_description("The OAuth client was deleted.");

		assert_eq!(GoogleTokenStrategy.classify_token_error(&ctx), ProviderErrorKind::InvalidClient);
	}

	#[test]
	fn rate_limit_code_beats_forbidden_status() {
		let ctx = refresh(403).with_oauth_error("rateLimitExceeded");

		assert_eq!(GoogleTokenStrategy.classify_token_error(&ctx), ProviderErrorKind::Transient);
	}

	#[test]
	fn invalid_request_depends_on_grant() {
		let refresh = refresh(400).with_oauth_error("invalid_request");
		let code = ProviderErrorContext::new(GrantType::AuthorizationCode)
			.with_http_status(400)
			.with_oauth_error("invalid_request");

		assert_eq!(GoogleTokenStrategy.classify_token_error(&refresh), ProviderErrorKind::InvalidGrant);
		assert_eq!(GoogleTokenStrategy.classify_token_error(&code), ProviderErrorKind::InvalidClient);
	}

	#[test]
	fn unknown_codes_fall_back_to_status() {
		let classify = |status| {
			GoogleTokenStrategy.classify_token_error(&refresh(status).with_oauth_error("weird"))
		};

		assert_eq!(classify(400), ProviderErrorKind::InvalidGrant);
		assert_eq!(classify(401), ProviderErrorKind::InvalidClient);
		assert_eq!(classify(403), ProviderErrorKind::InsufficientScope);
		assert_eq!(classify(429), ProviderErrorKind::Transient);
		assert_eq!(classify(502), ProviderErrorKind::Transient);
	}

	#[test]
	fn html_outage_page_is_transient() {
		let ctx = refresh(503).with_body_preview("<html><body>Service Unavailable</body></html>");

		assert_eq!(GoogleTokenStrategy.classify_token_error(&ctx), ProviderErrorKind::Transient);
	}

	#[test]
	fn long_bodies_are_cut() {
		let ctx = refresh(500).with_body_preview("x".repeat(1_000));
		let preview = ctx.body_preview.expect("Preview should be recorded.");

		assert_eq!(preview.chars().count(), ProviderErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}
