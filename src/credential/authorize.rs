//! Consent URL construction and the authorization-code exchange.

// self
use crate::{
	_prelude::*,
	auth::RawAuthorization,
	credential::CredentialManager,
	http::TokenHttpClient,
	oauth::{OAuth2Facade, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
};

impl<C, M> CredentialManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the consent URL the user must visit to grant offline access.
	///
	/// `scope` is sent verbatim; `None` falls back to the configured scopes joined by
	/// spaces.
	pub fn authorization_url(&self, redirect_url: &str, scope: Option<&str>) -> Url {
		let mut url = self.config.endpoints.authorization.clone();
		let default_scope;
		let scope = match scope {
			Some(scope) => scope,
			None => {
				default_scope = self.config.scopes.normalized();

				default_scope.as_str()
			},
		};

		url.query_pairs_mut()
			.append_pair("client_id", &self.config.client_id)
			.append_pair("redirect_uri", redirect_url)
			.append_pair("scope", scope)
			.append_pair("response_type", "code")
			.append_pair("access_type", "offline");

		url
	}

	/// Exchanges the one-time `code` returned to `redirect_url`, installs the resulting
	/// bundle, and saves it.
	///
	/// A response without a refresh token fails with [`Error::MissingRefreshToken`] and
	/// nothing is installed or saved.
	pub async fn complete_authorization(
		&self,
		redirect_url: &str,
		code: &str,
	) -> Result<RawAuthorization> {
		const KIND: OpKind = OpKind::AuthorizationCode;

		let span = OpSpan::new(KIND, "complete_authorization");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;
				let mut authorization = self
					.facade
					.exchange_authorization_code(self.strategy.as_ref(), code, redirect_url)
					.await?;

				authorization.stamp_created(OffsetDateTime::now_utc());
				self.install(authorization.clone());
				self.store.save(authorization.clone()).await?;

				Ok(authorization)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
