//! Refresh-on-expiry with a single-flight guard.
//!
//! Concurrent callers serialize on one guard per manager; whoever acquires it second sees
//! the bundle the first caller installed and skips the grant.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	credential::CredentialManager,
	error::ConfigError,
	http::TokenHttpClient,
	oauth::{OAuth2Facade, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
};

impl<C, M> CredentialManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Refreshes the installed bundle when it has expired, then persists it.
	///
	/// Returns `Ok(true)` when a refresh grant was issued, `Ok(false)` when nothing is
	/// installed or the access token is still valid. The previous refresh token is kept when
	/// the provider does not rotate it.
	pub async fn refresh_if_expired(&self) -> Result<bool> {
		const KIND: OpKind = OpKind::Refresh;

		let _singleflight = self.refresh_guard.lock().await;
		let now = OffsetDateTime::now_utc();
		let Some(mut current) = self.authorization() else {
			return Ok(false);
		};

		if !current.is_expired_at(now) {
			return Ok(false);
		}

		let span = OpSpan::new(KIND, "refresh_if_expired");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async {
				let refresh_token = current
					.refresh_token()
					.map(str::to_owned)
					.ok_or(ConfigError::StoredAuthorizationWithoutRefreshToken)?;
				let refreshed =
					self.facade.refresh_token(self.strategy.as_ref(), &refresh_token).await?;

				refreshed.merge_into(&mut current, OffsetDateTime::now_utc());
				self.install(current.clone());
				self.store.save(current).await?;

				Ok(true)
			})
			.await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		obs::record_result(KIND, &result);

		result
	}
}
