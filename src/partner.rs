//! Partner-mode client: gated API calls plus the monetization and policy workflows.
//!
//! Every remote call made through [`PartnerClient`] first passes its [`RateGate`], so any
//! number of concurrent workflows sharing one client stay under the configured per-second
//! limit together.

pub mod api;
pub mod gate;
pub mod model;
pub mod monetize;
pub mod patch;
pub mod policy;

pub use api::*;
pub use gate::*;
pub use model::*;
pub use monetize::*;
pub use patch::*;

// self
use crate::{
	_prelude::*,
	config::PartnerConfig,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Partner API client scoped to one content owner.
#[derive(Clone)]
pub struct PartnerClient {
	api: Arc<dyn PartnerApi>,
	gate: Arc<RateGate>,
	config: PartnerConfig,
}
impl PartnerClient {
	/// Creates a client with a private gate sized by
	/// [`PartnerConfig::calls_per_second`].
	pub fn new(api: Arc<dyn PartnerApi>, config: PartnerConfig) -> Self {
		let gate = Arc::new(RateGate::new(config.calls_per_second));

		Self { api, gate, config }
	}

	/// Shares `gate` with other clients instead of the private one.
	pub fn with_gate(mut self, gate: Arc<RateGate>) -> Self {
		self.gate = gate;

		self
	}

	/// Gate every call of this client passes through.
	pub fn gate(&self) -> &Arc<RateGate> {
		&self.gate
	}

	/// Underlying API seam.
	pub fn api(&self) -> &Arc<dyn PartnerApi> {
		&self.api
	}

	/// Partner settings.
	pub fn config(&self) -> &PartnerConfig {
		&self.config
	}

	/// Request scope for the configured owner, or [`Error::NotAPartner`] outside partner
	/// mode.
	pub fn partner_context(&self) -> Result<PartnerContext> {
		self.config.content_owner().map(PartnerContext::new).ok_or(Error::NotAPartner)
	}

	/// Runs one API call behind the gate and the configured timeouts.
	pub(crate) async fn gated<'a, T, F>(&'a self, operation: &'static str, call: F) -> Result<T>
	where
		F: FnOnce(&'a dyn PartnerApi) -> PartnerFuture<'a, T>,
	{
		const KIND: OpKind = OpKind::PartnerCall;

		let span = OpSpan::new(KIND, operation);

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				match self.config.gate_timeout() {
					Some(timeout) => {
						self.gate.admit_within(timeout).await?;
					},
					None => {
						self.gate.admit().await;
					},
				}

				let fut = call(self.api.as_ref());

				match self.config.call_timeout() {
					Some(timeout) => tokio::time::timeout(timeout, fut)
						.await
						.map_err(|_| Error::Timeout { operation })?,
					None => fut.await,
				}
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
impl Debug for PartnerClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PartnerClient")
			.field("content_owner", &self.config.content_owner())
			.field("calls_per_second", &self.gate.limit())
			.finish()
	}
}
