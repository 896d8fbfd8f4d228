//! Optional observability helpers for credential and partner operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `yt_partner.op` with the `op` and `stage`
//!   (call site) fields, plus a debug event whenever the rate gate suspends a caller.
//! - Enable `metrics` to increment the `yt_partner_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and to record gate stalls in the
//!   `yt_partner_gate_wait_seconds` histogram.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Credential manager start-up (store load plus refresh-on-expiry).
	Initialize,
	/// Authorization-code exchange.
	AuthorizationCode,
	/// Refresh token grant.
	Refresh,
	/// Single gated partner API call.
	PartnerCall,
	/// `monetize_video` workflow.
	Monetize,
	/// Policy fetch or construction.
	Policy,
	/// Resumable media upload.
	Upload,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Initialize => "initialize",
			OpKind::AuthorizationCode => "authorization_code",
			OpKind::Refresh => "refresh",
			OpKind::PartnerCall => "partner_call",
			OpKind::Monetize => "monetize",
			OpKind::Policy => "policy",
			OpKind::Upload => "upload",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the final outcome of `result` for `kind`.
pub(crate) fn record_result<T>(kind: OpKind, result: &Result<T>) {
	record_op_outcome(kind, if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure });
}
