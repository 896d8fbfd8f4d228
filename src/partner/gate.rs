//! Per-second admission control for partner API calls.
//!
//! The gate counts admissions inside the current wall-clock second. Once `limit` callers
//! have been admitted, later callers sleep until the next second boundary and try again.
//! There is no queue, so callers woken at the same boundary race for the fresh slots.

mod clock;

pub use clock::*;

// self
use crate::{_prelude::*, obs};

/// Calls admitted per second when no limit is configured.
pub const DEFAULT_LIMIT: u32 = 2;

/// Admission counters for the current second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateWindow {
	/// Unix second the counters belong to.
	pub window_start_second: i64,
	/// Admissions granted inside the window.
	pub calls_in_window: u32,
	/// Maximum admissions per window.
	pub limit: u32,
}
impl RateWindow {
	fn new(limit: u32) -> Self {
		Self { window_start_second: i64::MIN, calls_in_window: 0, limit }
	}

	// Seconds earlier than the window never reset it.
	fn try_admit(&mut self, second: i64) -> Result<i64, i64> {
		if second > self.window_start_second {
			self.window_start_second = second;
			self.calls_in_window = 0;
		}
		if self.calls_in_window < self.limit {
			self.calls_in_window += 1;

			Ok(self.window_start_second)
		} else {
			Err(self.window_start_second.saturating_add(1))
		}
	}
}

/// Result of a successful [`RateGate::admit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
	/// Second the admission was counted against.
	pub window_second: i64,
	/// Clock time spent suspended before admission.
	pub waited: std::time::Duration,
}

/// At-most-N-per-second gate shared by every partner call of one client.
#[derive(Debug)]
pub struct RateGate {
	window: Mutex<RateWindow>,
	clock: Arc<dyn Clock>,
}
impl RateGate {
	/// Creates a gate on the system clock; a `limit` of zero is treated as one.
	pub fn new(limit: u32) -> Self {
		Self { window: Mutex::new(RateWindow::new(limit.max(1))), clock: Arc::new(SystemClock) }
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Maximum admissions per second.
	pub fn limit(&self) -> u32 {
		self.window.lock().limit
	}

	/// Snapshot of the current window.
	pub fn window(&self) -> RateWindow {
		*self.window.lock()
	}

	/// Waits until the call may proceed, then counts it.
	///
	/// Never fails; a full window only delays the caller until the next second. Dropping
	/// the future while it waits consumes no slot.
	pub async fn admit(&self) -> Admission {
		let started = self.clock.now();
		let mut suspended = false;

		loop {
			let now = self.clock.now();
			let outcome = self.window.lock().try_admit(now.unix_timestamp());

			match outcome {
				Ok(window_second) => {
					let waited = if suspended {
						(now - started).unsigned_abs()
					} else {
						std::time::Duration::ZERO
					};

					if suspended {
						obs::trace_gate_wait(window_second, waited);
						obs::record_gate_wait(waited);
					}

					return Admission { window_second, waited };
				},
				Err(reset_second) => {
					suspended = true;

					let boundary = OffsetDateTime::from_unix_timestamp(reset_second)
						.unwrap_or(now + Duration::SECOND);

					self.clock.sleep_until(boundary).await;
				},
			}
		}
	}

	/// [`RateGate::admit`] bounded by `timeout`; expiry yields [`Error::Timeout`].
	pub async fn admit_within(&self, timeout: std::time::Duration) -> Result<Admission> {
		tokio::time::timeout(timeout, self.admit())
			.await
			.map_err(|_| Error::Timeout { operation: "rate gate admission" })
	}
}
impl Default for RateGate {
	fn default() -> Self {
		Self::new(DEFAULT_LIMIT)
	}
}
