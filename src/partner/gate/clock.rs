//! Time sources for the rate gate.

// crates.io
use tokio::sync::watch;
// self
use crate::_prelude::*;

/// Boxed future returned by [`Clock::sleep_until`].
pub type ClockFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Wall-clock source with a cooperative sleep.
pub trait Clock
where
	Self: Debug + Send + Sync,
{
	/// Current wall-clock instant.
	fn now(&self) -> OffsetDateTime;

	/// Resolves once [`Clock::now`] has reached `deadline`.
	fn sleep_until(&self, deadline: OffsetDateTime) -> ClockFuture<'_>;
}

/// UTC system clock backed by tokio timers.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	fn sleep_until(&self, deadline: OffsetDateTime) -> ClockFuture<'_> {
		Box::pin(async move {
			loop {
				let remaining = deadline - OffsetDateTime::now_utc();

				if !remaining.is_positive() {
					return;
				}

				tokio::time::sleep(remaining.unsigned_abs()).await;
			}
		})
	}
}

/// Clock that only moves when told to; sleepers wake on every change.
#[derive(Clone, Debug)]
pub struct ManualClock {
	now: Arc<watch::Sender<OffsetDateTime>>,
}
impl ManualClock {
	/// Creates a clock frozen at `start`.
	pub fn new(start: OffsetDateTime) -> Self {
		let (now, _) = watch::channel(start);

		Self { now: Arc::new(now) }
	}

	/// Moves the clock forward by `by`.
	pub fn advance(&self, by: Duration) {
		self.now.send_modify(|now| *now += by);
	}

	/// Jumps to `instant`, which may lie in the past.
	pub fn set(&self, instant: OffsetDateTime) {
		self.now.send_replace(instant);
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.now.borrow()
	}

	fn sleep_until(&self, deadline: OffsetDateTime) -> ClockFuture<'_> {
		let mut ticks = self.now.subscribe();

		Box::pin(async move {
			loop {
				if *ticks.borrow_and_update() >= deadline {
					return;
				}
				if ticks.changed().await.is_err() {
					return;
				}
			}
		})
	}
}
