//! Periodic tick timing service.
//!
//! Each node owns one [`Ticker`]. Starting it spawns a producer task that
//! increments a shared [`TickCounter`] once per period, the way a timer
//! compare-match interrupt would. The node's control flow blocks on
//! [`TickCounter::wait_until`] and resets the counter when the target is
//! reached.
//!
//! # Shared state
//!
//! The counter is the only state shared between the producer and the control
//! flow. It is a single atomic word:
//!
//! - the producer only increments (`Release`) and wakes waiters;
//! - the control flow only reads (`Acquire`) and resets (`Release`).
//!
//! No lock guards it. A reset may race with an increment that lands in the
//! same instant; the control flow only resets after the target has been seen
//! and always stops the producer first, so the race can at most lose one
//! tick that belonged to a finished wait.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use doorlock_core::Ticker;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let ticker = Ticker::new(Duration::from_secs(1));
//! let started = tokio::time::Instant::now();
//!
//! ticker.run_for(3).await;
//!
//! assert_eq!(started.elapsed(), Duration::from_secs(3));
//! assert_eq!(ticker.counter().get(), 0);
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

#[derive(Debug, Default)]
struct TickShared {
    count: AtomicU32,
    changed: Notify,
}

/// Tick counter shared between the producer task and the control flow.
///
/// Cloning yields another handle to the same counter.
#[derive(Debug, Clone, Default)]
pub struct TickCounter {
    shared: Arc<TickShared>,
}

impl TickCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tick and wake any waiter. Returns the new count.
    pub fn increment(&self) -> u32 {
        let count = self
            .shared
            .count
            .fetch_add(1, Ordering::Release)
            .wrapping_add(1);
        self.shared.changed.notify_waiters();
        count
    }

    /// Current tick count.
    #[must_use]
    pub fn get(&self) -> u32 {
        self.shared.count.load(Ordering::Acquire)
    }

    /// Set the count to zero.
    pub fn reset(&self) {
        self.set(0);
    }

    /// Overwrite the count.
    ///
    /// Lets callers model a counter left non-zero by an earlier wait.
    pub fn set(&self, value: u32) {
        self.shared.count.store(value, Ordering::Release);
        self.shared.changed.notify_waiters();
    }

    /// Block until the count reaches `target`.
    ///
    /// Completes immediately if the count is already at or past the target.
    /// There is no timeout: with no producer running this never returns.
    pub async fn wait_until(&self, target: u32) {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.get() >= target {
                return;
            }

            notified.await;
        }
    }
}

/// Periodic tick source for one node.
///
/// Equivalent to a hardware timer that is initialised before a bounded wait
/// and de-initialised after it.
#[derive(Clone)]
pub struct Ticker {
    counter: TickCounter,
    period: Duration,
}

impl Ticker {
    /// Create a ticker with the given period and a fresh counter.
    ///
    /// A zero period is clamped to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self::with_counter(period, TickCounter::new())
    }

    /// Create a ticker that drives an existing counter.
    pub fn with_counter(period: Duration, counter: TickCounter) -> Self {
        Self {
            counter,
            period: period.max(Duration::from_millis(1)),
        }
    }

    /// The counter this ticker increments.
    pub fn counter(&self) -> &TickCounter {
        &self.counter
    }

    /// The tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Reset the counter and start producing ticks.
    ///
    /// The first tick fires one full period after the call. Ticks stop and
    /// the counter is reset when the returned guard is dropped.
    pub fn start(&self) -> TickerGuard {
        self.counter.reset();

        let counter = self.counter.clone();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                counter.increment();
            }
        });

        TickerGuard {
            task,
            counter: self.counter.clone(),
        }
    }

    /// Run the ticker until `ticks` ticks have elapsed.
    ///
    /// The counter is reset before and after, whatever its starting value.
    pub async fn run_for(&self, ticks: u32) {
        let _guard = self.start();
        self.counter.wait_until(ticks).await;
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("period", &self.period)
            .field("count", &self.counter.get())
            .finish()
    }
}

/// Running tick producer. Dropping it stops the ticks and resets the counter.
#[derive(Debug)]
pub struct TickerGuard {
    task: JoinHandle<()>,
    counter: TickCounter,
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.task.abort();
        self.counter.reset();
    }
}
