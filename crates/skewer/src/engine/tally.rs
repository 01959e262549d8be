//! Shared completion counters and the concurrency gate built on them.

use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Mutable part of the tally. Only ever touched under [`ResultTally::counts`].
#[derive(Debug, Default)]
struct Counts {
    errors: usize,
    done: usize,
    active: usize,
}

/// A point-in-time copy of the tally, taken under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallySnapshot {
    pub total: usize,
    pub limit: usize,
    pub done: usize,
    pub errors: usize,
    pub active: usize,
}

/// Thread-safe counters tracking finished, failed and in-flight requests.
///
/// One mutex covers all three counters. Every mutation wakes all parked waiters,
/// which then re-check their own predicate, so a wakeup meant for the throttle
/// never gets lost on the error-rate waiter or the other way around.
///
/// Mutations are synchronous and never block across an await point; waiting is
/// asynchronous. This lets completion code run from a `Drop` impl while the
/// dispatching task stays suspended without tying up a runtime thread.
pub struct ResultTally {
    /// Number of requests the run will issue.
    total: usize,

    /// Maximum number of simultaneously active requests.
    limit: usize,

    counts: Mutex<Counts>,

    /// Signalled after every mutation.
    changed: Notify,
}

impl ResultTally {
    /// Creates an empty tally.
    ///
    /// # Parameters
    ///
    /// * `total` - Number of requests that will complete before the run is finished
    /// * `concurrency_limit` - Maximum number of requests allowed in flight at once
    pub fn new(total: usize, concurrency_limit: usize) -> Self {
        Self {
            total,
            limit: concurrency_limit,
            counts: Mutex::new(Counts::default()),
            changed: Notify::new(),
        }
    }

    /// Each mutation is a single counter update, so a poisoned lock still guards
    /// consistent data.
    fn counts(&self) -> MutexGuard<'_, Counts> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, update: impl FnOnce(&mut Counts)) {
        {
            let mut counts = self.counts();
            update(&mut counts);
            debug_assert!(counts.active <= self.limit);
            debug_assert!(counts.done <= self.total);
        }
        self.changed.notify_waiters();
    }

    /// Parks the caller until `ready` yields a value.
    ///
    /// Interest in the next notification is registered before the predicate is
    /// checked, so a mutation landing between the check and the await still wakes us.
    async fn wait_until<T>(&self, mut ready: impl FnMut(&mut Counts) -> Option<T>) -> T {
        loop {
            let mut notified = pin!(self.changed.notified());
            notified.as_mut().enable();

            let outcome = {
                let mut counts = self.counts();
                ready(&mut counts)
            };
            if let Some(value) = outcome {
                return value;
            }

            notified.await;
        }
    }

    /// Counts one failed request.
    pub fn inc_error(&self) {
        self.mutate(|counts| counts.errors += 1);
    }

    /// Counts one finished request, successful or not.
    pub fn inc_done(&self) {
        self.mutate(|counts| counts.done += 1);
    }

    /// Counts one finished request and, when `failed`, its error in the same
    /// critical section. Observers never see more errors than completions.
    pub fn record(&self, failed: bool) {
        self.mutate(|counts| {
            if failed {
                counts.errors += 1;
            }
            counts.done += 1;
        });
    }

    /// Releases one concurrency slot.
    pub fn dec_active(&self) {
        self.mutate(|counts| counts.active = counts.active.saturating_sub(1));
    }

    /// Waits for a free concurrency slot and claims it.
    ///
    /// This is the backpressure point of a run: the caller stays suspended while
    /// `concurrency_limit` requests are outstanding.
    pub async fn throttle(&self) {
        let limit = self.limit;
        self.wait_until(|counts| {
            (counts.active < limit).then(|| counts.active += 1)
        })
        .await;
        // the slot was claimed under the lock; let other observers see it
        self.changed.notify_waiters();
    }

    /// Waits until every request has completed and returns `errors / total`.
    ///
    /// A run with zero requests reports an error rate of `0.0`.
    pub async fn error_rate(&self) -> f64 {
        let total = self.total;
        let errors = self
            .wait_until(|counts| (counts.done >= total).then_some(counts.errors))
            .await;
        if total == 0 {
            0.0
        } else {
            errors as f64 / total as f64
        }
    }

    /// Copies the current counters without waiting.
    pub fn snapshot(&self) -> TallySnapshot {
        let counts = self.counts();
        TallySnapshot {
            total: self.total,
            limit: self.limit,
            done: counts.done,
            errors: counts.errors,
            active: counts.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time;

    #[tokio::test]
    async fn test_throttle_claims_slots_until_limit() {
        let tally = ResultTally::new(4, 2);
        tally.throttle().await;
        tally.throttle().await;

        assert_eq!(tally.snapshot().active, 2);

        // third claim has to wait for a release
        let blocked = time::timeout(Duration::from_millis(20), tally.throttle()).await;
        assert!(blocked.is_err());
        assert_eq!(tally.snapshot().active, 2);
    }

    #[tokio::test]
    async fn test_throttle_wakes_on_release() {
        let tally = Arc::new(ResultTally::new(3, 1));
        tally.throttle().await;

        let waiter = {
            let tally = tally.clone();
            tokio::spawn(async move {
                tally.throttle().await;
            })
        };

        time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        tally.record(false);
        tally.dec_active();

        time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("throttle should wake after dec_active")
            .unwrap();
        let snapshot = tally.snapshot();
        assert_eq!(snapshot.active, 1);
        assert_eq!(snapshot.done, 1);
    }

    #[tokio::test]
    async fn test_error_rate_waits_for_all_completions() {
        let tally = Arc::new(ResultTally::new(3, 3));
        for _ in 0..3 {
            tally.throttle().await;
        }

        tally.record(true);
        tally.dec_active();
        tally.record(false);
        tally.dec_active();

        let pending = time::timeout(Duration::from_millis(20), tally.error_rate()).await;
        assert!(pending.is_err(), "error rate must not resolve before the last completion");

        tally.inc_error();
        tally.inc_done();
        tally.dec_active();

        let rate = time::timeout(Duration::from_secs(1), tally.error_rate())
            .await
            .expect("all requests are done");
        assert!((rate - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(tally.snapshot().active, 0);
    }

    #[tokio::test]
    async fn test_zero_total_is_immediately_done() {
        let tally = ResultTally::new(0, 1);
        assert_eq!(tally.error_rate().await, 0.0);
    }

    #[tokio::test]
    async fn test_record_keeps_errors_within_done() {
        let tally = ResultTally::new(2, 1);
        tally.throttle().await;
        tally.record(true);

        let snapshot = tally.snapshot();
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.done, 1);
        assert!(snapshot.errors <= snapshot.done);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_completions_reach_total() {
        let total = 200;
        let tally = Arc::new(ResultTally::new(total, 8));

        let mut handles = Vec::with_capacity(total);
        for i in 0..total {
            tally.throttle().await;
            let tally = tally.clone();
            handles.push(tokio::spawn(async move {
                tokio::task::yield_now().await;
                tally.record(i % 4 == 0);
                tally.dec_active();
            }));
        }

        let rate = time::timeout(Duration::from_secs(5), tally.error_rate())
            .await
            .expect("every completion lands");
        futures::future::join_all(handles).await;

        let snapshot = tally.snapshot();
        assert_eq!(snapshot.done, total);
        assert_eq!(snapshot.errors, total / 4);
        assert_eq!(snapshot.active, 0);
        assert!((rate - 0.25).abs() < f64::EPSILON);
    }
}
