//! Process-wide bound on in-flight HTTP operations.
//!
//! One permit covers exactly one unit of work (a single fetch or a single write
//! attempt). Permits are released on drop and are never held across a nested
//! acquisition, so even a pool of size 1 makes progress.

use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

pub const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug)]
pub struct Governor {
    permits: Semaphore,
    limit: usize,
}

impl Governor {
    /// A governor admitting `limit` concurrent operations. Zero is raised to one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Semaphore::new(limit),
            limit,
        }
    }

    /// Waits for a permit. Waiters are served in FIFO order.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.permits.acquire().await
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Stops admitting work. Permits already held stay valid; every later
    /// `acquire` fails.
    pub fn close(&self) {
        self.permits.close();
    }
}

impl Default for Governor {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn bounds_in_flight_operations() {
        let governor = Governor::new(3);
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let work = (0..12).map(|_| async {
            let _permit = governor.acquire().await.unwrap();
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
        join_all(work).await;

        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(governor.available(), 3);
    }

    #[tokio::test]
    async fn single_permit_pool_makes_progress_for_sequential_units() {
        let governor = Governor::new(1);
        for _ in 0..3 {
            let permit = governor.acquire().await.unwrap();
            assert_eq!(governor.available(), 0);
            drop(permit);
        }
        assert_eq!(governor.available(), 1);
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        assert_eq!(Governor::new(0).limit(), 1);
        assert_eq!(Governor::default().limit(), DEFAULT_CONCURRENCY);
    }
}
