//! Single-flight pacing of API requests.
//!
//! Recruitment makes one decision at a time, so at most one request is ever
//! outstanding. [`Paced`] turns that into a guarantee for every caller and
//! keeps a minimum gap between consecutive requests, which keeps a run
//! under the API's 50 requests per 30 seconds.

use std::future::Future;
use std::time::Duration;

use nsrecruit_api::types::{Happening, HappeningsFilter};
use nsrecruit_api::{Error as ApiError, TelegramQuery};
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::api::NationApi;

/// 30 seconds over 50 requests.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(600);

/// Request outcomes seen by the pacer, for the end-of-run report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PacerStats {
    pub requests: u64,
    /// Answered 429.
    pub throttled: u64,
    /// Any other error.
    pub failed: u64,
    /// Total time requests were held back to keep the gap.
    pub held: Duration,
}

#[derive(Default)]
struct Slot {
    last_finished: Option<Instant>,
    stats: PacerStats,
}

/// A [`NationApi`] that runs one request at a time, spaced by `interval`.
pub struct Paced<A> {
    inner: A,
    interval: Duration,
    slot: Mutex<Slot>,
}

impl<A: NationApi> Paced<A> {
    /// `interval` is raised to [`MIN_REQUEST_INTERVAL`] if shorter.
    pub fn new(inner: A, interval: Duration) -> Self {
        Self {
            inner,
            interval: interval.max(MIN_REQUEST_INTERVAL),
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn stats(&self) -> PacerStats {
        self.slot.lock().await.stats
    }

    // The slot stays locked for the whole request, so a second caller waits
    // for it to finish and then for the gap.
    async fn run<T>(
        &self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        let mut slot = self.slot.lock().await;
        if let Some(ready) = slot.last_finished.map(|t| t + self.interval) {
            let now = Instant::now();
            if ready > now {
                slot.stats.held += ready - now;
                sleep_until(ready).await;
            }
        }

        let result = request.await;

        slot.last_finished = Some(Instant::now());
        slot.stats.requests += 1;
        match &result {
            Ok(_) => {}
            Err(ApiError::RateLimited { .. }) => slot.stats.throttled += 1,
            Err(_) => slot.stats.failed += 1,
        }
        result
    }
}

impl<A: NationApi> NationApi for Paced<A> {
    async fn happenings(&self, filter: HappeningsFilter) -> Result<Vec<Happening>, ApiError> {
        self.run(self.inner.happenings(filter)).await
    }

    async fn can_recruit(&self, nation: &str) -> Result<bool, ApiError> {
        self.run(self.inner.can_recruit(nation)).await
    }

    async fn send_telegram(&self, query: &TelegramQuery) -> Result<(), ApiError> {
        self.run(self.inner.send_telegram(query)).await
    }
}
