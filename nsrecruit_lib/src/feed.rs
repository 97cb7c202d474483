//! Event feed access with the transient-timeout retry policy.

use std::sync::Arc;
use std::time::Duration;

use nsrecruit_api::types::{Happening, HappeningsFilter};
use tokio::time::sleep;

use crate::api::NationApi;
use crate::error::RecruitError;

/// Status the upstream CDN answers with when the origin times out.
pub const TRANSIENT_STATUS: u16 = 524;

/// How the feed reacts to [`TRANSIENT_STATUS`].
#[derive(Debug, Clone, Copy)]
pub struct FeedRetry {
    /// Retries after the first attempt. The total number of requests is `max_retries + 1`.
    pub max_retries: u32,
    /// Fixed wait before each retry.
    pub cooldown: Duration,
}

impl Default for FeedRetry {
    fn default() -> Self {
        Self {
            max_retries: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Fetches happenings, retrying the same request after a cooldown when the
/// upstream times out, up to a ceiling.
pub struct EventFeed<A> {
    api: Arc<A>,
    retry: FeedRetry,
}

impl<A: NationApi> EventFeed<A> {
    pub fn new(api: Arc<A>, retry: FeedRetry) -> Self {
        Self { api, retry }
    }

    /// Recent happenings for `filter`, most recent first.
    ///
    /// Malformed entries have already been dropped by the decoder. Any status
    /// other than [`TRANSIENT_STATUS`] is returned to the caller untouched.
    pub async fn fetch(&self, filter: HappeningsFilter) -> Result<Vec<Happening>, RecruitError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.api.happenings(filter).await {
                Ok(happenings) => {
                    tracing::debug!(
                        "Fetched {} '{}' happenings",
                        happenings.len(),
                        filter
                    );
                    return Ok(happenings);
                }
                Err(e) if e.status() == Some(TRANSIENT_STATUS) => {
                    if attempts > self.retry.max_retries {
                        tracing::warn!(
                            "Feed '{}' timed out {} times in a row, giving up for now",
                            filter,
                            attempts
                        );
                        return Err(RecruitError::FeedUnavailable { filter, attempts });
                    }
                    tracing::warn!(
                        "Feed '{}' timed out upstream (attempt {}/{}), retrying in {}s",
                        filter,
                        attempts,
                        self.retry.max_retries + 1,
                        self.retry.cooldown.as_secs()
                    );
                    sleep(self.retry.cooldown).await;
                }
                Err(e) => {
                    tracing::warn!("Feed '{}' request failed: {}", filter, e);
                    return Err(e.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use nsrecruit_api::types::Action;
    use tokio::time::Instant;

    fn retry(max_retries: u32) -> FeedRetry {
        FeedRetry {
            max_retries,
            cooldown: Duration::from_secs(30),
        }
    }

    #[tokio::test]
    async fn returns_entries() {
        let api = Arc::new(FakeApi::new().feed(
            HappeningsFilter::Founding,
            &[("foo", Action::Founded), ("bar", Action::Refounded)],
        ));
        let feed = EventFeed::new(Arc::clone(&api), retry(3));
        let got = feed.fetch(HappeningsFilter::Founding).await.unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(api.feed_call_count(), 1);
    }

    #[tokio::test]
    async fn transient_status_cools_down_and_retries() {
        tokio::time::pause();
        let api = Arc::new(
            FakeApi::new()
                .feed(HappeningsFilter::Eject, &[("foo", Action::Ejected)])
                .feed_error(HappeningsFilter::Eject, 524)
                .feed_error(HappeningsFilter::Eject, 524),
        );
        let feed = EventFeed::new(Arc::clone(&api), retry(3));
        let start = Instant::now();
        let got = feed.fetch(HappeningsFilter::Eject).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(api.feed_call_count(), 3);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn transient_status_gives_up_after_ceiling() {
        tokio::time::pause();
        let mut fake = FakeApi::new();
        for _ in 0..5 {
            fake = fake.feed_error(HappeningsFilter::Founding, 524);
        }
        let api = Arc::new(fake);
        let feed = EventFeed::new(Arc::clone(&api), retry(2));
        let err = feed.fetch(HappeningsFilter::Founding).await.unwrap_err();
        assert!(matches!(
            err,
            RecruitError::FeedUnavailable { attempts: 3, .. }
        ));
        assert_eq!(api.feed_call_count(), 3);
    }

    #[tokio::test]
    async fn other_statuses_are_reported_immediately() {
        let api = Arc::new(FakeApi::new().feed_error(HappeningsFilter::Founding, 500));
        let feed = EventFeed::new(Arc::clone(&api), retry(3));
        let err = feed.fetch(HappeningsFilter::Founding).await.unwrap_err();
        assert!(matches!(err, RecruitError::Api(_)));
        assert_eq!(api.feed_call_count(), 1);
    }
}
