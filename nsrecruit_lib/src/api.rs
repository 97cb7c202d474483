//! The seam between the recruitment core and the network.

use std::future::Future;

use nsrecruit_api::types::{Happening, HappeningsFilter};
use nsrecruit_api::{Client, Error as ApiError, HappeningsQuery, TelegramQuery};

/// The three upstream calls the core makes.
///
/// Implemented by [`nsrecruit_api::Client`] for production and by
/// [`crate::pacer::Paced`], which spaces out requests for any implementation.
pub trait NationApi: Send + Sync {
    /// Most recent happenings for `filter`, most recent first.
    fn happenings(
        &self,
        filter: HappeningsFilter,
    ) -> impl Future<Output = Result<Vec<Happening>, ApiError>> + Send;

    /// Whether `nation` may currently receive a recruitment telegram.
    fn can_recruit(&self, nation: &str) -> impl Future<Output = Result<bool, ApiError>> + Send;

    /// Sends one telegram.
    fn send_telegram(
        &self,
        query: &TelegramQuery,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl NationApi for Client {
    async fn happenings(&self, filter: HappeningsFilter) -> Result<Vec<Happening>, ApiError> {
        self.get_happenings(&HappeningsQuery::new(filter)).await
    }

    async fn can_recruit(&self, nation: &str) -> Result<bool, ApiError> {
        Client::can_recruit(self, nation).await
    }

    async fn send_telegram(&self, query: &TelegramQuery) -> Result<(), ApiError> {
        Client::send_telegram(self, query).await
    }
}
