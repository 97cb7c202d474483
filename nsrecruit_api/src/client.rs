//! HTTP client for the game's public XML API.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use url::Url;

use crate::{
    query::{EligibilityQuery, HappeningsQuery, Query, TelegramQuery},
    types::{Happening, HappeningPattern},
    xml::{decode_can_recruit, decode_happenings},
    Error,
};

/// Production endpoint; every resource is selected by query parameters.
pub const DEFAULT_BASE_URL: &str = "https://www.nationstates.net/cgi-bin/api.cgi";

/// Request timeout for every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the game's API.
///
/// Holds one `reqwest::Client` carrying the operator's identifying
/// `User-Agent` and a short timeout. The client does no pacing of its own;
/// callers decide when a request may go out.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    pattern: HappeningPattern,
}

impl Client {
    /// Creates a client pointing at the production API.
    pub fn new(user_agent: &str) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, user_agent)
    }

    /// Creates a client with a custom endpoint. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, user_agent: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", base_url, e);
            Error::RequestFailed(format!("invalid base URL: {}", e))
        })?;
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            pattern: HappeningPattern::new()?,
        })
    }

    async fn get(&self, query: &impl Query) -> Result<reqwest::Response, Error> {
        let url = query.add_to_url(&self.base_url);
        let resp = self.http.get(url).send().await.map_err(|e| {
            tracing::debug!("Request did not complete: {}", e);
            Error::Network(e)
        })?;
        Ok(resp)
    }

    async fn get_text(&self, query: &impl Query) -> Result<String, Error> {
        let resp = self.get(query).await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::debug!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }
        Ok(body)
    }

    /// Fetches recent happenings for the query's filter, most recent first.
    pub async fn get_happenings(&self, query: &HappeningsQuery) -> Result<Vec<Happening>, Error> {
        let body = self.get_text(query).await?;
        decode_happenings(&body, &self.pattern)
    }

    /// Asks whether `nation` may currently receive a recruitment telegram.
    pub async fn can_recruit(&self, nation: &str) -> Result<bool, Error> {
        let body = self.get_text(&EligibilityQuery::new(nation)).await?;
        decode_can_recruit(&body)
    }

    /// Sends one telegram. Any 2xx is success; 429 surfaces the provider's
    /// `Retry-After` so the caller can wait it out.
    pub async fn send_telegram(&self, query: &TelegramQuery) -> Result<(), Error> {
        let resp = self.get(query).await?;
        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Err(Error::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        Ok(())
    }
}

/// Parses a delta-seconds `Retry-After` value.
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
