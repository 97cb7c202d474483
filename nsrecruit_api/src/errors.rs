//! Error types for the API client.

use std::time::Duration;

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be built (bad base URL, client construction).
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The request never produced a response (connect error, timeout, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The API answered 429. `retry_after` is the provider's requested wait, if it sent one.
    #[error("Rate limited by the API (HTTP 429)")]
    RateLimited { retry_after: Option<Duration> },
    /// The response body was not the XML document we expected.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl Error {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}
