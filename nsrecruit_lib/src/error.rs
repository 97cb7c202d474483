//! Error types for the library layer.

use nsrecruit_api::types::HappeningsFilter;
use thiserror::Error;

/// Errors produced by the library layer, wrapping upstream API errors and
/// adding selection, configuration and template-store failures.
#[derive(Error, Debug)]
pub enum RecruitError {
    #[error("API error: {0}")]
    Api(#[from] nsrecruit_api::Error),
    /// The feed kept answering with the transient gateway-timeout status.
    #[error("Feed '{filter}' still unavailable after {attempts} attempts")]
    FeedUnavailable {
        filter: HappeningsFilter,
        attempts: u32,
    },
    /// Every selection round came back empty.
    #[error("No eligible candidates found in {rounds} rounds")]
    NoCandidates { rounds: u32 },
    /// The allow list is drained and no category has a positive weight.
    #[error("Allow list exhausted and every category weight is zero")]
    NothingToRecruit,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Telegram template error: {0}")]
    Template(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}
