//! Library layer for nsrecruit: feed scanning, candidate selection, paced
//! telegram dispatch and the recruitment loop.
//!
//! Wraps the `nsrecruit_api` crate with single-flight request pacing, a
//! per-run dispatch history and the operator configuration.

pub mod api;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod feed;
pub mod history;
pub mod nation;
pub mod pacer;
pub mod recruit;
pub mod selector;
pub mod session;
pub mod telegram;
pub mod validation;

#[cfg(test)]
mod testing;

pub use nsrecruit_api;
pub use nsrecruit_api::types;
pub use nsrecruit_api::{build_user_agent, Client};

pub use api::NationApi;
pub use classifier::{Classifier, NameFilter};
pub use config::RecruitConfig;
pub use dispatcher::{Dispatcher, RateLimitPolicy, SendOutcome};
pub use error::RecruitError;
pub use feed::{EventFeed, FeedRetry};
pub use history::DispatchHistory;
pub use nation::NationId;
pub use pacer::{Paced, PacerStats, MIN_REQUEST_INTERVAL};
pub use recruit::{LoopState, Mode, RecruitmentLoop};
pub use selector::{seeded_rng, Category, SelectionWeights, SelectorSettings, TargetSelector};
pub use session::{RecruitSession, RunCounters};
pub use telegram::{TelegramKind, TelegramStore, TelegramTemplate};
