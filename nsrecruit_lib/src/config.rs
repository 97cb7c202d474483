//! Operator configuration, persisted as YAML.
//!
//! Files written by the older menu-driven recruiter (`clientkey`,
//! `individual_nations`, `blocked_nations`) load unchanged.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatcher::{RateLimitPolicy, NON_RECRUITMENT_DELAY, RECRUITMENT_DELAY};
use crate::error::RecruitError;
use crate::feed::FeedRetry;
use crate::nation::NationId;
use crate::pacer::MIN_REQUEST_INTERVAL;
use crate::selector::{SelectionWeights, SelectorSettings};
use crate::validation::validate_nation_name;

/// Environment variable that overrides `client_key`.
pub const CLIENT_KEY_ENV: &str = "NSRECRUIT_CLIENT_KEY";

const PLACEHOLDER_KEY: &str = "YOUR_CLIENT_KEY_HERE";
const PLACEHOLDER_NAME: &str = "YOUR_CLIENT_NAME_HERE";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecruitConfig {
    #[serde(alias = "clientkey")]
    pub client_key: String,
    #[serde(alias = "clientname")]
    pub client_name: String,
    #[serde(default)]
    pub recruiting: RecruitingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecruitingConfig {
    #[serde(default, alias = "individual_nations")]
    pub allow_list: Vec<String>,
    #[serde(default, alias = "blocked_nations")]
    pub block_list: Vec<String>,
    #[serde(default)]
    pub optimization: bool,
    #[serde(default = "default_true")]
    pub filter_batches: bool,
    #[serde(default)]
    pub ratio: SelectionWeights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for RecruitingConfig {
    fn default() -> Self {
        Self {
            allow_list: Vec::new(),
            block_list: Vec::new(),
            optimization: false,
            filter_batches: true,
            ratio: SelectionWeights::default(),
            seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    pub feed_retry_max: u32,
    pub feed_cooldown_secs: u64,
    pub empty_round_max: u32,
    pub empty_round_backoff_secs: u64,
    pub empty_round_backoff_max_secs: u64,
    pub recruitment_delay_secs: u64,
    pub non_recruitment_delay_secs: u64,
    /// Minimum gap between two API requests.
    pub request_interval_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let retry = FeedRetry::default();
        let selector = SelectorSettings::default();
        Self {
            feed_retry_max: retry.max_retries,
            feed_cooldown_secs: retry.cooldown.as_secs(),
            empty_round_max: selector.empty_round_max,
            empty_round_backoff_secs: selector.empty_round_backoff.as_secs(),
            empty_round_backoff_max_secs: selector.empty_round_backoff_max.as_secs(),
            recruitment_delay_secs: RECRUITMENT_DELAY.as_secs(),
            non_recruitment_delay_secs: NON_RECRUITMENT_DELAY.as_secs(),
            request_interval_ms: MIN_REQUEST_INTERVAL.as_millis() as u64,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Default for RecruitConfig {
    fn default() -> Self {
        Self {
            client_key: PLACEHOLDER_KEY.to_string(),
            client_name: PLACEHOLDER_NAME.to_string(),
            recruiting: RecruitingConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Which list a nation was moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Allowed,
    Blocked,
    Unlisted,
}

impl RecruitConfig {
    /// Reads and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, RecruitError> {
        let content = fs::read_to_string(path).map_err(|e| {
            RecruitError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: RecruitConfig = serde_yml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Config loaded from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), RecruitError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yml::to_string(self)?)?;
        Ok(())
    }

    /// Writes a default config to `path`. Refuses to replace an existing file.
    pub fn init(path: &Path) -> Result<Self, RecruitError> {
        if path.exists() {
            return Err(RecruitError::Config(format!(
                "{} already exists",
                path.display()
            )));
        }
        let config = Self::default();
        config.save(path)?;
        tracing::info!("Default config written to {}", path.display());
        Ok(config)
    }

    /// Checks everything that can be checked without credentials.
    pub fn validate(&self) -> Result<(), RecruitError> {
        self.recruiting.ratio.validate()?;

        for name in self
            .recruiting
            .allow_list
            .iter()
            .chain(&self.recruiting.block_list)
        {
            validate_nation_name(name)?;
        }

        let limits = &self.limits;
        if limits.recruitment_delay_secs < RECRUITMENT_DELAY.as_secs() {
            return Err(RecruitError::Config(format!(
                "limits.recruitment_delay_secs must be at least {}",
                RECRUITMENT_DELAY.as_secs()
            )));
        }
        if limits.non_recruitment_delay_secs < NON_RECRUITMENT_DELAY.as_secs() {
            return Err(RecruitError::Config(format!(
                "limits.non_recruitment_delay_secs must be at least {}",
                NON_RECRUITMENT_DELAY.as_secs()
            )));
        }
        if Duration::from_millis(limits.request_interval_ms) < MIN_REQUEST_INTERVAL {
            return Err(RecruitError::Config(format!(
                "limits.request_interval_ms must be at least {}",
                MIN_REQUEST_INTERVAL.as_millis()
            )));
        }
        if limits.empty_round_max == 0 {
            return Err(RecruitError::Config(
                "limits.empty_round_max must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Fails unless a real client key and operator name are present.
    pub fn require_credentials(&self) -> Result<(), RecruitError> {
        let key = self.client_key.trim();
        if key.is_empty() || key == PLACEHOLDER_KEY {
            return Err(RecruitError::Config(format!(
                "client_key is not set; edit the config file or set {}",
                CLIENT_KEY_ENV
            )));
        }
        let name = self.client_name.trim();
        if name.is_empty() || name == PLACEHOLDER_NAME {
            return Err(RecruitError::Config("client_name is not set".into()));
        }
        Ok(())
    }

    /// Replaces the client key with `key` when one is given and non-blank.
    pub fn apply_client_key(&mut self, key: Option<String>) {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            tracing::debug!("Client key taken from {}", CLIENT_KEY_ENV);
            self.client_key = key;
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_client_key(std::env::var(CLIENT_KEY_ENV).ok());
    }

    fn position(list: &[String], nation: &NationId) -> Option<usize> {
        list.iter().position(|n| NationId::new(n) == *nation)
    }

    /// Adds `name` to the allow list, taking it off the block list.
    pub fn allow(&mut self, name: &str) -> Result<NationId, RecruitError> {
        let nation = validate_nation_name(name)?;
        if let Some(i) = Self::position(&self.recruiting.block_list, &nation) {
            self.recruiting.block_list.remove(i);
        }
        if Self::position(&self.recruiting.allow_list, &nation).is_none() {
            self.recruiting.allow_list.push(nation.as_str().to_string());
        }
        Ok(nation)
    }

    /// Adds `name` to the block list, taking it off the allow list.
    pub fn block(&mut self, name: &str) -> Result<NationId, RecruitError> {
        let nation = validate_nation_name(name)?;
        if let Some(i) = Self::position(&self.recruiting.allow_list, &nation) {
            self.recruiting.allow_list.remove(i);
        }
        if Self::position(&self.recruiting.block_list, &nation).is_none() {
            self.recruiting.block_list.push(nation.as_str().to_string());
        }
        Ok(nation)
    }

    /// Removes `name` from both lists. Returns false if it was on neither.
    pub fn unlist(&mut self, name: &str) -> Result<bool, RecruitError> {
        let nation = validate_nation_name(name)?;
        let before = self.recruiting.allow_list.len() + self.recruiting.block_list.len();
        self.recruiting
            .allow_list
            .retain(|n| NationId::new(n) != nation);
        self.recruiting
            .block_list
            .retain(|n| NationId::new(n) != nation);
        Ok(before != self.recruiting.allow_list.len() + self.recruiting.block_list.len())
    }

    pub fn selector_settings(&self) -> SelectorSettings {
        SelectorSettings {
            allow_list: self
                .recruiting
                .allow_list
                .iter()
                .map(|n| NationId::new(n))
                .collect(),
            block_list: self
                .recruiting
                .block_list
                .iter()
                .map(|n| NationId::new(n))
                .collect(),
            weights: self.recruiting.ratio,
            filter_batches: self.recruiting.filter_batches,
            empty_round_max: self.limits.empty_round_max,
            empty_round_backoff: Duration::from_secs(self.limits.empty_round_backoff_secs),
            empty_round_backoff_max: Duration::from_secs(self.limits.empty_round_backoff_max_secs),
        }
    }

    pub fn rate_limit_policy(&self) -> Result<RateLimitPolicy, RecruitError> {
        RateLimitPolicy::new(
            Duration::from_secs(self.limits.recruitment_delay_secs),
            Duration::from_secs(self.limits.non_recruitment_delay_secs),
        )
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.limits.request_interval_ms)
    }

    pub fn feed_retry(&self) -> FeedRetry {
        FeedRetry {
            max_retries: self.limits.feed_retry_max,
            cooldown: Duration::from_secs(self.limits.feed_cooldown_secs),
        }
    }
}
