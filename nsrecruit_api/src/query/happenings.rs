//! Query builders for the happenings feed and the recruitment-eligibility shard.

use crate::query::Query;
use crate::types::HappeningsFilter;

/// Number of feed entries requested per fetch.
pub const DEFAULT_HAPPENINGS_LIMIT: u32 = 50;

/// Query for the most recent world happenings of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HappeningsQuery {
    pub filter: HappeningsFilter,
    pub limit: u32,
}

impl HappeningsQuery {
    pub fn new(filter: HappeningsFilter) -> Self {
        Self {
            filter,
            limit: DEFAULT_HAPPENINGS_LIMIT,
        }
    }

    /// Overrides the number of entries requested.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl Query for HappeningsQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", "happenings".to_string()),
            ("filter", self.filter.as_str().to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

/// Query asking whether a nation may currently receive recruitment telegrams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityQuery {
    pub nation: String,
}

impl EligibilityQuery {
    pub fn new(nation: &str) -> Self {
        Self {
            nation: nation.to_string(),
        }
    }
}

impl Query for EligibilityQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nation", self.nation.clone()),
            ("q", "tgcanrecruit".to_string()),
        ]
    }
}
