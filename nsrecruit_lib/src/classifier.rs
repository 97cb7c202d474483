//! Candidate filters: name heuristics and the eligibility lookup.
//!
//! Both are an opt-in overlay. With optimization off, every candidate is
//! accepted and no lookup is made.

use std::sync::Arc;

use regex::Regex;

use crate::api::NationApi;
use crate::error::RecruitError;
use crate::nation::NationId;

/// Why a name was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameExclusion {
    /// Words that tend to belong to deleted or moderated nations.
    BadName,
    /// Looks like a puppet or farm nation.
    Puppet,
}

/// Case-insensitive name heuristics.
pub struct NameFilter {
    bad_words: Regex,
    puppet_words: Regex,
    digits: Regex,
    roman_numeral: Regex,
}

impl NameFilter {
    pub fn new() -> Result<Self, RecruitError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| RecruitError::Config(format!("regex compile error: {}", e)))
        };
        Ok(Self {
            bad_words: compile(r"(?i)(moderator|reichs|nuts|pedo)")?,
            puppet_words: compile(r"(?i)(puppet|bot|farm|card|founder)")?,
            digits: compile(r"[0-9]+")?,
            // Final word only; feed ids separate words with underscores.
            roman_numeral: compile(
                r"(?i)(?:^|[\s_])(M{0,4}(?:CM|CD|D?C{0,3})(?:XC|XL|L?X{0,3})(?:IX|IV|V?I{0,3}))$",
            )?,
        })
    }

    pub fn is_bad_name(&self, name: &str) -> bool {
        self.bad_words.is_match(name)
    }

    pub fn is_probable_puppet(&self, name: &str) -> bool {
        if self.puppet_words.is_match(name) || self.digits.is_match(name) {
            return true;
        }
        // Every part of the numeral is optional, so a trailing separator
        // yields an empty match.
        self.roman_numeral
            .captures(name)
            .and_then(|c| c.get(1))
            .is_some_and(|m| !m.as_str().is_empty())
    }

    pub fn exclusion(&self, name: &str) -> Option<NameExclusion> {
        if self.is_bad_name(name) {
            Some(NameExclusion::BadName)
        } else if self.is_probable_puppet(name) {
            Some(NameExclusion::Puppet)
        } else {
            None
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclusion(name).is_some()
    }
}

/// Composes the name heuristics with the eligibility lookup.
pub struct Classifier<A> {
    api: Arc<A>,
    names: NameFilter,
    enabled: bool,
}

impl<A: NationApi> Classifier<A> {
    pub fn new(api: Arc<A>, enabled: bool) -> Result<Self, RecruitError> {
        Ok(Self {
            api,
            names: NameFilter::new()?,
            enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_excluded_by_name(&self, nation: &NationId) -> bool {
        self.names.is_excluded(nation.as_str())
    }

    /// One eligibility lookup. Any failure counts as ineligible.
    pub async fn is_eligible(&self, nation: &NationId) -> bool {
        match self.api.can_recruit(nation.as_str()).await {
            Ok(eligible) => eligible,
            Err(e) => {
                tracing::debug!("Eligibility check for {} failed: {}", nation, e);
                false
            }
        }
    }

    /// Whether `nation` should be contacted. Always true when disabled.
    pub async fn accepts(&self, nation: &NationId) -> bool {
        if !self.enabled {
            return true;
        }
        match self.names.exclusion(nation.as_str()) {
            Some(NameExclusion::BadName) => {
                tracing::debug!("{} is a bad name, skipping", nation);
                return false;
            }
            Some(NameExclusion::Puppet) => {
                tracing::debug!("{} is probably a puppet, skipping", nation);
                return false;
            }
            None => {}
        }
        if !self.is_eligible(nation).await {
            tracing::debug!("{} cannot be recruited, skipping", nation);
            return false;
        }
        true
    }
}
