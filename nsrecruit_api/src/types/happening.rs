//! Happenings: one line of the world event feed, reduced to who did what.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Server-side category filter for the happenings feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HappeningsFilter {
    /// Foundings and refoundings share this filter.
    Founding,
    Eject,
}

impl HappeningsFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Founding => "founding",
            Self::Eject => "eject",
        }
    }
}

impl fmt::Display for HappeningsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verb of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Founded,
    Refounded,
    Ejected,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Founded => "founded",
            Self::Refounded => "refounded",
            Self::Ejected => "ejected",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "founded" => Ok(Self::Founded),
            "refounded" => Ok(Self::Refounded),
            "ejected" => Ok(Self::Ejected),
            other => Err(Error::Parse(format!("unknown happening verb '{}'", other))),
        }
    }
}

/// A feed entry that matched the `@@nation@@ was <verb> ... %%region%%` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Happening {
    /// Nation name exactly as it appeared between the `@@` markers.
    pub nation: String,
    pub action: Action,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Compiled extractor for happening text.
///
/// Ejections read `@@x@@ was ejected from %%r%% by @@y@@.` (optionally
/// "ejected and banned"); the subject is always the first `@@` pair.
pub struct HappeningPattern {
    re: Regex,
}

impl HappeningPattern {
    pub fn new() -> Result<Self, Error> {
        let re = Regex::new(
            r"@@(?P<nation>[^@]+)@@ was (?P<action>founded|refounded|ejected)\b[^%]*%%",
        )
        .map_err(|e| Error::Parse(format!("regex compile error: {}", e)))?;
        Ok(Self { re })
    }

    /// Extracts `(nation, action)` from free text, or `None` when the text
    /// does not carry the expected delimiters.
    pub fn extract(&self, text: &str) -> Option<(String, Action)> {
        let cap = self.re.captures(text)?;
        let nation = cap["nation"].trim();
        if nation.is_empty() {
            return None;
        }
        let action = cap["action"].parse().ok()?;
        Some((nation.to_string(), action))
    }
}
