//! Per-run mutable state, passed explicitly to every component call.

use std::fmt;

use crate::history::DispatchHistory;

/// Operator-facing counters. Nothing reads these to make decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// Targets handed out by the selector.
    pub found: u64,
    /// Dispatch attempts that ran to completion (delivered or failed).
    pub sent: u64,
    /// Attempts that ended in an error other than throttling.
    pub failed: u64,
    /// 429 responses waited out.
    pub throttled: u64,
    /// Candidates turned down by the classifier.
    pub rejected: u64,
}

impl fmt::Display for RunCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found {} and sent {} telegrams ({} failed, {} throttled, {} candidates rejected)",
            self.found, self.sent, self.failed, self.throttled, self.rejected
        )
    }
}

/// Everything one recruitment run mutates.
#[derive(Debug, Default)]
pub struct RecruitSession {
    pub history: DispatchHistory,
    pub counters: RunCounters,
}

impl RecruitSession {
    pub fn new() -> Self {
        Self::default()
    }
}
