//! Process-lifetime record of nations already handled this run.

use std::collections::HashSet;

use crate::nation::NationId;

/// Append-only set of nations that must not be contacted again this run.
///
/// Holds both nations that were sent a telegram and nations the classifier
/// turned down (negative cache). Nothing is ever evicted or persisted.
#[derive(Debug, Default)]
pub struct DispatchHistory {
    seen: HashSet<NationId>,
}

impl DispatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, nation: &NationId) -> bool {
        self.seen.contains(nation)
    }

    /// Records `nation`. Returns `false` if it was already present.
    pub fn record(&mut self, nation: NationId) -> bool {
        self.seen.insert(nation)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_has() {
        let mut history = DispatchHistory::new();
        assert!(!history.has(&NationId::new("foo")));
        assert!(history.record(NationId::new("Foo")));
        assert!(history.has(&NationId::new("foo")));
        assert!(!history.record(NationId::new("FOO")));
        assert_eq!(history.len(), 1);
    }
}
