//! Nation identifiers.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Name of one nation, as observed.
///
/// Equality and hashing use the game's canonical form (lowercase, spaces
/// as underscores), so `"Foo Bar"` from an allow list and `"foo_bar"` from
/// the feed are the same nation. The observed spelling is kept for display
/// and for the outbound request.
#[derive(Clone)]
pub struct NationId {
    name: String,
    key: String,
}

impl NationId {
    pub fn new(raw: &str) -> Self {
        let name = raw.trim().to_string();
        let key = canonical(&name);
        Self { name, key }
    }

    /// The name as it was observed.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The canonical form used for dedup.
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn canonical(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

impl PartialEq for NationId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for NationId {}

impl Hash for NationId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NationId({:?})", self.name)
    }
}

impl From<&str> for NationId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
