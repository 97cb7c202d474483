//! Shared query infrastructure: the [`Query`] trait.

use url::Url;

/// Trait implemented by all query builders. The game's API lives behind a
/// single endpoint, so a query is nothing more than its parameter set.
pub trait Query {
    /// Returns the `(key, value)` pairs this query sends.
    fn params(&self) -> Vec<(&'static str, String)>;

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in self.params() {
                pairs.append_pair(key, &value);
            }
        }
        url
    }
}
