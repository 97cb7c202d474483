//! The identifying `User-Agent` sent with every request.
//!
//! The game's API terms require scripts to identify themselves and the
//! person running them, so the header is fixed for the whole run.

const PRODUCT: &str = "nsrecruit";

/// Builds the `User-Agent` value for an operator, e.g.
/// `nsrecruit/0.1.0 (operator: Testlandia)`.
pub fn build_user_agent(operator: &str) -> String {
    let operator = operator.trim();
    if operator.is_empty() {
        format!("{}/{}", PRODUCT, env!("CARGO_PKG_VERSION"))
    } else {
        format!(
            "{}/{} (operator: {})",
            PRODUCT,
            env!("CARGO_PKG_VERSION"),
            operator
        )
    }
}
