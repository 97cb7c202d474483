mod client;
mod errors;
mod query;
pub mod types;
mod user_agent;
pub mod xml;
pub use self::client::{parse_retry_after, Client, DEFAULT_BASE_URL};
pub use self::errors::Error;
pub use self::query::{EligibilityQuery, HappeningsQuery, Query, TelegramQuery};
pub use self::user_agent::build_user_agent;
