//! Query builder for the telegram send action.

use std::fmt;

use crate::query::Query;

/// A single `sendTG` request: operator key, template id, template secret and
/// the recipient.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramQuery {
    pub client_key: String,
    pub tgid: String,
    pub secret_key: String,
    pub recipient: String,
}

impl TelegramQuery {
    pub fn new(client_key: &str, tgid: &str, secret_key: &str, recipient: &str) -> Self {
        Self {
            client_key: client_key.to_string(),
            tgid: tgid.to_string(),
            secret_key: secret_key.to_string(),
            recipient: recipient.to_string(),
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for TelegramQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramQuery")
            .field("client_key", &"<redacted>")
            .field("tgid", &self.tgid)
            .field("secret_key", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Query for TelegramQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("a", "sendTG".to_string()),
            ("client", self.client_key.clone()),
            ("tgid", self.tgid.clone()),
            ("key", self.secret_key.clone()),
            ("to", self.recipient.clone()),
        ]
    }
}
