//! Scriptable in-memory [`NationApi`] for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use nsrecruit_api::types::{Action, Happening, HappeningsFilter};
use nsrecruit_api::{Error as ApiError, TelegramQuery};

use crate::api::NationApi;

#[derive(Debug, Clone, Copy)]
pub enum SendReply {
    Ok,
    RateLimited(Option<u64>),
    Status(u16),
}

#[derive(Default)]
pub struct FakeApi {
    feeds: HashMap<HappeningsFilter, Vec<Happening>>,
    scripted_feeds: Mutex<HashMap<HappeningsFilter, VecDeque<u16>>>,
    eligible: HashSet<String>,
    send_replies: Mutex<VecDeque<SendReply>>,
    send_latency: Duration,
    pub feed_calls: Mutex<Vec<HappeningsFilter>>,
    pub eligibility_calls: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<TelegramQuery>>,
}

pub fn happening(nation: &str, action: Action) -> Happening {
    Happening {
        nation: nation.to_string(),
        action,
        timestamp: None,
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch of `filter` returns these entries.
    pub fn feed(mut self, filter: HappeningsFilter, entries: &[(&str, Action)]) -> Self {
        self.feeds.insert(
            filter,
            entries.iter().map(|(n, a)| happening(n, *a)).collect(),
        );
        self
    }

    /// The next fetch of `filter` fails with `status` before falling back to the feed.
    pub fn feed_error(self, filter: HappeningsFilter, status: u16) -> Self {
        self.scripted_feeds
            .lock()
            .unwrap()
            .entry(filter)
            .or_default()
            .push_back(status);
        self
    }

    pub fn eligible(mut self, nation: &str) -> Self {
        self.eligible.insert(nation.to_lowercase());
        self
    }

    pub fn send_reply(self, reply: SendReply) -> Self {
        self.send_replies.lock().unwrap().push_back(reply);
        self
    }

    /// Each send takes this long before its reply arrives.
    pub fn send_latency(mut self, latency: Duration) -> Self {
        self.send_latency = latency;
        self
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|q| q.recipient.clone())
            .collect()
    }

    pub fn feed_call_count(&self) -> usize {
        self.feed_calls.lock().unwrap().len()
    }

    pub fn eligibility_call_count(&self) -> usize {
        self.eligibility_calls.lock().unwrap().len()
    }
}

impl NationApi for FakeApi {
    async fn happenings(&self, filter: HappeningsFilter) -> Result<Vec<Happening>, ApiError> {
        self.feed_calls.lock().unwrap().push(filter);
        let scripted = self
            .scripted_feeds
            .lock()
            .unwrap()
            .get_mut(&filter)
            .and_then(|q| q.pop_front());
        if let Some(status) = scripted {
            return Err(ApiError::HttpStatus {
                status,
                body: String::new(),
            });
        }
        Ok(self.feeds.get(&filter).cloned().unwrap_or_default())
    }

    async fn can_recruit(&self, nation: &str) -> Result<bool, ApiError> {
        self.eligibility_calls.lock().unwrap().push(nation.to_string());
        if self.eligible.contains(&nation.to_lowercase()) {
            Ok(true)
        } else {
            Err(ApiError::HttpStatus {
                status: 404,
                body: String::new(),
            })
        }
    }

    async fn send_telegram(&self, query: &TelegramQuery) -> Result<(), ApiError> {
        self.sent.lock().unwrap().push(query.clone());
        if !self.send_latency.is_zero() {
            tokio::time::sleep(self.send_latency).await;
        }
        let reply = self
            .send_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SendReply::Ok);
        match reply {
            SendReply::Ok => Ok(()),
            SendReply::RateLimited(secs) => Err(ApiError::RateLimited {
                retry_after: secs.map(Duration::from_secs),
            }),
            SendReply::Status(status) => Err(ApiError::HttpStatus {
                status,
                body: String::new(),
            }),
        }
    }
}
