//! Sending telegrams under the mandatory cooldown.

use std::sync::Arc;
use std::time::Duration;

use nsrecruit_api::{Error as ApiError, TelegramQuery};
use tokio::time::sleep;

use crate::api::NationApi;
use crate::error::RecruitError;
use crate::nation::NationId;
use crate::session::RecruitSession;
use crate::telegram::{TelegramKind, TelegramTemplate};

/// Minimum spacing between recruitment telegrams imposed by the game.
pub const RECRUITMENT_DELAY: Duration = Duration::from_secs(180);

/// Minimum spacing between any other telegrams.
pub const NON_RECRUITMENT_DELAY: Duration = Duration::from_secs(30);

/// Post-send delay per telegram kind. Can be lengthened, never shortened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    recruitment: Duration,
    non_recruitment: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            recruitment: RECRUITMENT_DELAY,
            non_recruitment: NON_RECRUITMENT_DELAY,
        }
    }
}

impl RateLimitPolicy {
    pub fn new(recruitment: Duration, non_recruitment: Duration) -> Result<Self, RecruitError> {
        if recruitment < RECRUITMENT_DELAY {
            return Err(RecruitError::Config(format!(
                "recruitment delay must be at least {}s",
                RECRUITMENT_DELAY.as_secs()
            )));
        }
        if non_recruitment < NON_RECRUITMENT_DELAY {
            return Err(RecruitError::Config(format!(
                "non-recruitment delay must be at least {}s",
                NON_RECRUITMENT_DELAY.as_secs()
            )));
        }
        Ok(Self {
            recruitment,
            non_recruitment,
        })
    }

    pub fn delay_for(&self, kind: TelegramKind) -> Duration {
        match kind {
            TelegramKind::Recruitment => self.recruitment,
            TelegramKind::NonRecruitment => self.non_recruitment,
        }
    }
}

/// What happened to one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The attempt failed; it still counts as contact and still cost a cooldown.
    Failed(String),
    /// Already contacted this run; nothing was sent.
    Skipped,
}

/// Sends the active telegram to one nation at a time.
pub struct Dispatcher<A> {
    api: Arc<A>,
    client_key: String,
    template: TelegramTemplate,
    policy: RateLimitPolicy,
}

impl<A: NationApi> Dispatcher<A> {
    pub fn new(
        api: Arc<A>,
        client_key: &str,
        template: TelegramTemplate,
        policy: RateLimitPolicy,
    ) -> Self {
        Self {
            api,
            client_key: client_key.to_string(),
            template,
            policy,
        }
    }

    pub fn template(&self) -> &TelegramTemplate {
        &self.template
    }

    /// Cooldown after every attempt with the active template.
    pub fn cooldown(&self) -> Duration {
        self.policy.delay_for(self.template.kind)
    }

    /// Sends the telegram to `nation`, then sleeps the cooldown unless the
    /// nation was skipped.
    pub async fn send(&self, session: &mut RecruitSession, nation: &NationId) -> SendOutcome {
        let outcome = self.deliver(session, nation).await;
        if outcome != SendOutcome::Skipped {
            sleep(self.cooldown()).await;
        }
        outcome
    }

    /// Sends the telegram to `nation` without the trailing cooldown.
    ///
    /// 429 responses are waited out for the provider's `Retry-After` (or the
    /// active cooldown when it sent none) and the identical request is
    /// retried, without limit. Every other outcome counts as one attempt:
    /// the nation goes into history and `sent` is bumped, failed or not.
    pub async fn deliver(&self, session: &mut RecruitSession, nation: &NationId) -> SendOutcome {
        if session.history.has(nation) {
            tracing::debug!("{} was already contacted this run, not sending", nation);
            return SendOutcome::Skipped;
        }

        let query = TelegramQuery::new(
            &self.client_key,
            &self.template.tgid,
            &self.template.secret_key,
            nation.as_str(),
        );

        let outcome = loop {
            match self.api.send_telegram(&query).await {
                Ok(()) => {
                    tracing::info!("Sent telegram {} to {}", self.template.name, nation);
                    break SendOutcome::Delivered;
                }
                Err(ApiError::RateLimited { retry_after }) => {
                    let wait = retry_after.unwrap_or_else(|| self.cooldown());
                    session.counters.throttled += 1;
                    tracing::warn!(
                        "Rate limited sending to {}, waiting {}s before trying again",
                        nation,
                        wait.as_secs()
                    );
                    sleep(wait).await;
                }
                Err(e) => {
                    tracing::error!("Tried to send telegram to {}, but got error: {}", nation, e);
                    session.counters.failed += 1;
                    break SendOutcome::Failed(e.to_string());
                }
            }
        };

        session.counters.sent += 1;
        session.history.record(nation.clone());
        outcome
    }
}
