//! The recruitment loop: select, dispatch, repeat until told to stop.

use std::future::Future;

use rand::Rng;
use tokio::time::sleep;

use crate::api::NationApi;
use crate::dispatcher::{Dispatcher, SendOutcome};
use crate::error::RecruitError;
use crate::nation::NationId;
use crate::selector::TargetSelector;
use crate::session::{RecruitSession, RunCounters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// One target per iteration, or a batch of roughly `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Batch(usize),
}

pub struct RecruitmentLoop<A, R> {
    selector: TargetSelector<A, R>,
    dispatcher: Dispatcher<A>,
    mode: Mode,
    state: LoopState,
}

impl<A: NationApi, R: Rng + Send> RecruitmentLoop<A, R> {
    pub fn new(selector: TargetSelector<A, R>, dispatcher: Dispatcher<A>, mode: Mode) -> Self {
        Self {
            selector,
            dispatcher,
            mode,
            state: LoopState::Stopped,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The nations to contact this iteration.
    async fn select(&mut self, session: &mut RecruitSession) -> Result<Vec<NationId>, RecruitError> {
        match self.mode {
            Mode::Single => Ok(vec![self.selector.next(session).await?]),
            Mode::Batch(size) => {
                let batch = self.selector.next_batch(session, size).await?;
                tracing::info!("Dispatching batch of {} nations", batch.len());
                Ok(batch)
            }
        }
    }

    fn halt(&mut self) {
        tracing::info!("Stop requested");
        self.state = LoopState::Stopped;
    }

    /// Runs until `stop` resolves or there is nothing left to recruit.
    ///
    /// `stop` is raced against selection and against each cooldown. A send
    /// that has started always completes and is counted before the loop
    /// stops. Per-target and per-round failures are logged and the loop
    /// carries on.
    pub async fn run<F>(&mut self, session: &mut RecruitSession, stop: F) -> RunCounters
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);
        self.state = LoopState::Running;
        tracing::info!(
            "Recruitment started with telegram {} ({})",
            self.dispatcher.template().name,
            self.dispatcher.template().kind
        );

        while self.state == LoopState::Running {
            let selected = tokio::select! {
                biased;
                _ = &mut stop => None,
                result = self.select(session) => Some(result),
            };

            let targets = match selected {
                None => {
                    self.halt();
                    break;
                }
                Some(Ok(targets)) => targets,
                Some(Err(RecruitError::NothingToRecruit)) => {
                    tracing::warn!("{}", RecruitError::NothingToRecruit);
                    self.state = LoopState::Stopped;
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!("Recruitment round failed: {}", e);
                    continue;
                }
            };

            for nation in &targets {
                if self.dispatcher.deliver(session, nation).await == SendOutcome::Skipped {
                    continue;
                }
                let cooled = tokio::select! {
                    biased;
                    _ = &mut stop => false,
                    _ = sleep(self.dispatcher.cooldown()) => true,
                };
                if !cooled {
                    self.halt();
                    break;
                }
            }
        }

        tracing::info!("Recruitment stopped: {}", session.counters);
        session.counters
    }
}
