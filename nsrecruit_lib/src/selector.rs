//! Target selection: who gets the next telegram.
//!
//! The allow list is always served first, in order. After that a category
//! is drawn by weight, the feed for that category is fetched, and the first
//! fresh, unblocked, accepted nation with the right verb wins. Batch mode
//! does the same for many targets at once with one fetch per category.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use nsrecruit_api::types::{Action, Happening, HappeningsFilter};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::api::NationApi;
use crate::classifier::Classifier;
use crate::error::RecruitError;
use crate::feed::EventFeed;
use crate::nation::NationId;
use crate::session::RecruitSession;

/// Feed categories that produce candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Founding,
    Refounding,
    Ejected,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Founding, Category::Refounding, Category::Ejected];

    pub fn filter(&self) -> HappeningsFilter {
        match self {
            Self::Founding | Self::Refounding => HappeningsFilter::Founding,
            Self::Ejected => HappeningsFilter::Eject,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Self::Founding => Action::Founded,
            Self::Refounding => Action::Refounded,
            Self::Ejected => Action::Ejected,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Founding => "founding",
            Self::Refounding => "refounding",
            Self::Ejected => "ejected",
        };
        f.write_str(name)
    }
}

/// Sampling weights per category. They need not sum to 1; zero disables a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionWeights {
    #[serde(default)]
    pub found: f64,
    #[serde(default)]
    pub refound: f64,
    #[serde(default)]
    pub ejected: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            found: 0.8,
            refound: 0.2,
            ejected: 0.0,
        }
    }
}

impl SelectionWeights {
    pub fn new(found: f64, refound: f64, ejected: f64) -> Self {
        Self {
            found,
            refound,
            ejected,
        }
    }

    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Founding => self.found,
            Category::Refounding => self.refound,
            Category::Ejected => self.ejected,
        }
    }

    /// Categories with a strictly positive weight, in [`Category::ALL`] order.
    pub fn enabled(&self) -> Vec<(Category, f64)> {
        Category::ALL
            .iter()
            .map(|&c| (c, self.weight(c)))
            .filter(|&(_, w)| w > 0.0)
            .collect()
    }

    /// Per-category share of a batch of `size`: floor(weight * size), zero
    /// shares left out.
    pub fn batch_slots(&self, size: usize) -> Vec<(Category, usize)> {
        self.enabled()
            .into_iter()
            .map(|(c, w)| (c, (w * size as f64).floor() as usize))
            .filter(|&(_, slots)| slots > 0)
            .collect()
    }

    pub fn validate(&self) -> Result<(), RecruitError> {
        for category in Category::ALL {
            let w = self.weight(category);
            if !w.is_finite() || w < 0.0 {
                return Err(RecruitError::Config(format!(
                    "weight for {} must be a non-negative number, got {}",
                    category, w
                )));
            }
        }
        let total = self.found + self.refound + self.ejected;
        if total > 1.0 + 1e-9 {
            return Err(RecruitError::Config(format!(
                "category weights sum to {}, must not exceed 1",
                total
            )));
        }
        Ok(())
    }

    /// Draws one category. Zero-weight categories are left out of the draw
    /// entirely; `None` when no category is enabled.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Category> {
        let enabled = self.enabled();
        let dist = WeightedIndex::new(enabled.iter().map(|&(_, w)| w)).ok()?;
        Some(enabled[dist.sample(rng)].0)
    }
}

/// The run's fixed selection inputs.
#[derive(Debug, Clone)]
pub struct SelectorSettings {
    pub allow_list: Vec<NationId>,
    pub block_list: HashSet<NationId>,
    pub weights: SelectionWeights,
    /// Apply the classifier to batch picks as well.
    pub filter_batches: bool,
    /// Rounds `next` tries before reporting `NoCandidates`.
    pub empty_round_max: u32,
    pub empty_round_backoff: Duration,
    pub empty_round_backoff_max: Duration,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            allow_list: Vec::new(),
            block_list: HashSet::new(),
            weights: SelectionWeights::default(),
            filter_batches: true,
            empty_round_max: 10,
            empty_round_backoff: Duration::from_secs(5),
            empty_round_backoff_max: Duration::from_secs(120),
        }
    }
}

impl SelectorSettings {
    /// Capped exponential wait after empty round `round` (1-based).
    fn backoff_after(&self, round: u32) -> Duration {
        let shift = round.saturating_sub(1).min(16);
        self.empty_round_backoff
            .saturating_mul(1u32 << shift)
            .min(self.empty_round_backoff_max)
    }
}

/// Random source for a run: reproducible when `seed` is set, otherwise from OS entropy.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub struct TargetSelector<A, R> {
    feed: EventFeed<A>,
    classifier: Classifier<A>,
    settings: SelectorSettings,
    rng: R,
}

impl<A: NationApi, R: Rng + Send> TargetSelector<A, R> {
    pub fn new(
        feed: EventFeed<A>,
        classifier: Classifier<A>,
        settings: SelectorSettings,
        rng: R,
    ) -> Self {
        Self {
            feed,
            classifier,
            settings,
            rng,
        }
    }

    pub fn settings(&self) -> &SelectorSettings {
        &self.settings
    }

    fn is_blocked(&self, nation: &NationId) -> bool {
        self.settings.block_list.contains(nation)
    }

    fn is_fresh(&self, session: &RecruitSession, nation: &NationId) -> bool {
        !session.history.has(nation) && !self.is_blocked(nation)
    }

    /// Runs the classifier; a rejection is remembered so the nation is never
    /// looked at again this run.
    async fn screen(&self, session: &mut RecruitSession, nation: &NationId) -> bool {
        if self.classifier.accepts(nation).await {
            return true;
        }
        session.history.record(nation.clone());
        session.counters.rejected += 1;
        false
    }

    /// First allow-listed nation that is fresh and accepted.
    async fn next_allow_listed(&self, session: &mut RecruitSession) -> Option<NationId> {
        for nation in &self.settings.allow_list {
            if !self.is_fresh(session, nation) {
                continue;
            }
            if self.screen(session, nation).await {
                return Some(nation.clone());
            }
        }
        None
    }

    /// Fetches the category's feed and returns the first usable entry.
    async fn scan_category(
        &self,
        session: &mut RecruitSession,
        category: Category,
    ) -> Result<Option<NationId>, RecruitError> {
        let happenings = self.feed.fetch(category.filter()).await?;
        for happening in happenings {
            if happening.action != category.action() {
                continue;
            }
            let nation = NationId::new(&happening.nation);
            if !self.is_fresh(session, &nation) {
                continue;
            }
            if self.screen(session, &nation).await {
                return Ok(Some(nation));
            }
        }
        Ok(None)
    }

    /// The next nation to contact.
    ///
    /// Never returns a nation in history or on the block list. Empty rounds
    /// back off exponentially; after `empty_round_max` of them the call
    /// gives up with [`RecruitError::NoCandidates`]. With the allow list
    /// drained and every weight zero it fails fast with
    /// [`RecruitError::NothingToRecruit`].
    pub async fn next(&mut self, session: &mut RecruitSession) -> Result<NationId, RecruitError> {
        if let Some(nation) = self.next_allow_listed(session).await {
            tracing::debug!("Selected allow-listed nation {}", nation);
            session.counters.found += 1;
            return Ok(nation);
        }

        let rounds = self.settings.empty_round_max.max(1);
        for round in 1..=rounds {
            let category = self
                .settings
                .weights
                .sample(&mut self.rng)
                .ok_or(RecruitError::NothingToRecruit)?;

            match self.scan_category(session, category).await {
                Ok(Some(nation)) => {
                    tracing::debug!("Selected {} nation {}", category, nation);
                    session.counters.found += 1;
                    return Ok(nation);
                }
                Ok(None) => {
                    tracing::info!(
                        "No new {} nations found (round {}/{})",
                        category,
                        round,
                        rounds
                    );
                }
                Err(e) => {
                    tracing::warn!("Could not scan {} nations: {}", category, e);
                }
            }

            if round < rounds {
                sleep(self.settings.backoff_after(round)).await;
            }
        }

        Err(RecruitError::NoCandidates { rounds })
    }

    /// A batch of up to roughly `target_count` nations.
    ///
    /// Drains the allow list, then takes `floor(weight * target_count)` from
    /// each enabled category, sampling at random when a category has more
    /// candidates than slots. Each distinct feed is fetched at most once.
    pub async fn next_batch(
        &mut self,
        session: &mut RecruitSession,
        target_count: usize,
    ) -> Result<Vec<NationId>, RecruitError> {
        let filter = self.settings.filter_batches;
        let mut batch: Vec<NationId> = Vec::new();
        let mut picked: HashSet<NationId> = HashSet::new();

        for nation in &self.settings.allow_list {
            if !self.is_fresh(session, nation) || picked.contains(nation) {
                continue;
            }
            if filter && !self.screen(session, nation).await {
                continue;
            }
            picked.insert(nation.clone());
            batch.push(nation.clone());
        }

        let shares = self.settings.weights.batch_slots(target_count);
        let mut fetched: HashMap<HappeningsFilter, Vec<Happening>> = HashMap::new();

        for &(category, slots) in &shares {
            let feed_filter = category.filter();
            if !fetched.contains_key(&feed_filter) {
                match self.feed.fetch(feed_filter).await {
                    Ok(happenings) => {
                        fetched.insert(feed_filter, happenings);
                    }
                    Err(e) => {
                        tracing::warn!("Could not scan {} nations: {}", category, e);
                        continue;
                    }
                }
            }

            let mut candidates: Vec<NationId> = Vec::new();
            for happening in fetched.get(&feed_filter).into_iter().flatten() {
                if happening.action != category.action() {
                    continue;
                }
                let nation = NationId::new(&happening.nation);
                if self.is_fresh(session, &nation)
                    && !picked.contains(&nation)
                    && !candidates.contains(&nation)
                {
                    candidates.push(nation);
                }
            }
            if candidates.len() > slots {
                candidates.shuffle(&mut self.rng);
            }

            let mut taken = 0usize;
            for nation in candidates {
                if taken == slots {
                    break;
                }
                if filter && !self.screen(session, &nation).await {
                    continue;
                }
                picked.insert(nation.clone());
                batch.push(nation);
                taken += 1;
            }
            tracing::debug!("Picked {}/{} {} nations", taken, slots, category);
        }

        if batch.is_empty() {
            // No category gets a slot at this size, so waiting cannot help.
            if shares.is_empty() {
                return Err(RecruitError::NothingToRecruit);
            }
            sleep(self.settings.empty_round_backoff).await;
            return Err(RecruitError::NoCandidates { rounds: 1 });
        }

        session.counters.found += batch.len() as u64;
        Ok(batch)
    }
}
