//! Append-only feedback ledger.
//!
//! Source of truth for "what has been tried" within the open experiment: raw
//! feeds in submission order, per-key occurrence counts, and the population /
//! unused-items bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use rerank_core::types::{EpisodeRecord, Feed};

/// Per-experiment feedback record plus the population membership that
/// outlives experiments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackLedger {
    /// Fixed population, if one was configured.
    initial_population: Option<BTreeSet<String>>,
    /// Whether observed keys join a fixed population.
    population_growth: bool,
    /// Raw feeds of the open experiment, in submission order.
    feeds: Vec<Feed>,
    /// key → appearances across the open experiment's feeds.
    counter: BTreeMap<String, u64>,
    /// Every key ever observed in feedback. Never cleared: once a key has
    /// entered the population it stays there, even across experiment resets.
    seen: BTreeSet<String>,
    /// Most recently submitted feed.
    pub(crate) feed: Feed,
    /// Most recently computed output ordering.
    pub(crate) feed_out: Feed,
    /// Keys injected by the most recent trial run.
    pub(crate) items_to_try: Vec<String>,
}

impl FeedbackLedger {
    pub fn new(population: Option<Vec<String>>, population_growth: bool) -> Self {
        Self {
            initial_population: population.map(|keys| keys.into_iter().collect()),
            population_growth,
            ..Default::default()
        }
    }

    /// Append one raw feed and count its keys.
    pub fn log_feed(&mut self, feed: Feed) {
        for item in &feed {
            *self.counter.entry(item.key.clone()).or_insert(0) += 1;
            self.seen.insert(item.key.clone());
        }
        self.feed = feed.clone();
        self.feeds.push(feed);
    }

    /// Snapshot the pending feed, output, and injected keys into a record.
    pub fn episode_record(&self, episode: u64, is_opt_episode: bool) -> EpisodeRecord {
        EpisodeRecord {
            episode,
            is_opt_episode,
            feed: self.feed.clone(),
            feed_out: self.feed_out.clone(),
            items_added: self.items_to_try.clone(),
        }
    }

    /// Raw feeds of the open experiment.
    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    /// Occurrence count for one key within the open experiment.
    pub fn occurrences(&self, key: &str) -> u64 {
        self.counter.get(key).copied().unwrap_or(0)
    }

    /// The known population.
    ///
    /// Three-way policy: with no fixed set, the population is every key ever
    /// observed; with a fixed set and growth enabled, the union of both; with
    /// growth disabled, the fixed set alone. The population never shrinks.
    pub fn population(&self) -> BTreeSet<String> {
        match &self.initial_population {
            None => self.seen.clone(),
            Some(fixed) if self.population_growth => fixed.union(&self.seen).cloned().collect(),
            Some(fixed) => fixed.clone(),
        }
    }

    /// Population members not yet seen in any feed of the open experiment.
    ///
    /// Empty when no fixed population is configured: there is no upper bound
    /// to compute "unused" against. Sorted, so seeded sampling over the result
    /// is reproducible.
    pub fn unused_items(&self) -> Vec<String> {
        if self.initial_population.is_none() {
            return Vec::new();
        }
        self.population()
            .into_iter()
            .filter(|key| !self.counter.contains_key(key))
            .collect()
    }

    /// Clear per-experiment state: feeds, counter, and the pending
    /// feed/feed_out/items_to_try. `seen` is retained — keys that have
    /// appeared in feedback are forever part of the population.
    pub fn reset(&mut self) {
        self.feeds.clear();
        self.counter.clear();
        self.feed.clear();
        self.feed_out.clear();
        self.items_to_try.clear();
    }
}
