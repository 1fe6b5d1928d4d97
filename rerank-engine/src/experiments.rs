//! Experiment bookkeeping: the open episode-record list and the archive of
//! closed experiments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rerank_core::types::{EpisodeRecord, Feed};

/// Groups episodes into experiments. The current experiment is open and
/// growing; everything in `history` is closed and immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperimentTracker {
    /// Episode counter within the open experiment.
    episode: u64,
    /// Id of the open experiment. Ids are strictly increasing from 0.
    experiment_id: u64,
    /// Episode records of the open experiment.
    records: Vec<EpisodeRecord>,
    /// Closed experiments by id.
    history: BTreeMap<u64, Vec<EpisodeRecord>>,
}

impl ExperimentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn experiment_id(&self) -> u64 {
        self.experiment_id
    }

    /// Episode records of the open experiment.
    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    /// Whether the open experiment has already been archived under its id.
    pub fn is_archived(&self) -> bool {
        self.history.contains_key(&self.experiment_id)
    }

    pub fn push_record(&mut self, record: EpisodeRecord) {
        self.records.push(record);
    }

    pub fn advance_episode(&mut self) {
        self.episode += 1;
    }

    /// Archive the open experiment under its id.
    ///
    /// No-op when it has no records: an id with zero episode records is never
    /// persisted into history. Idempotent while the open experiment is
    /// unchanged.
    pub fn add_experiment(&mut self) {
        if !self.records.is_empty() {
            self.history.insert(self.experiment_id, self.records.clone());
        }
    }

    /// Start the next experiment: clear the open records, reset the episode
    /// counter, and bump the id. Callers archive first if they want the open
    /// records kept.
    pub fn start_next(&mut self) {
        self.records.clear();
        self.episode = 0;
        self.experiment_id += 1;
    }

    /// All experiments: the archive plus the still-open one under its id.
    pub fn experiments(&self) -> BTreeMap<u64, Vec<EpisodeRecord>> {
        let mut all = self.history.clone();
        all.insert(self.experiment_id, self.records.clone());
        all
    }

    /// The `feed_out` of the last episode of the highest-numbered experiment
    /// that has any episodes. `None` before the first episode ever.
    pub fn output(&self) -> Option<Feed> {
        self.experiments()
            .into_iter()
            .rev()
            .find_map(|(_, records)| records.last().map(|r| r.feed_out.clone()))
    }
}
