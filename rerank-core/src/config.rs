//! Engine configuration.
//!
//! Strategy choices are closed enums resolved once at construction: an unknown
//! policy or strategy name is rejected when the config is deserialized, never
//! deferred to a runtime lookup.

use serde::{Deserialize, Serialize};

use crate::errors::{RerankError, RerankResult};

/// Default optimization interval: every episode is an optimization episode.
pub const DEFAULT_OPT_INTERVAL: u64 = 1;

/// Where the trial injector places newly sampled items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPolicy {
    /// At the end of the sequence.
    #[default]
    Append,
    /// At the start of the sequence.
    Prepend,
    /// A contiguous block centered on the midpoint.
    Middle,
    /// At random offsets bounded by the number of items being inserted.
    Random,
}

/// Constructor-time configuration. Immutable for the life of the engine
/// unless the engine is explicitly reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max unseen items injected per optimization episode.
    pub n_try: usize,
    /// Insertion policy for injected items.
    pub insertion: InsertPolicy,
    /// Fixed population keys. `None`: the population is whatever feedback has shown.
    pub population: Option<Vec<String>>,
    /// Whether keys observed in feedback join a fixed population.
    pub population_growth: bool,
    /// Stop once this many episodes have run in the open experiment.
    pub episode_ceiling: Option<u64>,
    /// Scoring/selection/injection runs every `opt_interval` episodes.
    pub opt_interval: u64,
    /// Consecutive identical orderings before declaring stagnation.
    pub early_stop_patience: Option<u32>,
    /// Episode at which stagnation detection begins.
    pub early_stop_start_at: u64,
    /// On stagnation: archive the experiment and restart instead of stopping.
    pub restart_on_stagnation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_try: 0,
            insertion: InsertPolicy::Append,
            population: None,
            population_growth: false,
            episode_ceiling: None,
            opt_interval: DEFAULT_OPT_INTERVAL,
            early_stop_patience: None,
            early_stop_start_at: 0,
            restart_on_stagnation: false,
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> RerankResult<()> {
        if self.opt_interval == 0 {
            return Err(RerankError::InvalidConfig {
                reason: "opt_interval must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
