//! Convergence monitoring: episode ceiling and ordering-stagnation detection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use rerank_core::types::EpisodeRecord;

/// Watches the open experiment's episode history and decides whether to
/// continue, stop, or restart.
///
/// `stop` and `restart` are mutually exclusive per evaluation; a ceiling stop
/// takes priority over a stagnation restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceMonitor {
    /// Stop once this many episodes have run.
    episode_ceiling: Option<u64>,
    /// Consecutive identical orderings before declaring stagnation.
    patience: Option<u32>,
    /// Stagnation detection begins at this episode.
    start_at: u64,
    /// Stagnation triggers a restart instead of a stop.
    restart_on_stagnation: bool,
    stop: bool,
    restart: bool,
    stagnation_count: u32,
    last_seen_key_order: Vec<String>,
}

impl ConvergenceMonitor {
    pub fn new(
        episode_ceiling: Option<u64>,
        patience: Option<u32>,
        start_at: u64,
        restart_on_stagnation: bool,
    ) -> Self {
        Self {
            episode_ceiling,
            patience,
            start_at,
            restart_on_stagnation,
            stop: false,
            restart: false,
            stagnation_count: 0,
            last_seen_key_order: Vec::new(),
        }
    }

    /// Whether the experiment should stop. Terminal once set.
    pub fn stop(&self) -> bool {
        self.stop
    }

    /// Whether the experiment should be archived and restarted.
    pub fn restart(&self) -> bool {
        self.restart
    }

    pub fn stagnation_count(&self) -> u32 {
        self.stagnation_count
    }

    /// Evaluate against the open experiment's full episode history.
    pub fn evaluate(&mut self, records: &[EpisodeRecord]) {
        // Restart is a per-evaluation verdict; stop is sticky.
        self.restart = false;
        let Some(last) = records.last() else {
            return;
        };

        // Ceiling: the latest episode number is zero-based, so `ceiling`
        // episodes have run once it reaches ceiling - 1.
        if let Some(ceiling) = self.episode_ceiling {
            if last.episode + 1 >= ceiling {
                self.stop = true;
                return;
            }
        }

        let Some(patience) = self.patience else {
            return;
        };
        if !last.is_opt_episode || last.episode < self.start_at {
            return;
        }
        let keys: Vec<String> = last.feed_out.iter().map(|i| i.key.clone()).collect();
        if keys == self.last_seen_key_order {
            self.stagnation_count += 1;
            debug!(
                episode = last.episode,
                count = self.stagnation_count,
                "ordering unchanged"
            );
            if self.stagnation_count >= patience {
                if self.restart_on_stagnation {
                    self.restart = true;
                } else {
                    self.stop = true;
                }
            }
        } else {
            self.stagnation_count = 0;
            self.last_seen_key_order = keys;
        }
    }

    /// Clear all monitor state.
    pub fn reset(&mut self) {
        self.stop = false;
        self.restart = false;
        self.stagnation_count = 0;
        self.last_seen_key_order.clear();
    }
}
