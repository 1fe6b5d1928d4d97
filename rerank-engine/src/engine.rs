//! Optimization driver: one `step` per episode of feedback.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rerank_core::config::EngineConfig;
use rerank_core::errors::RerankResult;
use rerank_core::traits::{ScoreOrdered, Selector};
use rerank_core::types::{validate_feed, EpisodeRecord, Feed};

use crate::convergence::ConvergenceMonitor;
use crate::experiments::ExperimentTracker;
use crate::ledger::FeedbackLedger;
use crate::scoring::{Scorer, ScorerConfig};
use crate::trials::TrialInjector;

/// Driver status. `Stopped` is terminal for the open experiment but
/// recoverable through [`RerankEngine::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
    Running,
    Stopped,
}

/// Serializable snapshot of the full engine state, RNG included. The
/// selector is code, not state, and lives outside the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub config: EngineConfig,
    pub scorer: ScorerConfig,
    pub ledger: FeedbackLedger,
    pub tracker: ExperimentTracker,
    pub monitor: ConvergenceMonitor,
    pub rng: ChaCha8Rng,
}

/// The per-call orchestrator. Owns all mutable state exclusively; callers
/// must serialize access themselves (at most one in-flight step per instance).
///
/// Each step: ledger update → (on optimization episodes) scoring + selection
/// + trial injection → episode logging → convergence check → possible
/// archive/reset. No I/O happens inside a step.
pub struct RerankEngine {
    config: EngineConfig,
    scorer: Scorer,
    injector: TrialInjector,
    selector: Box<dyn Selector>,
    ledger: FeedbackLedger,
    tracker: ExperimentTracker,
    monitor: ConvergenceMonitor,
    rng: ChaCha8Rng,
}

impl std::fmt::Debug for RerankEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RerankEngine")
            .field("config", &self.config)
            .field("scorer", &self.scorer)
            .field("injector", &self.injector)
            .field("ledger", &self.ledger)
            .field("tracker", &self.tracker)
            .field("monitor", &self.monitor)
            .field("rng", &self.rng)
            .finish_non_exhaustive()
    }
}

impl RerankEngine {
    /// Entropy-seeded engine with the default selector.
    pub fn new(config: EngineConfig, scorer: ScorerConfig) -> RerankResult<Self> {
        Self::with_rng(config, scorer, ChaCha8Rng::from_entropy())
    }

    /// Engine with a fixed seed, for reproducible runs.
    pub fn with_seed(config: EngineConfig, scorer: ScorerConfig, seed: u64) -> RerankResult<Self> {
        Self::with_rng(config, scorer, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(
        config: EngineConfig,
        scorer: ScorerConfig,
        rng: ChaCha8Rng,
    ) -> RerankResult<Self> {
        config.validate()?;
        let ledger = FeedbackLedger::new(config.population.clone(), config.population_growth);
        let monitor = ConvergenceMonitor::new(
            config.episode_ceiling,
            config.early_stop_patience,
            config.early_stop_start_at,
            config.restart_on_stagnation,
        );
        Ok(Self {
            injector: TrialInjector::new(config.n_try, config.insertion),
            scorer: Scorer::new(scorer),
            selector: Box::new(ScoreOrdered),
            config,
            ledger,
            tracker: ExperimentTracker::new(),
            monitor,
            rng,
        })
    }

    /// Swap in a selection policy. The default keeps the scorer's order.
    pub fn set_selector(&mut self, selector: Box<dyn Selector>) {
        self.selector = selector;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        if self.monitor.stop() {
            EngineStatus::Stopped
        } else {
            EngineStatus::Running
        }
    }

    /// Episode counter within the open experiment.
    pub fn episode(&self) -> u64 {
        self.tracker.episode()
    }

    pub fn experiment_id(&self) -> u64 {
        self.tracker.experiment_id()
    }

    /// True when the next logged episode is an optimization episode.
    pub fn is_opt_episode(&self) -> bool {
        self.tracker.episode() % self.config.opt_interval == 0
    }

    /// All experiments: archived plus the still-open one.
    pub fn experiments(&self) -> BTreeMap<u64, Vec<EpisodeRecord>> {
        self.tracker.experiments()
    }

    /// Best-so-far ordering: the output of the last episode of the
    /// highest-numbered experiment with any episodes.
    pub fn output(&self) -> Option<Feed> {
        self.tracker.output()
    }

    /// The current working ordering.
    pub fn feed_out(&self) -> &Feed {
        &self.ledger.feed_out
    }

    /// Population members not yet tried in the open experiment.
    pub fn unused_items(&self) -> Vec<String> {
        self.ledger.unused_items()
    }

    /// Advance one episode given this episode's feedback.
    ///
    /// Evaluates the convergence monitor first: a restart archives the open
    /// experiment and runs the step inside the new one; a stop archives once
    /// and returns the previous ordering unchanged. Otherwise the feed is
    /// logged and, on optimization episodes, the scoring → selection →
    /// injection pipeline recomputes the ordering.
    pub fn step(&mut self, feed: Feed) -> RerankResult<Feed> {
        validate_feed(&feed)?;
        self.monitor.evaluate(self.tracker.records());
        if self.monitor.restart() {
            info!(
                experiment = self.tracker.experiment_id(),
                episode = self.tracker.episode(),
                "stagnant ordering: archiving experiment and restarting"
            );
            self.close_experiment();
        } else if self.monitor.stop() {
            if !self.tracker.records().is_empty() && !self.tracker.is_archived() {
                info!(
                    experiment = self.tracker.experiment_id(),
                    "stopped: archiving experiment"
                );
                self.tracker.add_experiment();
            }
            return Ok(self.ledger.feed_out.clone());
        }
        self.run_step(feed)
    }

    fn run_step(&mut self, feed: Feed) -> RerankResult<Feed> {
        let episode = self.tracker.episode();
        let is_opt = self.is_opt_episode();
        self.ledger.log_feed(feed);
        self.ledger.items_to_try.clear();
        if is_opt {
            let scored = self.scorer.score(self.ledger.feeds());
            let selected = self.selector.select(scored);
            let unused = self.ledger.unused_items();
            let (injected, feed_out) = self.injector.run(&mut self.rng, &selected, &unused);
            debug!(episode, injected = injected.len(), "optimization episode");
            self.ledger.items_to_try = injected;
            self.ledger.feed_out = feed_out;
        }
        self.tracker
            .push_record(self.ledger.episode_record(episode, is_opt));
        self.tracker.advance_episode();
        Ok(self.ledger.feed_out.clone())
    }

    /// Archive the open experiment (if it has episodes) and start a fresh
    /// one. Also recovers a stopped engine.
    pub fn reset(&mut self) {
        self.close_experiment();
    }

    fn close_experiment(&mut self) {
        self.tracker.add_experiment();
        self.tracker.start_next();
        self.ledger.reset();
        self.monitor.reset();
    }

    /// Capture the full engine state for checkpointing.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            config: self.config.clone(),
            scorer: *self.scorer.config(),
            ledger: self.ledger.clone(),
            tracker: self.tracker.clone(),
            monitor: self.monitor.clone(),
            rng: self.rng.clone(),
        }
    }

    /// Rebuild an engine from a snapshot around a caller-supplied selector.
    pub fn from_snapshot(snapshot: EngineSnapshot, selector: Box<dyn Selector>) -> Self {
        Self {
            injector: TrialInjector::new(snapshot.config.n_try, snapshot.config.insertion),
            scorer: Scorer::new(snapshot.scorer),
            selector,
            config: snapshot.config,
            ledger: snapshot.ledger,
            tracker: snapshot.tracker,
            monitor: snapshot.monitor,
            rng: snapshot.rng,
        }
    }
}
