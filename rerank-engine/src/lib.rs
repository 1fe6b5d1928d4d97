//! # rerank-engine
//!
//! Online, feedback-driven sequence re-ranking. The caller owns the actual
//! item-serving and reward-measurement loop and delegates only the "what
//! order to try next" decision to this engine: submit one feed of per-item
//! rewards per episode, get back the next ordering.
//!
//! ## Pipeline per step
//!
//! | Stage | Component |
//! |-------|-----------|
//! | Convergence check | [`ConvergenceMonitor`] |
//! | Feedback bookkeeping | [`FeedbackLedger`] |
//! | Aggregation + normalization | [`Scorer`] |
//! | Ordering | [`rerank_core::Selector`] (pluggable) |
//! | Exploration | [`TrialInjector`] |
//! | Episode/experiment history | [`ExperimentTracker`] |
//!
//! Everything is synchronous and in-memory; randomness comes from one
//! seedable generator so runs are reproducible, and [`checkpoint`] snapshots
//! the whole engine (RNG included) as a single blob.

pub mod checkpoint;
pub mod convergence;
pub mod engine;
pub mod experiments;
pub mod ledger;
pub mod scoring;
pub mod trials;

pub use convergence::ConvergenceMonitor;
pub use engine::{EngineSnapshot, EngineStatus, RerankEngine};
pub use experiments::ExperimentTracker;
pub use ledger::FeedbackLedger;
pub use scoring::{Aggregation, Normalization, Scorer, ScorerConfig};
pub use trials::TrialInjector;
