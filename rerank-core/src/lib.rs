//! # rerank-core
//!
//! Foundation crate for the rerank workspace.
//! Defines feed and episode types, the error taxonomy, engine configuration,
//! and the selector seam. The engine crate depends on this.

pub mod config;
pub mod errors;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{EngineConfig, InsertPolicy};
pub use errors::{RerankError, RerankResult};
pub use traits::{ScoreOrdered, Selector};
pub use types::{reposition, validate_feed, EpisodeRecord, Feed, FeedItem};
