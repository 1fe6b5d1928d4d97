//! Feed and episode types shared across the workspace.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{RerankError, RerankResult};

/// One entry of a feed: a named item with its observed reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Item key. Unique within one feed.
    pub key: String,
    /// Observed reward for this episode, or the aggregated reward after scoring.
    pub reward: f64,
    /// Positional index. Advisory: recomputed whenever the feed is reordered.
    #[serde(default)]
    pub pos: usize,
    /// Normalized score, populated by the scoring stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl FeedItem {
    /// Create an item with no position or score assigned yet.
    pub fn new(key: impl Into<String>, reward: f64) -> Self {
        Self {
            key: key.into(),
            reward,
            pos: 0,
            score: None,
        }
    }
}

/// An ordered sequence of feed items: one episode's feedback or output.
pub type Feed = Vec<FeedItem>;

/// Recompute every item's `pos` field to match its current index.
pub fn reposition(feed: &mut Feed) {
    for (ix, item) in feed.iter_mut().enumerate() {
        item.pos = ix;
    }
}

/// One episode's record. Immutable once appended to an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode number within the experiment, starting at 0.
    pub episode: u64,
    /// Whether scoring/selection/injection ran on this episode.
    pub is_opt_episode: bool,
    /// The feedback submitted for this episode.
    pub feed: Feed,
    /// The ordering computed for the next episode.
    pub feed_out: Feed,
    /// Keys injected by the trial run of this episode.
    pub items_added: Vec<String>,
}

/// Validate a caller-submitted feed at the engine boundary.
///
/// Duplicate or empty keys and non-finite rewards are shape violations and
/// fail fast with an error naming the offending entry. Nothing is coerced.
pub fn validate_feed(feed: &Feed) -> RerankResult<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(feed.len());
    for (index, item) in feed.iter().enumerate() {
        if item.key.is_empty() {
            return Err(RerankError::InvalidFeedEntry {
                index,
                reason: "empty key".to_string(),
            });
        }
        if !item.reward.is_finite() {
            return Err(RerankError::InvalidFeedEntry {
                index,
                reason: format!("non-finite reward for key '{}'", item.key),
            });
        }
        if !seen.insert(item.key.as_str()) {
            return Err(RerankError::DuplicateKey {
                key: item.key.clone(),
                index,
            });
        }
    }
    Ok(())
}
