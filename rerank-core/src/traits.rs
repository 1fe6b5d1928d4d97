//! External-collaborator seams.

use crate::types::Feed;

/// Item-selection policy: turns a scored feed into the next ordering.
///
/// The engine only requires that the output is an ordering over the scored
/// items it was given. Implementations must be pure functions of their input;
/// policy internals are the caller's business.
pub trait Selector: Send + Sync {
    /// Produce the next ordering from a scored feed.
    fn select(&self, scored: Feed) -> Feed;
}

/// Default selector: keep the scorer's descending-score order as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreOrdered;

impl Selector for ScoreOrdered {
    fn select(&self, scored: Feed) -> Feed {
        scored
    }
}
