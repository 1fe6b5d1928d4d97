//! Error taxonomy for the rerank workspace.
//!
//! Configuration mistakes are surfaced at construction time, shape violations
//! at the feed boundary, and checkpoint I/O failures propagate unchanged.

/// Unified error type for the rerank workspace.
#[derive(Debug, thiserror::Error)]
pub enum RerankError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid feed entry at index {index}: {reason}")]
    InvalidFeedEntry { index: usize, reason: String },

    #[error("duplicate key '{key}' at feed index {index}: keys must be unique within one feed")]
    DuplicateKey { key: String, index: usize },

    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias used across the workspace.
pub type RerankResult<T> = Result<T, RerankError>;
