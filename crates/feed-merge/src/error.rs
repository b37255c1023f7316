//! Error types for feed-merge operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    /// One external feed could not be retrieved. Non-fatal to a merge.
    #[error("Source unavailable ({platform}): {reason}")]
    SourceUnavailable { platform: String, reason: String },

    /// A malformed or unmatched event span. Non-fatal; only the span is dropped.
    #[error("Parse anomaly at byte {offset}: {message}")]
    ParseAnomaly { offset: usize, message: String },

    /// Blocks, bookings or the source list could not be read. Aborts the merge.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl MergeError {
    pub fn unavailable(platform: &str, reason: impl std::fmt::Display) -> Self {
        MergeError::SourceUnavailable {
            platform: platform.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        MergeError::Storage(format!("{context}: {err}"))
    }

    /// Whether the merge pipeline absorbs this error instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MergeError::SourceUnavailable { .. } | MergeError::ParseAnomaly { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
