use thiserror::Error;

use crate::instrument::Source;

/// Unified error type for the tidemark workspace.
///
/// This wraps per-source fetch failures, data-quality problems, argument
/// validation errors, store failures, and not-found conditions.
#[derive(Debug, Error)]
pub enum TidemarkError {
    /// Issues with returned or expected data (unparseable rows, mixed series, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A single source feed failed to deliver. Recoverable; the orchestrator
    /// skips to the next source.
    #[error("{feed_source} failed: {msg}")]
    Feed {
        /// Source that failed.
        feed_source: Source,
        /// Human-readable error message.
        msg: String,
    },

    /// No source (cache or web) produced any data for the request.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "history for LONDON:ABC".
        what: String,
    },

    /// The durable store could not be read or written.
    #[error("store failure: {0}")]
    Store(String),

    /// Configuration problem with no safe default (e.g. an instrument with no
    /// resolvable currency). The only error class that propagates hard.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TidemarkError {
    /// Helper: build a `Feed` error with the source identity and message.
    pub fn feed(source: Source, msg: impl Into<String>) -> Self {
        Self::Feed {
            feed_source: source,
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Store` error from any displayable cause.
    pub fn store(msg: impl std::fmt::Display) -> Self {
        Self::Store(msg.to_string())
    }

    /// Helper: build a `Config` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the error represents a normal "no data" outcome rather than
    /// a fault.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
