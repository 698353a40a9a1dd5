//! Token stream error types.
//!
//! End of stream is not an error: it is reported as `Ok(None)` by every
//! pulling operation. Errors cover upstream failures and misuse of the
//! stream.

use std::io;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, StreamError>;

/// An error raised while pulling, rewriting, or closing a token stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The upstream source failed to read its input.
    #[error("upstream I/O error: {0}")]
    Io(#[from] io::Error),

    /// The upstream source failed for a reason other than I/O.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A rule peeked further ahead than the configured limit allows.
    #[error("lookahead of {requested} tokens exceeds the limit of {limit}")]
    LookaheadLimit {
        /// Position the rule asked for.
        requested: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// A rule dropped its token and restored the lookahead queue unchanged,
    /// so the next pull would repeat the same invocation.
    #[error("rewrite rule made no progress")]
    NoProgress,

    /// The stream was used after `close`.
    #[error("token stream is closed")]
    Closed,
}

impl StreamError {
    /// Create an upstream error from a message.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Check whether this error came from the upstream source.
    pub fn is_upstream(&self) -> bool {
        matches!(self, StreamError::Io(_) | StreamError::Upstream(_))
    }
}
