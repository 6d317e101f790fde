//! Error types for the bridge.
//!
//! Failures never unwind across a boundary call. The internal fallible
//! layer returns `Result` and propagates with `?`; the public boundary
//! methods on [`crate::Session`] resolve every error locally to a sentinel
//! (a `false`, an empty string, an empty sequence) and log it via
//! `tracing`. Callers are expected to check sentinels, not catch panics.
use thiserror::Error;

/// Result type alias using `BridgeError`.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error type for session-internal operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// An operation was invoked against a session that cannot service it:
    /// the engine handle has already been released by `end_session`, or
    /// the engine was never initialized.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// The engine refused an initialization or a variable assignment.
    #[error("engine rejected {what}: {detail}")]
    EngineRejected { what: String, detail: String },
}

impl BridgeError {
    /// Create an `InvalidState` error.
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create an `EngineRejected` error.
    pub fn engine_rejected<S: Into<String>, D: Into<String>>(what: S, detail: D) -> Self {
        Self::EngineRejected {
            what: what.into(),
            detail: detail.into(),
        }
    }
}
