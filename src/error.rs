//! Error taxonomy for the assessment pipeline.
//!
//! Only [`AssessError`] ever leaves the engine. Every [`ScoutError`] is caught
//! at the dispatcher boundary and turned into the failing source's outcome.

use thiserror::Error;

/// Message used for the per-source timeout; surfaced verbatim in outcomes.
pub const TIMED_OUT_MSG: &str = "Analysis timed out";

/// Failure of a single scouting task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoutError {
    #[error("Analysis timed out")]
    TimedOut,
    /// The scouting capability could not be started (transport, status code, auth).
    #[error("{0}")]
    Launch(String),
    /// Reading the response stream failed after it was opened.
    #[error("stream read failed: {0}")]
    Stream(String),
    /// The stream ended without any frame carrying `final_result`.
    #[error("agent finished without a final result")]
    NoPayload,
    #[error("unrecognized final_result payload: {0}")]
    MalformedPayload(String),
    #[error("scout cancelled")]
    Cancelled,
    #[error("scout task aborted: {0}")]
    TaskPanicked(String),
}

impl ScoutError {
    pub fn launch(e: impl std::fmt::Display) -> Self {
        Self::Launch(e.to_string())
    }

    pub fn stream(e: impl std::fmt::Display) -> Self {
        Self::Stream(e.to_string())
    }
}

/// Errors allowed to abort a whole assessment request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssessError {
    /// Required input absent; nothing was dispatched.
    #[error("{0}")]
    Validation(String),
    /// Anything escaping per-source containment.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_stable() {
        assert_eq!(ScoutError::TimedOut.to_string(), TIMED_OUT_MSG);
    }

    #[test]
    fn launch_keeps_underlying_message() {
        let e = ScoutError::launch("connection refused");
        assert_eq!(e.to_string(), "connection refused");
    }
}
