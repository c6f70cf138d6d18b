//! Error types for the biblion access layer.
//!
//! All failures surfaced by this workspace are represented by the [`Error`]
//! enum. The variants fall into three tiers that callers are expected to
//! distinguish:
//! - **Usage errors**: contract violations at the call site (re-executing a
//!   command, out-of-range index). Fatal, never retried.
//! - **Remote semantic errors**: the server meaningfully rejected the
//!   request (conflict, stale version, bad payload).
//! - **Local/environmental errors**: we could not find out what the server
//!   thinks (timeout, cancellation, transport failure).
//!
//! [`Error::ConcurrentModification`] is a distinct named condition raised
//! when a paginated result set detects server-side drift; it instructs the
//! caller to `reload()`.
//!
//! Errors are `Clone` so that pending-result handles can memoize a failed
//! outcome and hand it back on repeated waits.

use std::time::Duration;

/// Result type alias for biblion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the biblion access layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // ==================== Usage ====================
    /// A command instance was submitted a second time.
    #[error("this command has already been executed")]
    AlreadyExecuted,

    /// A command was submitted without required parameters.
    #[error("command is not ready to execute: {reason}")]
    NotReady {
        /// What is missing or malformed.
        reason: String,
    },

    /// Index outside the bounds of a result set.
    #[error("index {index} out of bounds for result set of size {size}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The total size of the result set.
        size: usize,
    },

    /// The executor no longer accepts submissions.
    #[error("the command executor has been shut down")]
    ExecutorShutDown,

    // ==================== Remote ====================
    /// The server rejected the request with a meaningful status code.
    #[error("remote request rejected ({status}): {reason}")]
    Rest {
        /// HTTP status code returned by the server.
        status: u16,
        /// Human-readable description of the rejection.
        reason: String,
        /// Identifiers of the records the request was acting on.
        keys: Vec<String>,
    },

    /// The server response could not be interpreted.
    #[error("unexpected response: {reason}")]
    UnexpectedResponse {
        /// Why the response could not be decoded.
        reason: String,
    },

    /// A paginated result set no longer matches the server state.
    #[error(
        "the underlying collection has changed since this result set was \
         created; call reload() to obtain a fresh view"
    )]
    ConcurrentModification,

    // ==================== Local ====================
    /// A bounded wait on a pending result expired.
    #[error("timed out after {waited:?}")]
    Timeout {
        /// How long the caller waited before giving up.
        waited: Duration,
    },

    /// The pending result was cancelled before completion.
    #[error("the pending result was cancelled")]
    Cancelled,

    /// Transport failure or other local condition.
    #[error("environment failure: {message}")]
    Environment {
        /// Description of the failure, including the causal chain.
        message: String,
    },
}

impl Error {
    /// Wrap a local cause with call-site context.
    pub fn environment(message: impl Into<String>) -> Self {
        Error::Environment {
            message: message.into(),
        }
    }

    /// Remote semantic rejection for a set of record keys.
    pub fn rest(status: u16, reason: impl Into<String>, keys: Vec<String>) -> Self {
        Error::Rest {
            status,
            reason: reason.into(),
            keys,
        }
    }

    /// Undecodable or contract-violating server response.
    pub fn unexpected(reason: impl Into<String>) -> Self {
        Error::UnexpectedResponse {
            reason: reason.into(),
        }
    }

    /// True for programmer/contract violations surfaced at the call site.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::AlreadyExecuted
                | Error::NotReady { .. }
                | Error::IndexOutOfBounds { .. }
                | Error::ExecutorShutDown
        )
    }

    /// True when the server meaningfully rejected the request.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Rest { .. } | Error::UnexpectedResponse { .. } | Error::ConcurrentModification
        )
    }

    /// True when the outcome of the request could not be determined.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Cancelled | Error::Environment { .. }
        )
    }
}
