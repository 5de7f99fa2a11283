//! Result and error types for pagecheck.

use crate::report::AssertionResult;
use crate::scope::AggregateAssertionError;
use thiserror::Error;

/// Result type for pagecheck operations
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Errors that can occur while verifying
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A single verification failed under the immediate strategy
    #[error("{result}")]
    Assertion {
        /// The recorded failure
        result: Box<AssertionResult>,
    },

    /// One or more deferred failures raised when a scope was flushed
    #[error(transparent)]
    Aggregate(#[from] AggregateAssertionError),

    /// A string comparison mode cannot be derived from a registered comparer
    #[error("Cannot resolve string comparison from the comparer registered for {type_name}: unknown comparer")]
    UnsupportedComparer {
        /// Type the comparer was registered for
        type_name: &'static str,
    },

    /// The value source failed with a non-transient error
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Invalid configuration or verification arguments
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerifyError {
    /// Create an assertion error from a failure result
    #[must_use]
    pub fn assertion(result: AssertionResult) -> Self {
        Self::Assertion {
            result: Box::new(result),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The failure carried by an immediate assertion error, if any
    #[must_use]
    pub fn assertion_result(&self) -> Option<&AssertionResult> {
        match self {
            Self::Assertion { result } => Some(result),
            _ => None,
        }
    }
}

/// Errors raised by a value source while reading live state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    /// The target is temporarily unavailable (not rendered yet, stale, detached).
    /// Retried by the condition evaluator until the timeout elapses.
    #[error("unavailable: {message}")]
    Unavailable {
        /// Error message
        message: String,
    },

    /// Reading the value failed for a reason retrying cannot fix
    #[error("value retrieval failed: {message}")]
    Failed {
        /// Error message
        message: String,
    },
}

impl RetrievalError {
    /// Create a transient "temporarily unavailable" error
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a non-transient retrieval error
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Whether the evaluator should keep polling after this error
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
