//! Verification strategies.
//!
//! A strategy supplies the default retry policy of a verification chain and
//! decides what happens to a failure: raise it now, record it in the scope
//! for a single aggregated report later, or record it as a warning.

use crate::config::VerificationConfig;
use crate::report::{AssertionResult, AssertionStatus};
use crate::result::{VerifyError, VerifyResult};
use crate::scope::AssertionScope;
use std::fmt::Debug;
use std::time::Duration;

/// Default retry policy and failure reporting of a verification chain
pub trait VerificationStrategy: Debug + Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Timeout used when the chain does not override it
    fn default_timeout(&self) -> Duration;

    /// Retry interval used when the chain does not override it
    fn default_retry_interval(&self) -> Duration;

    /// Report a failed verification.
    ///
    /// Returning `Err` aborts the chain; returning `Ok` lets it continue.
    fn report_failure(&self, result: AssertionResult, scope: &AssertionScope) -> VerifyResult<()>;
}

/// Strategies that can be built from the scope configuration
pub trait FromConfig {
    /// Build the strategy from library-wide defaults
    fn from_config(config: &VerificationConfig) -> Self;
}

/// Fail fast: a failure aborts the chain immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionStrategy {
    timeout: Duration,
    retry_interval: Duration,
}

impl Default for AssertionStrategy {
    fn default() -> Self {
        Self::from_config(&VerificationConfig::default())
    }
}

impl FromConfig for AssertionStrategy {
    fn from_config(config: &VerificationConfig) -> Self {
        Self {
            timeout: config.assertion_timeout(),
            retry_interval: config.retry_interval(),
        }
    }
}

impl VerificationStrategy for AssertionStrategy {
    fn name(&self) -> &'static str {
        "assertion"
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    fn default_retry_interval(&self) -> Duration {
        self.retry_interval
    }

    fn report_failure(&self, result: AssertionResult, _scope: &AssertionScope) -> VerifyResult<()> {
        tracing::error!(target: "pagecheck", location = %result.location, "{}", result.message);
        Err(VerifyError::assertion(result))
    }
}

/// Deferred: failures are collected by the scope and raised together on flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectationStrategy {
    timeout: Duration,
    retry_interval: Duration,
}

impl Default for ExpectationStrategy {
    fn default() -> Self {
        Self::from_config(&VerificationConfig::default())
    }
}

impl FromConfig for ExpectationStrategy {
    fn from_config(config: &VerificationConfig) -> Self {
        Self {
            timeout: config.verification_timeout(),
            retry_interval: config.retry_interval(),
        }
    }
}

impl VerificationStrategy for ExpectationStrategy {
    fn name(&self) -> &'static str {
        "expectation"
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    fn default_retry_interval(&self) -> Duration {
        self.retry_interval
    }

    fn report_failure(&self, result: AssertionResult, scope: &AssertionScope) -> VerifyResult<()> {
        tracing::error!(target: "pagecheck", location = %result.location, "{}", result.message);
        scope.record(result);
        Ok(())
    }
}

/// Deferred, non-failing: failures are kept as scope warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningStrategy {
    timeout: Duration,
    retry_interval: Duration,
}

impl Default for WarningStrategy {
    fn default() -> Self {
        Self::from_config(&VerificationConfig::default())
    }
}

impl FromConfig for WarningStrategy {
    fn from_config(config: &VerificationConfig) -> Self {
        Self {
            timeout: config.verification_timeout(),
            retry_interval: config.retry_interval(),
        }
    }
}

impl VerificationStrategy for WarningStrategy {
    fn name(&self) -> &'static str {
        "warning"
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    fn default_retry_interval(&self) -> Duration {
        self.retry_interval
    }

    fn report_failure(&self, result: AssertionResult, scope: &AssertionScope) -> VerifyResult<()> {
        tracing::warn!(target: "pagecheck", location = %result.location, "{}", result.message);
        scope.record_warning(result.with_status(AssertionStatus::Warning));
        Ok(())
    }
}
