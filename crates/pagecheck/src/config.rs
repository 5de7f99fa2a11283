//! Library-wide verification defaults.
//!
//! Strategies read their default timeout and retry interval from a
//! [`VerificationConfig`] owned by the assertion scope. Values can be loaded
//! from YAML and overlaid from environment variables.

use crate::result::{VerifyError, VerifyResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default timeout of the immediate assertion strategy (single attempt)
pub const DEFAULT_ASSERTION_TIMEOUT_MS: u64 = 0;

/// Default timeout of the deferred strategies (10 seconds)
pub const DEFAULT_VERIFICATION_TIMEOUT_MS: u64 = 10_000;

/// Default interval between attempts (500ms)
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;

/// Environment variable overriding the assertion timeout
pub const ENV_ASSERTION_TIMEOUT: &str = "PAGECHECK_ASSERTION_TIMEOUT_MS";

/// Environment variable overriding the deferred verification timeout
pub const ENV_VERIFICATION_TIMEOUT: &str = "PAGECHECK_VERIFICATION_TIMEOUT_MS";

/// Environment variable overriding the retry interval
pub const ENV_RETRY_INTERVAL: &str = "PAGECHECK_VERIFICATION_RETRY_INTERVAL_MS";

/// Default timeouts and retry cadence for verification strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Timeout used by the immediate assertion strategy, in milliseconds
    pub assertion_timeout_ms: u64,
    /// Timeout used by the expectation and warning strategies, in milliseconds
    pub verification_timeout_ms: u64,
    /// Interval between attempts, in milliseconds
    pub verification_retry_interval_ms: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            assertion_timeout_ms: DEFAULT_ASSERTION_TIMEOUT_MS,
            verification_timeout_ms: DEFAULT_VERIFICATION_TIMEOUT_MS,
            verification_retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

impl VerificationConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the assertion timeout
    #[must_use]
    pub const fn with_assertion_timeout(mut self, timeout: Duration) -> Self {
        self.assertion_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the deferred verification timeout
    #[must_use]
    pub const fn with_verification_timeout(mut self, timeout: Duration) -> Self {
        self.verification_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the retry interval
    #[must_use]
    pub const fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.verification_retry_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Assertion timeout as Duration
    #[must_use]
    pub const fn assertion_timeout(&self) -> Duration {
        Duration::from_millis(self.assertion_timeout_ms)
    }

    /// Deferred verification timeout as Duration
    #[must_use]
    pub const fn verification_timeout(&self) -> Duration {
        Duration::from_millis(self.verification_timeout_ms)
    }

    /// Retry interval as Duration
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.verification_retry_interval_ms)
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> VerifyResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> VerifyResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Overlay values from the process environment
    pub fn with_env_overrides(self) -> VerifyResult<Self> {
        self.with_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from a variable lookup function
    pub fn with_env_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> VerifyResult<Self> {
        if let Some(ms) = parse_ms(&lookup, ENV_ASSERTION_TIMEOUT)? {
            self.assertion_timeout_ms = ms;
        }
        if let Some(ms) = parse_ms(&lookup, ENV_VERIFICATION_TIMEOUT)? {
            self.verification_timeout_ms = ms;
        }
        if let Some(ms) = parse_ms(&lookup, ENV_RETRY_INTERVAL)? {
            self.verification_retry_interval_ms = ms;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject configurations that would poll without pausing
    pub fn validate(&self) -> VerifyResult<()> {
        let polls = self.assertion_timeout_ms > 0 || self.verification_timeout_ms > 0;
        if polls && self.verification_retry_interval_ms == 0 {
            return Err(VerifyError::config(
                "verification_retry_interval_ms must be greater than 0 when a timeout is set",
            ));
        }
        Ok(())
    }
}

fn parse_ms(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> VerifyResult<Option<u64>> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| VerifyError::config(format!("{key}={raw:?} is not a millisecond count: {e}")))
        })
        .transpose()
}
