//! Assertion Scopes
//!
//! Collect deferred verification failures across a logical test scope and
//! raise them as one aggregate error when the scope is flushed.
//!
//! ## Toyota Way Application:
//! - **Jidoka**: Collect all failures for comprehensive error reporting
//! - **Poka-Yoke**: Scopes are passed explicitly to every verification chain

use crate::config::VerificationConfig;
use crate::logging::LogSection;
use crate::provider::{VerificationProvider, Verifier};
use crate::report::AssertionResult;
use crate::result::{RetrievalError, VerifyError, VerifyResult};
use crate::strategy::ExpectationStrategy;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use thiserror::Error;
use tracing::Level;
use uuid::Uuid;

/// One error summarizing every deferred failure of a scope
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AggregateAssertionError {
    message: String,
    results: Vec<AssertionResult>,
}

impl AggregateAssertionError {
    /// Create the aggregate error; results keep their recording order
    #[must_use]
    pub fn new(results: Vec<AssertionResult>) -> Self {
        Self {
            message: aggregate_message(&results),
            results,
        }
    }

    /// Recorded failures in recording order
    #[must_use]
    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    /// Number of recorded failures
    #[must_use]
    pub fn count(&self) -> usize {
        self.results.len()
    }

    /// Full aggregate message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn aggregate_message(results: &[AssertionResult]) -> String {
    let noun = if results.len() == 1 { "failure" } else { "failures" };
    let mut message = format!("Failed with {} assertion {noun}:", results.len());

    for (index, result) in results.iter().enumerate() {
        let _ = write!(
            message,
            "\n\n{}) {}\n   {}",
            index + 1,
            result.message,
            result.location
        );
    }

    message
}

/// Counts of verifications made in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Verifications issued
    pub total: usize,
    /// Pending deferred failures
    pub failed: usize,
    /// Recorded warnings
    pub warnings: usize,
}

#[derive(Debug, Serialize)]
struct ScopeReport<'a> {
    id: String,
    name: &'a str,
    summary: AssertionSummary,
    failures: Vec<AssertionResult>,
    warnings: Vec<AssertionResult>,
}

/// Scope-local collector of verification failures.
///
/// Every verification chain receives the scope explicitly. Deferred
/// strategies record into it; [`AssertionScope::flush`] raises everything
/// recorded so far as one [`AggregateAssertionError`] and empties the scope.
///
/// ## Example
///
/// ```ignore
/// let scope = AssertionScope::new("login");
/// scope.expect_to("\"Title\"", || page.title()).equal("Sign In".to_string())?;
/// scope.expect_to("\"Remember me\"", || page.remember_me()).be_true()?;
/// scope.flush()?;
/// ```
#[derive(Debug)]
pub struct AssertionScope {
    id: Uuid,
    name: String,
    config: VerificationConfig,
    results: RefCell<Vec<AssertionResult>>,
    warnings: RefCell<Vec<AssertionResult>>,
    verification_count: Cell<usize>,
}

impl AssertionScope {
    /// Create a scope with default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, VerificationConfig::default())
    }

    /// Create a scope with the given configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: VerificationConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config,
            results: RefCell::new(Vec::new()),
            warnings: RefCell::new(Vec::new()),
            verification_count: Cell::new(0),
        }
    }

    /// Run `body` in a fresh scope and flush it afterwards.
    ///
    /// An immediate failure raised by `body` is folded into the aggregate
    /// when deferred failures are already pending.
    pub fn run<R>(
        name: impl Into<String>,
        body: impl FnOnce(&Self) -> VerifyResult<R>,
    ) -> VerifyResult<R> {
        Self::run_with_config(name, VerificationConfig::default(), body)
    }

    /// [`AssertionScope::run`] with an explicit configuration
    pub fn run_with_config<R>(
        name: impl Into<String>,
        config: VerificationConfig,
        body: impl FnOnce(&Self) -> VerifyResult<R>,
    ) -> VerifyResult<R> {
        let scope = Self::with_config(name, config);
        let _section = LogSection::begin(format!("Scope \"{}\"", scope.name));

        match body(&scope) {
            Ok(value) => {
                scope.flush()?;
                Ok(value)
            }
            Err(VerifyError::Assertion { result }) if scope.has_failures() => {
                let mut pending = scope.take_results();
                pending.push(*result);
                Err(AggregateAssertionError::new(pending).into())
            }
            Err(err) => {
                let discarded = scope.clear();
                if discarded > 0 {
                    tracing::warn!(
                        target: "pagecheck",
                        scope = %scope.name,
                        discarded,
                        "scope aborted with pending assertion failures"
                    );
                }
                Err(err)
            }
        }
    }

    /// Unique scope id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Scope name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration strategies are built from
    #[must_use]
    pub const fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Start an assertion chain: failures abort the chain immediately
    pub fn should<'s, T>(
        &'s self,
        subject: impl Into<String>,
        source: impl Fn() -> Result<T, RetrievalError> + 's,
    ) -> Verifier<'s, T> {
        Verifier::new(self, subject, (), source)
    }

    /// Start an expectation chain: failures are recorded until flush
    pub fn expect_to<'s, T>(
        &'s self,
        subject: impl Into<String>,
        source: impl Fn() -> Result<T, RetrievalError> + 's,
    ) -> Verifier<'s, T> {
        Verifier::new(self, subject, (), source).using::<ExpectationStrategy>()
    }

    /// Assertion chain over a fixed value
    pub fn should_value<'s, T: Clone + 's>(
        &'s self,
        subject: impl Into<String>,
        value: T,
    ) -> Verifier<'s, T> {
        self.should(subject, move || Ok(value.clone()))
    }

    /// Expectation chain over a fixed value
    pub fn expect_value<'s, T: Clone + 's>(
        &'s self,
        subject: impl Into<String>,
        value: T,
    ) -> Verifier<'s, T> {
        self.expect_to(subject, move || Ok(value.clone()))
    }

    /// Append a deferred failure
    pub fn record(&self, result: AssertionResult) {
        tracing::debug!(target: "pagecheck", scope = %self.name, "recorded assertion failure");
        self.results.borrow_mut().push(result);
    }

    /// Append a warning
    pub fn record_warning(&self, result: AssertionResult) {
        self.warnings.borrow_mut().push(result);
    }

    pub(crate) fn note_verification(&self) {
        self.verification_count.set(self.verification_count.get() + 1);
    }

    /// Pending failures in recording order
    #[must_use]
    pub fn results(&self) -> Vec<AssertionResult> {
        self.results.borrow().clone()
    }

    /// Recorded warnings in recording order
    #[must_use]
    pub fn warnings(&self) -> Vec<AssertionResult> {
        self.warnings.borrow().clone()
    }

    /// Number of pending failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results.borrow().len()
    }

    /// Whether any failure is pending
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Counts of verifications, pending failures and warnings
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.verification_count.get(),
            failed: self.failure_count(),
            warnings: self.warnings.borrow().len(),
        }
    }

    fn take_results(&self) -> Vec<AssertionResult> {
        std::mem::take(&mut *self.results.borrow_mut())
    }

    /// Raise all pending failures as one error and empty the scope.
    ///
    /// Succeeds without effect when nothing is pending.
    pub fn flush(&self) -> Result<(), AggregateAssertionError> {
        let pending = self.take_results();
        if pending.is_empty() {
            return Ok(());
        }

        let error = AggregateAssertionError::new(pending);
        let section = LogSection::begin_at(Level::ERROR, format!("Scope \"{}\" failed", self.name));
        section.lines(error.message().lines());
        Err(error)
    }

    /// Discard pending failures and warnings, returning how many failures were dropped
    pub fn clear(&self) -> usize {
        self.warnings.borrow_mut().clear();
        self.take_results().len()
    }

    /// Flush and close the scope
    pub fn finish(self) -> Result<(), AggregateAssertionError> {
        self.flush()
    }

    /// JSON report of the scope state
    pub fn report_json(&self) -> VerifyResult<String> {
        let report = ScopeReport {
            id: self.id.to_string(),
            name: &self.name,
            summary: self.summary(),
            failures: self.results(),
            warnings: self.warnings(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

impl Drop for AssertionScope {
    fn drop(&mut self) {
        let pending = self.results.get_mut().len();
        if pending > 0 && !std::thread::panicking() {
            tracing::warn!(
                target: "pagecheck",
                scope = %self.name,
                pending,
                "scope dropped without flushing assertion failures"
            );
        }
    }
}
