//! Failure reporting.
//!
//! Turns a failed verification into an [`AssertionResult`] whose message
//! reads `<subject> should [not ]<predicate>. Expected: <e>. Actual: <a>.`
//! and which remembers the call site that issued the verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;

/// Severity of a recorded result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionStatus {
    /// A failed assertion or expectation
    Failed,
    /// A failed verification reported as a warning only
    Warning,
}

/// One recorded verification failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionResult {
    /// Failure or warning
    pub status: AssertionStatus,
    /// Full failure message
    pub message: String,
    /// Rendered expected value
    pub expected: String,
    /// Rendered actual value
    pub actual: String,
    /// Call site that issued the verification (`at file:line:column`)
    pub location: String,
    /// Captured backtrace, when `RUST_BACKTRACE` enables capture
    pub stack_trace: Option<String>,
    /// When the failure was recorded
    pub timestamp: DateTime<Utc>,
}

impl AssertionResult {
    /// Same result with a different status
    #[must_use]
    pub fn with_status(mut self, status: AssertionStatus) -> Self {
        self.status = status;
        self
    }

    /// Message followed by the call site
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut text = format!("{}\n{}", self.message, self.location);
        if let Some(stack) = &self.stack_trace {
            text.push('\n');
            text.push_str(stack);
        }
        text
    }
}

impl fmt::Display for AssertionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.message, self.location)
    }
}

/// Everything known about a failed verification
#[derive(Debug, Clone)]
pub struct FailureContext<'a> {
    /// Rendered subject, e.g. `"Count" text field`
    pub subject: &'a str,
    /// Non-negated predicate description, e.g. `equal 57`
    pub predicate: &'a str,
    /// Rendered expected value, without negation marker
    pub expected: &'a str,
    /// Rendered actual value
    pub actual: &'a str,
    /// Whether the verification was negated
    pub negated: bool,
}

/// Build the failure message
#[must_use]
pub fn failure_message(context: &FailureContext<'_>) -> String {
    let not = if context.negated { "not " } else { "" };
    format!(
        "{} should {not}{}. Expected: {}. Actual: {}.",
        context.subject,
        context.predicate,
        expected_text(context),
        context.actual
    )
}

fn expected_text(context: &FailureContext<'_>) -> String {
    if context.negated {
        format!("not {}", context.expected)
    } else {
        context.expected.to_string()
    }
}

/// Render a call site
#[must_use]
pub fn location_text(location: &Location<'_>) -> String {
    format!("at {}:{}:{}", location.file(), location.line(), location.column())
}

/// Build the failure result for a verification issued at `location`
#[must_use]
pub fn failure(context: &FailureContext<'_>, location: &Location<'_>) -> AssertionResult {
    let backtrace = Backtrace::capture();
    let stack_trace = match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    };

    AssertionResult {
        status: AssertionStatus::Failed,
        message: failure_message(context),
        expected: expected_text(context),
        actual: context.actual.to_string(),
        location: location_text(location),
        stack_trace,
        timestamp: Utc::now(),
    }
}
