//! Verification Provider
//!
//! The fluent builder every verification flows through. A chain starts on an
//! [`AssertionScope`] (or a page object [`Control`](crate::Control)), is
//! configured by consuming builder calls and ends with one verification
//! method from [`crate::verification`].
//!
//! `with_retry`, `at_once` and `within` all write the same timeout and
//! interval, so the last call wins; unset values fall back to the strategy
//! default.

use crate::comparer::{ComparerMap, EqualityComparer, OrderingComparer, StringComparison};
use crate::config::VerificationConfig;
use crate::describe::{Describable, NULL_MARKER};
use crate::evaluator::{evaluate_until, RetryOptions};
use crate::logging::LogSection;
use crate::report::{self, FailureContext};
use crate::result::{RetrievalError, VerifyResult};
use crate::scope::AssertionScope;
use crate::strategy::{AssertionStrategy, FromConfig, VerificationStrategy};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Live value source of a chain
pub type ValueSource<'s, T> = Box<dyn Fn() -> Result<T, RetrievalError> + 's>;

/// Configuration accumulated by a verification chain
#[derive(Debug, Clone)]
pub struct VerificationSettings {
    is_negation: bool,
    strategy: Arc<dyn VerificationStrategy>,
    timeout: Option<Duration>,
    retry_interval: Option<Duration>,
    comparers: ComparerMap,
}

impl VerificationSettings {
    /// Settings using `strategy` with no overrides
    #[must_use]
    pub fn new(strategy: Arc<dyn VerificationStrategy>) -> Self {
        Self {
            is_negation: false,
            strategy,
            timeout: None,
            retry_interval: None,
            comparers: ComparerMap::new(),
        }
    }

    /// Active strategy
    #[must_use]
    pub fn strategy(&self) -> &Arc<dyn VerificationStrategy> {
        &self.strategy
    }

    /// Registered comparers
    #[must_use]
    pub const fn comparers(&self) -> &ComparerMap {
        &self.comparers
    }
}

/// Fluent configuration shared by every verification chain.
///
/// Builder methods consume the provider and return the same concrete type,
/// so chains keep their static type across calls.
pub trait VerificationProvider: Sized {
    /// Accumulated settings
    fn settings(&self) -> &VerificationSettings;

    /// Mutable access to the accumulated settings
    fn settings_mut(&mut self) -> &mut VerificationSettings;

    /// Configuration strategies are built from
    fn config(&self) -> &VerificationConfig;

    /// Poll using the strategy's default timeout and interval
    #[must_use]
    fn with_retry(mut self) -> Self {
        let settings = self.settings_mut();
        settings.timeout = Some(settings.strategy.default_timeout());
        settings.retry_interval = Some(settings.strategy.default_retry_interval());
        self
    }

    /// Single attempt, no polling
    #[must_use]
    fn at_once(mut self) -> Self {
        self.settings_mut().timeout = Some(Duration::ZERO);
        self
    }

    /// Poll for `timeout`, every `retry_interval` when given
    #[must_use]
    fn within(mut self, timeout: Duration, retry_interval: Option<Duration>) -> Self {
        let settings = self.settings_mut();
        settings.timeout = Some(timeout);
        if retry_interval.is_some() {
            settings.retry_interval = retry_interval;
        }
        self
    }

    /// [`VerificationProvider::within`] in seconds; negative values clamp to zero
    #[must_use]
    fn within_secs(self, timeout_secs: f64, retry_interval_secs: Option<f64>) -> Self {
        self.within(secs(timeout_secs), retry_interval_secs.map(secs))
    }

    /// Pause between attempts
    #[must_use]
    fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.settings_mut().retry_interval = Some(retry_interval);
        self
    }

    /// Swap the strategy
    #[must_use]
    fn using_strategy(mut self, strategy: impl VerificationStrategy + 'static) -> Self {
        self.settings_mut().strategy = Arc::new(strategy);
        self
    }

    /// Swap the strategy for `S` built from the scope configuration
    #[must_use]
    fn using<S: VerificationStrategy + FromConfig + 'static>(self) -> Self {
        let strategy = S::from_config(self.config());
        self.using_strategy(strategy)
    }

    /// Register the equality comparer for `U`; replaces an earlier one
    #[must_use]
    fn using_comparer<U: ?Sized + 'static>(
        mut self,
        comparer: impl EqualityComparer<U> + 'static,
    ) -> Self {
        self.settings_mut()
            .comparers
            .insert_equality::<U>(Arc::new(comparer));
        self
    }

    /// Register the ordering comparer for `U`; replaces an earlier one
    #[must_use]
    fn using_ordering<U: ?Sized + 'static>(
        mut self,
        comparer: impl OrderingComparer<U> + 'static,
    ) -> Self {
        self.settings_mut()
            .comparers
            .insert_ordering::<U>(Arc::new(comparer));
        self
    }

    /// Compare every text type (`String`, `&str`, `Option<String>`, ...) under `mode`
    #[must_use]
    fn using_string_comparison(mut self, mode: StringComparison) -> Self {
        self.settings_mut().comparers.insert_string_comparison(mode);
        self
    }

    /// Compare text ignoring case
    #[must_use]
    fn ignoring_case(self) -> Self {
        self.using_string_comparison(StringComparison::OrdinalIgnoreCase)
    }

    /// Invert the next verification
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    fn not(mut self) -> Self {
        let settings = self.settings_mut();
        settings.is_negation = !settings.is_negation;
        self
    }

    /// Whether the verification is inverted
    fn is_negation(&self) -> bool {
        self.settings().is_negation
    }

    /// Equality comparer for `U`
    fn resolve_equality_comparer<U: PartialEq + 'static>(&self) -> Arc<dyn EqualityComparer<U>> {
        self.settings().comparers.resolve_equality::<U>()
    }

    /// Ordering comparer for `U`
    fn resolve_ordering_comparer<U: PartialOrd + 'static>(&self) -> Arc<dyn OrderingComparer<U>> {
        self.settings().comparers.resolve_ordering::<U>()
    }

    /// String comparison mode implied by the registered string comparer
    fn resolve_string_comparison(&self) -> VerifyResult<StringComparison> {
        self.settings().comparers.resolve_string_comparison()
    }

    /// Effective `(timeout, interval)` pair
    fn retry_options(&self) -> RetryOptions {
        let settings = self.settings();
        let timeout = settings
            .timeout
            .unwrap_or_else(|| settings.strategy.default_timeout());
        let interval = settings
            .retry_interval
            .unwrap_or_else(|| settings.strategy.default_retry_interval());
        RetryOptions::new(timeout, interval)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// A verification chain over a live value of type `T`.
///
/// `O` is handed back after a passing (or deferred) verification so the
/// caller can continue with its page object.
pub struct Verifier<'s, T, O = ()> {
    scope: &'s AssertionScope,
    subject: String,
    source: ValueSource<'s, T>,
    owner: O,
    settings: VerificationSettings,
}

impl<'s, T, O> Verifier<'s, T, O> {
    /// Start a chain using the immediate strategy from the scope configuration
    pub fn new(
        scope: &'s AssertionScope,
        subject: impl Into<String>,
        owner: O,
        source: impl Fn() -> Result<T, RetrievalError> + 's,
    ) -> Self {
        let strategy = AssertionStrategy::from_config(scope.config());
        Self {
            scope,
            subject: subject.into(),
            source: Box::new(source),
            owner,
            settings: VerificationSettings::new(Arc::new(strategy)),
        }
    }

    /// Rendered subject, e.g. `"Count" text field`
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Run one verification.
    ///
    /// `map` turns each raw read into the value `test` inspects; negation is
    /// applied to `test` before polling.
    #[track_caller]
    pub(crate) fn check_mapped<V, M, F>(
        self,
        predicate: &str,
        expected: &str,
        map: M,
        test: F,
    ) -> VerifyResult<O>
    where
        V: Describable,
        M: Fn(Result<T, RetrievalError>) -> Result<V, RetrievalError>,
        F: Fn(&V) -> bool,
    {
        let location = Location::caller();
        let options = self.retry_options();
        let Self {
            scope,
            subject,
            source,
            owner,
            settings,
        } = self;
        let negated = settings.is_negation;
        let not = if negated { "not " } else { "" };

        scope.note_verification();
        let section = LogSection::begin_at(Level::DEBUG, format!("Verify {subject} should {not}{predicate}"));
        tracing::trace!(
            target: "pagecheck",
            strategy = settings.strategy.name(),
            timeout_ms = options.timeout.as_millis() as u64,
            interval_ms = options.interval.as_millis() as u64,
            "resolved retry options"
        );

        let evaluation = evaluate_until(|| map(source()), |value| test(value) != negated, options)?;
        if evaluation.success {
            return Ok(owner);
        }

        let actual = match (&evaluation.last_error, &evaluation.last_value) {
            (Some(err), _) => err.to_string(),
            (None, Some(value)) => value.describe(),
            (None, None) => NULL_MARKER.to_string(),
        };
        section.line(&format!("failed after {} attempt(s)", evaluation.attempts));
        drop(section);

        let context = FailureContext {
            subject: &subject,
            predicate,
            expected,
            actual: &actual,
            negated,
        };
        settings
            .strategy
            .report_failure(report::failure(&context, location), scope)?;
        Ok(owner)
    }

    /// [`Verifier::check_mapped`] over the raw value
    #[track_caller]
    pub(crate) fn check<F>(self, predicate: &str, expected: &str, test: F) -> VerifyResult<O>
    where
        T: Describable,
        F: Fn(&T) -> bool,
    {
        self.check_mapped(predicate, expected, |read| read, test)
    }
}

impl<T, O> VerificationProvider for Verifier<'_, T, O> {
    fn settings(&self) -> &VerificationSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut VerificationSettings {
        &mut self.settings
    }

    fn config(&self) -> &VerificationConfig {
        self.scope.config()
    }
}

impl<T, O> fmt::Debug for Verifier<'_, T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("scope", &self.scope.name())
            .field("subject", &self.subject)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
