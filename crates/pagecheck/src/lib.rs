//! Pagecheck: Retrying Verification Engine for Page-Object UI Tests
//!
//! Page objects expose live values read from a UI that renders
//! asynchronously. Pagecheck verifies those values through fluent chains
//! that poll until a predicate holds or a timeout elapses, and either fail
//! at once or collect failures in a scope for one aggregated report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   PAGECHECK Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Verifier   │    │ Condition  │    │ Strategy   │            │
//! │   │ (chain)    │───►│ Evaluator  │───►│ report     │            │
//! │   │            │    │ (polling)  │    │            │            │
//! │   └─────┬──────┘    └────────────┘    └─────┬──────┘            │
//! │         │ comparers                         │ deferred          │
//! │   ┌─────▼──────┐                      ┌─────▼──────┐            │
//! │   │ Comparer   │                      │ Assertion  │            │
//! │   │ Map        │                      │ Scope      │            │
//! │   └────────────┘                      └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pagecheck::prelude::*;
//!
//! let scope = AssertionScope::new("counter");
//! scope.should_value("\"Count\" field", 57).equal(57)?;
//! scope.expect_value("\"Title\"", "Sign In".to_string()).at_once().contain("Sign")?;
//! scope.flush()?;
//! # Ok::<(), VerifyError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

extern crate self as pagecheck;

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod comparer;
#[allow(clippy::missing_errors_doc)]
pub mod config;
pub mod describe;
#[allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]
pub mod evaluator;
pub mod logging;
#[allow(clippy::missing_errors_doc)]
pub mod page_object;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation
)]
pub mod provider;
pub mod report;
mod result;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod scope;
#[allow(clippy::missing_errors_doc)]
pub mod strategy;
#[allow(clippy::missing_errors_doc)]
pub mod verification;

pub use comparer::{
    ComparerMap, DefaultEquality, EqualityComparer, FnEquality, FnOrdering, NaturalOrder,
    OrderingComparer, StringComparison,
};
pub use config::VerificationConfig;
pub use describe::{describe_sequence, describe_struct, Describable, Structural, NULL_MARKER};
pub use evaluator::{evaluate_until, Evaluation, RetryOptions, MIN_RETRY_INTERVAL};
pub use logging::LogSection;
pub use page_object::{Control, PageObject};
pub use provider::{ValueSource, VerificationProvider, VerificationSettings, Verifier};
pub use report::{AssertionResult, AssertionStatus, FailureContext};
pub use result::{RetrievalError, VerifyError, VerifyResult};
pub use scope::{AggregateAssertionError, AssertionScope, AssertionSummary};
pub use strategy::{
    AssertionStrategy, ExpectationStrategy, FromConfig, VerificationStrategy, WarningStrategy,
};

// Derive macro shares its name with the trait, like serde's `Serialize`
#[cfg(feature = "derive")]
pub use pagecheck_derive::Describable;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::comparer::*;
    pub use super::config::VerificationConfig;
    pub use super::describe::{Describable, Structural};
    pub use super::evaluator::{evaluate_until, RetryOptions};
    pub use super::page_object::*;
    pub use super::provider::{VerificationProvider, Verifier};
    pub use super::report::{AssertionResult, AssertionStatus};
    pub use super::result::*;
    pub use super::scope::*;
    pub use super::strategy::*;
    #[cfg(feature = "derive")]
    pub use pagecheck_derive::Describable;
}
