//! Page Object Model Support
//!
//! Page objects expose named controls: live values read from the page under
//! test. A control starts a verification chain whose owner is the page, so
//! a passing check hands the page back for the next one.
//!
//! ## Toyota Way Application:
//! - **Poka-Yoke**: Controls are typed, so verifications only accept matching values
//! - **Muda**: Reduce duplication by encapsulating page logic
//! - **Genchi Genbutsu**: Page objects reflect actual page structure

use crate::provider::{VerificationProvider, Verifier};
use crate::result::RetrievalError;
use crate::scope::AssertionScope;
use crate::strategy::ExpectationStrategy;
use std::fmt;

/// A page or component of the UI under test.
///
/// # Example
///
/// ```ignore
/// struct SignInPage {
///     driver: Driver,
/// }
///
/// impl PageObject for SignInPage {
///     fn component_name(&self) -> &str {
///         "Sign In"
///     }
/// }
///
/// impl SignInPage {
///     fn email(&self) -> Control<'_, Self, String> {
///         Control::new(self, "Email", |page| page.driver.read_text("#email"))
///             .with_kind("text input")
///     }
/// }
///
/// page.email().should(&scope).equal("admin@example.com".into())?
///     .remember_me().should(&scope).be_true()?;
/// ```
pub trait PageObject {
    /// Human-readable component name
    fn component_name(&self) -> &str;

    /// Component kind used in messages
    fn component_kind(&self) -> &str {
        "page"
    }

    /// Name and kind, e.g. `"Sign In" page`
    fn full_name(&self) -> String {
        format!("\"{}\" {}", self.component_name(), self.component_kind())
    }
}

type Reader<'p, P, T> = Box<dyn Fn(&P) -> Result<T, RetrievalError> + 'p>;

/// A named live value read from a page object
pub struct Control<'p, P, T> {
    page: &'p P,
    name: String,
    kind: String,
    read: Reader<'p, P, T>,
}

impl<'p, P: PageObject, T> Control<'p, P, T> {
    /// Create a control of kind `control`
    pub fn new(
        page: &'p P,
        name: impl Into<String>,
        read: impl Fn(&P) -> Result<T, RetrievalError> + 'p,
    ) -> Self {
        Self {
            page,
            name: name.into(),
            kind: "control".to_string(),
            read: Box::new(read),
        }
    }

    /// Set the kind used in messages (`text input`, `checkbox`, ...)
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Control name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subject text, e.g. `"Email" text input`
    #[must_use]
    pub fn subject(&self) -> String {
        format!("\"{}\" {}", self.name, self.kind)
    }

    /// Read the current value once
    pub fn value(&self) -> Result<T, RetrievalError> {
        (self.read)(self.page)
    }

    /// Page the control belongs to
    #[must_use]
    pub const fn page(&self) -> &'p P {
        self.page
    }

    /// Assertion chain: a failure aborts immediately
    pub fn should<'s>(self, scope: &'s AssertionScope) -> Verifier<'s, T, &'p P>
    where
        'p: 's,
        T: 's,
    {
        let subject = self.subject();
        let Self { page, read, .. } = self;
        Verifier::new(scope, subject, page, move || read(page))
    }

    /// Expectation chain: failures are recorded in `scope` until flush
    pub fn expect_to<'s>(self, scope: &'s AssertionScope) -> Verifier<'s, T, &'p P>
    where
        'p: 's,
        T: 's,
    {
        self.should(scope).using::<ExpectationStrategy>()
    }
}

impl<P: PageObject, T> fmt::Debug for Control<'_, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("page", &self.page.full_name())
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
