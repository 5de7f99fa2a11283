//! Equality and ordering resolution per value type.
//!
//! A [`ComparerMap`] holds type-specific overrides keyed by [`TypeId`].
//! Verifications ask the map for the comparer of the value type they check
//! and fall back to `PartialEq` / `PartialOrd` when nothing is registered.

use crate::result::{VerifyError, VerifyResult};
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Decides whether two values of `T` are equal
pub trait EqualityComparer<T: ?Sized>: Send + Sync {
    /// Whether `left` and `right` are equal under this comparer
    fn equals(&self, left: &T, right: &T) -> bool;

    /// The string comparison mode this comparer implements, if any.
    ///
    /// Only meaningful for comparers registered for `String`.
    fn string_comparison(&self) -> Option<StringComparison> {
        None
    }
}

/// Orders two values of `T`
pub trait OrderingComparer<T: ?Sized>: Send + Sync {
    /// Compare `left` to `right`; `None` when they are unordered
    fn compare(&self, left: &T, right: &T) -> Option<Ordering>;
}

/// Structural equality through `PartialEq`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEquality;

impl<T: PartialEq + ?Sized> EqualityComparer<T> for DefaultEquality {
    fn equals(&self, left: &T, right: &T) -> bool {
        left == right
    }
}

/// Natural ordering through `PartialOrd`
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<T: PartialOrd + ?Sized> OrderingComparer<T> for NaturalOrder {
    fn compare(&self, left: &T, right: &T) -> Option<Ordering> {
        left.partial_cmp(right)
    }
}

/// Equality comparer backed by a closure
#[derive(Clone, Copy)]
pub struct FnEquality<F>(pub F);

impl<T: ?Sized, F> EqualityComparer<T> for FnEquality<F>
where
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    fn equals(&self, left: &T, right: &T) -> bool {
        (self.0)(left, right)
    }
}

impl<F> fmt::Debug for FnEquality<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEquality")
    }
}

/// Ordering comparer backed by a closure
#[derive(Clone, Copy)]
pub struct FnOrdering<F>(pub F);

impl<T: ?Sized, F> OrderingComparer<T> for FnOrdering<F>
where
    F: Fn(&T, &T) -> Option<Ordering> + Send + Sync,
{
    fn compare(&self, left: &T, right: &T) -> Option<Ordering> {
        (self.0)(left, right)
    }
}

impl<F> fmt::Debug for FnOrdering<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnOrdering")
    }
}

/// Supported string comparison modes.
///
/// Culture-sensitive modes carry no locale data: the case-sensitive ones
/// compare like [`StringComparison::Ordinal`] and the ignore-case ones fold
/// with full Unicode lowercasing. The ordinal ignore-case mode folds with
/// Unicode uppercasing, matching simple case-insensitive identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StringComparison {
    /// Exact code point comparison
    #[default]
    Ordinal,
    /// Code point comparison after uppercasing
    OrdinalIgnoreCase,
    /// Current culture comparison
    CurrentCulture,
    /// Current culture comparison ignoring case
    CurrentCultureIgnoreCase,
    /// Invariant culture comparison
    InvariantCulture,
    /// Invariant culture comparison ignoring case
    InvariantCultureIgnoreCase,
}

impl StringComparison {
    /// Whether the mode ignores letter case
    #[must_use]
    pub const fn ignores_case(self) -> bool {
        matches!(
            self,
            Self::OrdinalIgnoreCase | Self::CurrentCultureIgnoreCase | Self::InvariantCultureIgnoreCase
        )
    }

    fn fold(self, value: &str) -> String {
        match self {
            Self::Ordinal | Self::CurrentCulture | Self::InvariantCulture => value.to_string(),
            Self::OrdinalIgnoreCase => value.to_uppercase(),
            Self::CurrentCultureIgnoreCase | Self::InvariantCultureIgnoreCase => {
                value.to_lowercase()
            }
        }
    }

    /// Whether two strings are equal under this mode
    #[must_use]
    pub fn equals(self, left: &str, right: &str) -> bool {
        if self.ignores_case() {
            self.fold(left) == self.fold(right)
        } else {
            left == right
        }
    }

    /// Whether `haystack` contains `needle` under this mode
    #[must_use]
    pub fn contains(self, haystack: &str, needle: &str) -> bool {
        self.fold(haystack).contains(&self.fold(needle))
    }

    /// Whether `value` starts with `prefix` under this mode
    #[must_use]
    pub fn starts_with(self, value: &str, prefix: &str) -> bool {
        self.fold(value).starts_with(&self.fold(prefix))
    }

    /// Whether `value` ends with `suffix` under this mode
    #[must_use]
    pub fn ends_with(self, value: &str, suffix: &str) -> bool {
        self.fold(value).ends_with(&self.fold(suffix))
    }
}

impl EqualityComparer<String> for StringComparison {
    fn equals(&self, left: &String, right: &String) -> bool {
        StringComparison::equals(*self, left, right)
    }

    fn string_comparison(&self) -> Option<StringComparison> {
        Some(*self)
    }
}

impl EqualityComparer<str> for StringComparison {
    fn equals(&self, left: &str, right: &str) -> bool {
        StringComparison::equals(*self, left, right)
    }

    fn string_comparison(&self) -> Option<StringComparison> {
        Some(*self)
    }
}

impl<'a> EqualityComparer<&'a str> for StringComparison {
    fn equals(&self, left: &&'a str, right: &&'a str) -> bool {
        StringComparison::equals(*self, left, right)
    }
}

impl EqualityComparer<Option<String>> for StringComparison {
    fn equals(&self, left: &Option<String>, right: &Option<String>) -> bool {
        self.equals_optional(left.as_deref(), right.as_deref())
    }
}

impl<'a> EqualityComparer<Option<&'a str>> for StringComparison {
    fn equals(&self, left: &Option<&'a str>, right: &Option<&'a str>) -> bool {
        self.equals_optional(*left, *right)
    }
}

impl StringComparison {
    fn equals_optional(self, left: Option<&str>, right: Option<&str>) -> bool {
        match (left, right) {
            (Some(left), Some(right)) => self.equals(left, right),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Per-chain registry of type-specific equality and ordering overrides.
///
/// Keys are unique per value type; registering twice for the same type
/// replaces the earlier comparer.
#[derive(Clone, Default)]
pub struct ComparerMap {
    equality: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    ordering: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ComparerMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the equality comparer for `T`
    pub fn insert_equality<T: ?Sized + 'static>(&mut self, comparer: Arc<dyn EqualityComparer<T>>) {
        let _ = self
            .equality
            .insert(TypeId::of::<T>(), Arc::new(comparer));
    }

    /// Register `mode` as the equality comparer of every text type:
    /// `String`, `str`, `&str`, `Option<String>` and `Option<&str>`
    pub fn insert_string_comparison(&mut self, mode: StringComparison) {
        self.insert_equality::<String>(Arc::new(mode));
        self.insert_equality::<str>(Arc::new(mode));
        self.insert_equality::<&'static str>(Arc::new(mode));
        self.insert_equality::<Option<String>>(Arc::new(mode));
        self.insert_equality::<Option<&'static str>>(Arc::new(mode));
    }

    /// Register the ordering comparer for `T`
    pub fn insert_ordering<T: ?Sized + 'static>(&mut self, comparer: Arc<dyn OrderingComparer<T>>) {
        let _ = self
            .ordering
            .insert(TypeId::of::<T>(), Arc::new(comparer));
    }

    /// Whether an equality comparer is registered for `T`
    #[must_use]
    pub fn has_equality<T: ?Sized + 'static>(&self) -> bool {
        self.equality.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered comparers of both kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.equality.len() + self.ordering.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn registered_equality<T: ?Sized + 'static>(&self) -> Option<Arc<dyn EqualityComparer<T>>> {
        self.equality
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn EqualityComparer<T>>>())
            .cloned()
    }

    /// The comparer registered for `T`, or [`DefaultEquality`]
    #[must_use]
    pub fn resolve_equality<T: PartialEq + 'static>(&self) -> Arc<dyn EqualityComparer<T>> {
        self.registered_equality::<T>()
            .unwrap_or_else(|| Arc::new(DefaultEquality))
    }

    /// The ordering comparer registered for `T`, or [`NaturalOrder`]
    #[must_use]
    pub fn resolve_ordering<T: PartialOrd + 'static>(&self) -> Arc<dyn OrderingComparer<T>> {
        self.ordering
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn OrderingComparer<T>>>())
            .cloned()
            .unwrap_or_else(|| Arc::new(NaturalOrder))
    }

    /// The string comparison mode implied by the comparer registered for
    /// `String`; [`StringComparison::Ordinal`] when none is registered.
    pub fn resolve_string_comparison(&self) -> VerifyResult<StringComparison> {
        match self.registered_equality::<String>() {
            None => Ok(StringComparison::Ordinal),
            Some(comparer) => {
                comparer
                    .string_comparison()
                    .ok_or(VerifyError::UnsupportedComparer {
                        type_name: type_name::<String>(),
                    })
            }
        }
    }
}

impl fmt::Debug for ComparerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparerMap")
            .field("equality", &self.equality.len())
            .field("ordering", &self.ordering.len())
            .finish()
    }
}
