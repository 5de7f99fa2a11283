//! Verification methods.
//!
//! Every method builds a predicate, polls it through the chain's retry
//! options and reports a failure through the chain's strategy. On success
//! or a deferred failure the chain owner is returned.

use crate::comparer::StringComparison;
use crate::describe::Describable;
use crate::provider::{VerificationProvider, Verifier};
use crate::result::{RetrievalError, VerifyError, VerifyResult};
use regex::RegexBuilder;
use std::cmp::Ordering;

/// Whether a value source could be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Present,
    Absent,
}

impl Describable for Presence {
    fn describe(&self) -> String {
        match self {
            Self::Present => "present".to_string(),
            Self::Absent => "absent".to_string(),
        }
    }
}

fn case_suffix(comparison: StringComparison) -> &'static str {
    if comparison.ignores_case() {
        " ignoring case"
    } else {
        ""
    }
}

impl<T, O> Verifier<'_, T, O> {
    /// Verify the value source can be read.
    ///
    /// A transient retrieval error counts as absent; any other retrieval
    /// error propagates.
    #[track_caller]
    pub fn exist(self) -> VerifyResult<O> {
        self.check_mapped(
            "exist",
            "present",
            |read| match read {
                Ok(_) => Ok(Presence::Present),
                Err(err) if err.is_transient() => Ok(Presence::Absent),
                Err(err) => Err(err),
            },
            |presence| *presence == Presence::Present,
        )
    }
}

impl<T: Describable + 'static, O> Verifier<'_, T, O> {
    /// Verify an arbitrary predicate described by `description`
    #[track_caller]
    pub fn satisfy(
        self,
        description: &str,
        expected: &str,
        predicate: impl Fn(&T) -> bool,
    ) -> VerifyResult<O> {
        self.check(description, expected, predicate)
    }
}

impl<T: PartialEq + Describable + 'static, O> Verifier<'_, T, O> {
    /// Verify the value equals `expected` under the resolved comparer
    #[track_caller]
    pub fn equal(self, expected: T) -> VerifyResult<O> {
        let comparer = self.resolve_equality_comparer::<T>();
        let rendered = expected.describe();
        self.check(&format!("equal {rendered}"), &rendered, move |value| {
            comparer.equals(value, &expected)
        })
    }
}

impl<T: PartialOrd + Describable + 'static, O> Verifier<'_, T, O> {
    #[track_caller]
    fn compare_with(
        self,
        relation: &str,
        bound: T,
        accept: fn(Ordering) -> bool,
    ) -> VerifyResult<O> {
        let comparer = self.resolve_ordering_comparer::<T>();
        let expected = format!("{relation} {}", bound.describe());
        self.check(&format!("be {expected}"), &expected, move |value| {
            comparer.compare(value, &bound).is_some_and(accept)
        })
    }

    /// Verify the value is greater than `bound`
    #[track_caller]
    pub fn be_greater(self, bound: T) -> VerifyResult<O> {
        self.compare_with("greater than", bound, Ordering::is_gt)
    }

    /// Verify the value is greater than or equal to `bound`
    #[track_caller]
    pub fn be_greater_or_equal(self, bound: T) -> VerifyResult<O> {
        self.compare_with("greater than or equal to", bound, Ordering::is_ge)
    }

    /// Verify the value is less than `bound`
    #[track_caller]
    pub fn be_less(self, bound: T) -> VerifyResult<O> {
        self.compare_with("less than", bound, Ordering::is_lt)
    }

    /// Verify the value is less than or equal to `bound`
    #[track_caller]
    pub fn be_less_or_equal(self, bound: T) -> VerifyResult<O> {
        self.compare_with("less than or equal to", bound, Ordering::is_le)
    }

    /// Verify `min <= value <= max`
    #[track_caller]
    pub fn be_in_range(self, min: T, max: T) -> VerifyResult<O> {
        let comparer = self.resolve_ordering_comparer::<T>();
        let expected = format!(">= {} && <= {}", min.describe(), max.describe());
        let predicate = format!("be in range {} - {}", min.describe(), max.describe());
        self.check(&predicate, &expected, move |value| {
            comparer.compare(value, &min).is_some_and(Ordering::is_ge)
                && comparer.compare(value, &max).is_some_and(Ordering::is_le)
        })
    }
}

impl<O> Verifier<'_, bool, O> {
    /// Verify the value is `true`
    #[track_caller]
    pub fn be_true(self) -> VerifyResult<O> {
        self.check("be true", "true", |value| *value)
    }

    /// Verify the value is `false`
    #[track_caller]
    pub fn be_false(self) -> VerifyResult<O> {
        self.check("be false", "false", |value| !*value)
    }
}

impl<U: Describable, O> Verifier<'_, Option<U>, O> {
    /// Verify the value is `None`
    #[track_caller]
    pub fn be_null(self) -> VerifyResult<O> {
        self.check("be null", "null", Option::is_none)
    }
}

impl<O> Verifier<'_, String, O> {
    #[track_caller]
    fn check_text(
        self,
        relation: &str,
        expected: &str,
        fragment: &str,
        test: fn(StringComparison, &str, &str) -> bool,
    ) -> VerifyResult<O> {
        let comparison = self.resolve_string_comparison()?;
        let rendered = fragment.describe();
        let fragment = fragment.to_string();
        self.check(
            &format!("{relation} {rendered}{}", case_suffix(comparison)),
            &format!("string {expected} {rendered}"),
            move |value| test(comparison, value, &fragment),
        )
    }

    /// Verify the value contains `fragment`
    #[track_caller]
    pub fn contain(self, fragment: &str) -> VerifyResult<O> {
        self.check_text("contain", "containing", fragment, StringComparison::contains)
    }

    /// Verify the value starts with `prefix`
    #[track_caller]
    pub fn start_with(self, prefix: &str) -> VerifyResult<O> {
        self.check_text("start with", "starting with", prefix, StringComparison::starts_with)
    }

    /// Verify the value ends with `suffix`
    #[track_caller]
    pub fn end_with(self, suffix: &str) -> VerifyResult<O> {
        self.check_text("end with", "ending with", suffix, StringComparison::ends_with)
    }

    /// Verify the value matches the regular expression `pattern`
    #[track_caller]
    pub fn match_regex(self, pattern: &str) -> VerifyResult<O> {
        let comparison = self.resolve_string_comparison()?;
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(comparison.ignores_case())
            .build()
            .map_err(|err| VerifyError::config(format!("invalid pattern {pattern:?}: {err}")))?;
        let rendered = pattern.describe();
        self.check(
            &format!("match pattern {rendered}{}", case_suffix(comparison)),
            &format!("string matching {rendered}"),
            move |value| regex.is_match(value),
        )
    }

    /// Verify the value is the empty string
    #[track_caller]
    pub fn be_empty(self) -> VerifyResult<O> {
        self.check("be empty", "\"\"", String::is_empty)
    }
}

impl<U: Describable, O> Verifier<'_, Vec<U>, O> {
    /// Verify the collection holds exactly `count` items
    #[track_caller]
    pub fn have_count(self, count: usize) -> VerifyResult<O> {
        self.check_mapped(
            &format!("have count {count}"),
            &count.to_string(),
            |read: Result<Vec<U>, RetrievalError>| read.map(|items| items.len()),
            move |len| *len == count,
        )
    }

    /// Verify the collection has no items
    #[track_caller]
    pub fn be_empty(self) -> VerifyResult<O> {
        self.check("be empty", "[]", Vec::is_empty)
    }
}

impl<U: PartialEq + Describable + 'static, O> Verifier<'_, Vec<U>, O> {
    /// Verify the collection holds an item equal to `item`
    #[track_caller]
    pub fn contain_item(self, item: U) -> VerifyResult<O> {
        let comparer = self.resolve_equality_comparer::<U>();
        let rendered = item.describe();
        self.check(
            &format!("contain {rendered}"),
            &format!("collection containing {rendered}"),
            move |items| items.iter().any(|value| comparer.equals(value, &item)),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::scope::AssertionScope;
    use crate::strategy::ExpectationStrategy;
    use std::cell::Cell;
    use std::time::Duration;

    fn message(err: &VerifyError) -> &str {
        &err.assertion_result().unwrap().message
    }

    mod equality {
        use super::*;

        #[test]
        fn test_equal_passes() {
            let scope = AssertionScope::new("equal");
            scope.should_value("\"Count\" field", 57).equal(57).unwrap();
        }

        #[test]
        fn test_equal_failure_message() {
            let scope = AssertionScope::new("equal");
            let err = scope.should_value("\"Count\" field", 59).equal(57).unwrap_err();
            assert_eq!(
                message(&err),
                "\"Count\" field should equal 57. Expected: 57. Actual: 59."
            );
        }

        #[test]
        fn test_not_equal() {
            let scope = AssertionScope::new("not equal");
            scope.should_value("\"Count\" field", 59).not().equal(57).unwrap();
            let err = scope.should_value("\"Count\" field", 57).not().equal(57).unwrap_err();
            assert!(message(&err).contains("should not equal 57. Expected: not 57."));
        }

        #[test]
        fn test_ignoring_case_string_equality() {
            let scope = AssertionScope::new("case");
            scope
                .should_value("\"Name\" field", "Alice".to_string())
                .ignoring_case()
                .equal("ALICE".to_string())
                .unwrap();
            assert!(scope
                .should_value("\"Name\" field", "Alice".to_string())
                .equal("ALICE".to_string())
                .is_err());
        }

        #[test]
        fn test_ignoring_case_str_equality() {
            let scope = AssertionScope::new("case");
            scope
                .should_value("\"Name\" field", "Alice")
                .ignoring_case()
                .equal("ALICE")
                .unwrap();
            assert!(scope.should_value("\"Name\" field", "Alice").equal("ALICE").is_err());
        }

        #[test]
        fn test_ignoring_case_nullable_text_equality() {
            let scope = AssertionScope::new("case");
            scope
                .should_value("\"Name\" field", Some("Alice".to_string()))
                .ignoring_case()
                .equal(Some("ALICE".to_string()))
                .unwrap();
            scope
                .should_value("\"Name\" field", None::<String>)
                .ignoring_case()
                .equal(None)
                .unwrap();
            assert!(scope
                .should_value("\"Name\" field", Some("Alice".to_string()))
                .ignoring_case()
                .equal(None)
                .is_err());
            assert!(scope
                .should_value("\"Name\" field", Some("Alice".to_string()))
                .equal(Some("ALICE".to_string()))
                .is_err());
        }

        #[test]
        fn test_satisfy() {
            let scope = AssertionScope::new("satisfy");
            scope
                .should_value("\"Count\" field", 12)
                .satisfy("be even", "even number", |v| v % 2 == 0)
                .unwrap();
            let err = scope
                .should_value("\"Count\" field", 13)
                .satisfy("be even", "even number", |v| v % 2 == 0)
                .unwrap_err();
            assert!(message(&err).contains("should be even. Expected: even number. Actual: 13."));
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn test_bounds() {
            let scope = AssertionScope::new("ordering");
            scope.should_value("\"Age\" field", 30).be_greater(18).unwrap();
            scope.should_value("\"Age\" field", 18).be_greater_or_equal(18).unwrap();
            scope.should_value("\"Age\" field", 5).be_less(18).unwrap();
            scope.should_value("\"Age\" field", 18).be_less_or_equal(18).unwrap();
            assert!(scope.should_value("\"Age\" field", 18).be_greater(18).is_err());
        }

        #[test]
        fn test_in_range() {
            let scope = AssertionScope::new("range");
            scope.should_value("\"Age\" field", 1).be_in_range(1, 5).unwrap();
            scope.should_value("\"Age\" field", 5).be_in_range(1, 5).unwrap();
            let err = scope.should_value("\"Age\" field", 6).be_in_range(1, 5).unwrap_err();
            assert!(message(&err).contains("should be in range 1 - 5. Expected: >= 1 && <= 5. Actual: 6."));
        }

        #[test]
        fn test_nan_is_never_ordered() {
            let scope = AssertionScope::new("nan");
            assert!(scope.should_value("\"Ratio\" field", f64::NAN).be_greater(0.0).is_err());
            scope.should_value("\"Ratio\" field", f64::NAN).not().be_less(0.0).unwrap();
        }
    }

    mod booleans {
        use super::*;

        #[test]
        fn test_not_be_true_succeeds_on_false() {
            let scope = AssertionScope::new("not true");
            scope.should_value("\"IsTrue\" checkbox", false).not().be_true().unwrap();
        }

        #[test]
        fn test_not_be_true_fails_on_true() {
            let scope = AssertionScope::new("not true");
            let err = scope
                .should_value("\"IsTrue\" checkbox", true)
                .not()
                .be_true()
                .unwrap_err();
            assert_eq!(
                message(&err),
                "\"IsTrue\" checkbox should not be true. Expected: not true. Actual: true."
            );
        }

        #[test]
        fn test_be_false() {
            let scope = AssertionScope::new("false");
            scope.should_value("\"IsTrue\" checkbox", false).be_false().unwrap();
        }
    }

    mod options {
        use super::*;

        #[test]
        fn test_be_null() {
            let scope = AssertionScope::new("null");
            scope.should_value("\"Count\" field", None::<i32>).be_null().unwrap();
            let err = scope.should_value("\"Count\" field", Some(3)).be_null().unwrap_err();
            assert!(message(&err).ends_with("Expected: null. Actual: 3."));
        }
    }

    mod strings {
        use super::*;

        #[test]
        fn test_contain_start_end() {
            let scope = AssertionScope::new("text");
            let title = || "Sign In Page".to_string();
            scope.should_value("\"Title\"", title()).contain("In").unwrap();
            scope.should_value("\"Title\"", title()).start_with("Sign").unwrap();
            scope.should_value("\"Title\"", title()).end_with("Page").unwrap();
            assert!(scope.should_value("\"Title\"", title()).contain("out").is_err());
        }

        #[test]
        fn test_contain_ignoring_case_message() {
            let scope = AssertionScope::new("text");
            scope
                .should_value("\"Title\"", "Sign In".to_string())
                .ignoring_case()
                .contain("SIGN")
                .unwrap();
            let err = scope
                .should_value("\"Title\"", "Sign In".to_string())
                .ignoring_case()
                .contain("out")
                .unwrap_err();
            assert!(message(&err).contains(
                "should contain \"out\" ignoring case. Expected: string containing \"out\". Actual: \"Sign In\"."
            ));
        }

        #[test]
        fn test_unsupported_comparer_is_fatal() {
            let scope = AssertionScope::new("comparer");
            let err = scope
                .should_value("\"Title\"", "Sign In".to_string())
                .using_comparer::<String>(crate::comparer::FnEquality(|a: &String, b: &String| a == b))
                .start_with("Sign")
                .unwrap_err();
            assert!(matches!(err, VerifyError::UnsupportedComparer { .. }));
        }

        #[test]
        fn test_match_regex() {
            let scope = AssertionScope::new("regex");
            scope
                .should_value("\"Code\"", "AB-123".to_string())
                .match_regex(r"^[A-Z]{2}-\d+$")
                .unwrap();
            scope
                .should_value("\"Code\"", "ab-123".to_string())
                .ignoring_case()
                .match_regex(r"^[A-Z]{2}-\d+$")
                .unwrap();
            let err = scope
                .should_value("\"Code\"", "AB-123".to_string())
                .match_regex("(")
                .unwrap_err();
            assert!(matches!(err, VerifyError::Config { .. }));
        }

        #[test]
        fn test_be_empty() {
            let scope = AssertionScope::new("empty");
            scope.should_value("\"Notes\"", String::new()).be_empty().unwrap();
            assert!(scope.should_value("\"Notes\"", "x".to_string()).be_empty().is_err());
        }
    }

    mod collections {
        use super::*;

        #[test]
        fn test_have_count_reports_length() {
            let scope = AssertionScope::new("count");
            scope.should_value("\"Rows\"", vec![1, 2, 3]).have_count(3).unwrap();
            let err = scope.should_value("\"Rows\"", vec![1, 2]).have_count(3).unwrap_err();
            assert!(message(&err).ends_with("should have count 3. Expected: 3. Actual: 2."));
        }

        #[test]
        fn test_contain_item_and_empty() {
            let scope = AssertionScope::new("items");
            scope
                .should_value("\"Tags\"", vec!["a".to_string(), "b".to_string()])
                .contain_item("b".to_string())
                .unwrap();
            scope.should_value("\"Tags\"", Vec::<i32>::new()).be_empty().unwrap();
            let err = scope.should_value("\"Tags\"", vec![1]).be_empty().unwrap_err();
            assert!(message(&err).ends_with("Expected: []. Actual: [1]."));
        }
    }

    mod existence {
        use super::*;

        #[test]
        fn test_exist() {
            let scope = AssertionScope::new("exist");
            scope.should("\"Save\" button", || Ok(())).exist().unwrap();
            let err = scope
                .should("\"Save\" button", || Err::<(), _>(RetrievalError::unavailable("not rendered")))
                .exist()
                .unwrap_err();
            assert!(message(&err).ends_with("should exist. Expected: present. Actual: absent."));
        }

        #[test]
        fn test_not_exist() {
            let scope = AssertionScope::new("exist");
            scope
                .should("\"Spinner\"", || Err::<(), _>(RetrievalError::unavailable("gone")))
                .not()
                .exist()
                .unwrap();
        }

        #[test]
        fn test_fatal_error_propagates() {
            let scope = AssertionScope::new("exist");
            let err = scope
                .should("\"Save\" button", || Err::<(), _>(RetrievalError::failed("session closed")))
                .exist()
                .unwrap_err();
            assert!(matches!(err, VerifyError::Retrieval(_)));
        }
    }

    mod retrying {
        use super::*;

        #[test]
        fn test_transient_error_surfaces_as_actual() {
            let scope = AssertionScope::new("transient");
            let err = scope
                .should("\"Count\" field", || Err::<i32, _>(RetrievalError::unavailable("detached")))
                .equal(1)
                .unwrap_err();
            assert!(message(&err).ends_with("Actual: unavailable: detached."));
        }

        #[test]
        fn test_deferred_failure_returns_owner_and_records() {
            let scope = AssertionScope::new("deferred");
            let calls = Cell::new(0);
            scope
                .should("\"Count\" field", || {
                    calls.set(calls.get() + 1);
                    Ok(1)
                })
                .using::<ExpectationStrategy>()
                .within(Duration::from_millis(30), Some(Duration::from_millis(10)))
                .equal(2)
                .unwrap();

            assert!(calls.get() > 1);
            assert_eq!(scope.failure_count(), 1);
            assert_eq!(scope.summary().total, 1);
            assert!(scope.flush().is_err());
        }
    }
}
