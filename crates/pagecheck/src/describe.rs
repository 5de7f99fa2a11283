//! Readable rendering of expected and actual values for failure messages.
//!
//! Types opt in through [`Describable`]. Primitives render naturally,
//! strings are quoted, `None` renders as [`NULL_MARKER`] and sequences render
//! as bracketed lists. Types that only implement `Debug` can be wrapped in
//! [`Structural`]; structs and enums can `#[derive(Describable)]`.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::time::Duration;

/// Marker rendered for absent values
pub const NULL_MARKER: &str = "null";

/// A value that can be rendered into an assertion message
pub trait Describable {
    /// Render the value for a failure message
    fn describe(&self) -> String;
}

macro_rules! describe_natural {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describable for $ty {
                fn describe(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

describe_natural!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

impl Describable for str {
    fn describe(&self) -> String {
        format!("\"{self}\"")
    }
}

impl Describable for String {
    fn describe(&self) -> String {
        self.as_str().describe()
    }
}

impl Describable for Duration {
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

impl<T: Describable + ?Sized> Describable for &T {
    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: Describable + ?Sized> Describable for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: Describable> Describable for Option<T> {
    fn describe(&self) -> String {
        self.as_ref()
            .map_or_else(|| NULL_MARKER.to_string(), Describable::describe)
    }
}

impl<T: Describable> Describable for [T] {
    fn describe(&self) -> String {
        describe_sequence(self)
    }
}

impl<T: Describable, const N: usize> Describable for [T; N] {
    fn describe(&self) -> String {
        describe_sequence(self)
    }
}

impl<T: Describable> Describable for Vec<T> {
    fn describe(&self) -> String {
        describe_sequence(self)
    }
}

impl<T: Describable> Describable for VecDeque<T> {
    fn describe(&self) -> String {
        describe_sequence(self)
    }
}

/// Render a sequence as `[a, b, c]`, or one item per line when any item
/// renders across several lines.
pub fn describe_sequence<'a, T, I>(items: I) -> String
where
    T: Describable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let rendered: Vec<String> = items.into_iter().map(Describable::describe).collect();

    if rendered.iter().any(|item| item.contains('\n')) {
        format!("[\n{}]", rendered.join(",\n"))
    } else {
        format!("[{}]", rendered.join(", "))
    }
}

/// Render a struct-like value as `Name { a=1, b="x" }`.
///
/// Members rendering as null or as an empty list are left out; a value with
/// no remaining members renders as its bare name. Used by
/// `#[derive(Describable)]`.
#[must_use]
pub fn describe_struct(type_name: &str, fields: &[(&str, String)]) -> String {
    let members: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value != NULL_MARKER && value != "[]")
        .map(|(name, value)| format!("{name}={value}"))
        .collect();

    if members.is_empty() {
        type_name.to_string()
    } else {
        format!("{type_name} {{ {} }}", members.join(", "))
    }
}

/// Structural fallback for values that only implement `Debug`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Structural<T>(pub T);

impl<T: Debug> Describable for Structural<T> {
    fn describe(&self) -> String {
        format!("{{ {:?} }}", self.0)
    }
}
