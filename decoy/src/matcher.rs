// vim: tw=80
//! Argument and method matchers.
//!
//! A [`Matcher`] decides whether a single dynamically typed [`Value`]
//! is acceptable.  Typed matchers are thin wrappers around the [`predicates`]
//! crate, so anything implementing [`Predicate`] can be used with [`pred`].
//!
//! # Examples
//! ```
//! # use decoy::matcher::*;
//! # use decoy::predicate;
//! let m = all_of(vec![gt(3i32), not(eq(7i32))]);
//! assert!(m.matches(&5i32));
//! assert!(!m.matches(&7i32));
//!
//! // String literals match owned strings
//! assert!(eq("rabbit").matches(&String::from("rabbit")));
//! assert!(str_starts_with("rab").matches(&String::from("rabbit")));
//!
//! assert!(pred::<u8, _>(predicate::in_iter(vec![1u8, 2])).matches(&2u8));
//! ```

use predicates::{
    Predicate,
    ord::{EqPredicate, eq as pred_eq}
};
use predicates_tree::CaseTreeExt;
use std::{
    any::type_name,
    fmt::{self, Debug, Display},
    marker::PhantomData
};

use crate::value::{Extract, Value, as_str};

/// The dynamically typed interface shared by every matcher.
pub trait ValueMatcher: Display + Send {
    /// Is `actual` acceptable?
    fn matches(&self, actual: &dyn Value) -> bool;

    /// Describe why `actual` was not acceptable.
    fn explain(&self, actual: &dyn Value) -> String {
        format!("expected {}, but was {:?}", self, actual)
    }
}

/// A type-erased matcher for a single value.
pub struct Matcher(Box<dyn ValueMatcher>);

impl Matcher {
    pub fn new<M: ValueMatcher + 'static>(m: M) -> Self {
        Matcher(Box::new(m))
    }

    pub fn matches(&self, actual: &dyn Value) -> bool {
        self.0.matches(actual)
    }

    pub fn explain(&self, actual: &dyn Value) -> String {
        self.0.explain(actual)
    }
}

impl Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Matcher({})", self.0)
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Adapts a typed [`Predicate`] to a [`ValueMatcher`].
struct Typed<T: ?Sized, P> {
    pred: P,
    _t: PhantomData<fn(&T)>,
}

impl<T: ?Sized, P> Typed<T, P> {
    fn new(pred: P) -> Self {
        Typed { pred, _t: PhantomData }
    }
}

impl<T, P> Display for Typed<T, P>
    where T: ?Sized, P: Predicate<T>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.pred, f)
    }
}

impl<T, P> ValueMatcher for Typed<T, P>
    where T: Extract + ?Sized, P: Predicate<T> + Send
{
    fn matches(&self, actual: &dyn Value) -> bool {
        T::extract(actual).map_or(false, |t| self.pred.eval(t))
    }

    fn explain(&self, actual: &dyn Value) -> String {
        match T::extract(actual) {
            None => format!("expected a {}, but was {:?}", type_name::<T>(),
                            actual),
            Some(t) => match self.pred.find_case(false, t) {
                Some(case) => format!("{}", case.tree()),
                None => format!("{} matched {:?}", self, actual)
            }
        }
    }
}

/// Equality that lets string literals and owned strings compare equal.
struct Equals<T> {
    expected: EqPredicate<T>,
    as_str: Option<String>,
}

impl<T: Debug + PartialEq> Display for Equals<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.expected, f)
    }
}

impl<T> ValueMatcher for Equals<T>
    where T: Value + PartialEq
{
    fn matches(&self, actual: &dyn Value) -> bool {
        if let Some(t) = T::extract(actual) {
            self.expected.eval(t)
        } else {
            match (&self.as_str, as_str(actual)) {
                (Some(e), Some(a)) => e == a,
                _ => false
            }
        }
    }

    fn explain(&self, actual: &dyn Value) -> String {
        match T::extract(actual) {
            Some(t) => match self.expected.find_case(false, t) {
                Some(case) => format!("{}", case.tree()),
                None => format!("{} matched {:?}", self, actual)
            },
            None => format!("expected {}, but was {:?}", self, actual)
        }
    }
}

struct Anything;

impl Display for Anything {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("<anything>")
    }
}

impl ValueMatcher for Anything {
    fn matches(&self, _actual: &dyn Value) -> bool {
        true
    }
}

struct IsType<T>(PhantomData<fn(&T)>);

impl<T> Display for IsType<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<a {}>", type_name::<T>())
    }
}

impl<T: Value> ValueMatcher for IsType<T> {
    fn matches(&self, actual: &dyn Value) -> bool {
        T::extract(actual).is_some()
    }
}

struct Not(Matcher);

impl Display for Not {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "not({})", self.0)
    }
}

impl ValueMatcher for Not {
    fn matches(&self, actual: &dyn Value) -> bool {
        !self.0.matches(actual)
    }
}

#[derive(Clone, Copy)]
enum Junction {
    All,
    Any,
}

struct Combined(Junction, Vec<Matcher>);

impl Display for Combined {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sep = match self.0 {
            Junction::All => " && ",
            Junction::Any => " || ",
        };
        f.write_str("(")?;
        for (i, m) in self.1.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{}", m)?;
        }
        f.write_str(")")
    }
}

impl ValueMatcher for Combined {
    fn matches(&self, actual: &dyn Value) -> bool {
        match self.0 {
            Junction::All => self.1.iter().all(|m| m.matches(actual)),
            Junction::Any => self.1.iter().any(|m| m.matches(actual)),
        }
    }

    fn explain(&self, actual: &dyn Value) -> String {
        match self.0 {
            Junction::All => self.1.iter()
                .find(|m| !m.matches(actual))
                .map(|m| m.explain(actual))
                .unwrap_or_else(|| format!("{} matched {:?}", self, actual)),
            Junction::Any => format!("expected {}, but was {:?}", self,
                                     actual),
        }
    }
}

/// Matches any value at all.
pub fn anything() -> Matcher {
    Matcher::new(Anything)
}

/// Matches values equal to `expected`.  A `&'static str` or `String` expected
/// value also matches any other string type with the same contents.
pub fn eq<T>(expected: T) -> Matcher
    where T: Value + PartialEq
{
    let s = {
        let v: &dyn Value = &expected;
        as_str(v).map(str::to_owned)
    };
    Matcher::new(Equals { expected: pred_eq(expected), as_str: s })
}

/// Matches values not equal to `expected`.
pub fn ne<T>(expected: T) -> Matcher
    where T: Value + PartialEq
{
    not(eq(expected))
}

/// Matches values less than `bound`.
pub fn lt<T>(bound: T) -> Matcher
    where T: Value + PartialOrd
{
    Matcher::new(Typed::<T, _>::new(predicates::ord::lt(bound)))
}

/// Matches values less than or equal to `bound`.
pub fn le<T>(bound: T) -> Matcher
    where T: Value + PartialOrd
{
    Matcher::new(Typed::<T, _>::new(predicates::ord::le(bound)))
}

/// Matches values greater than `bound`.
pub fn gt<T>(bound: T) -> Matcher
    where T: Value + PartialOrd
{
    Matcher::new(Typed::<T, _>::new(predicates::ord::gt(bound)))
}

/// Matches values greater than or equal to `bound`.
pub fn ge<T>(bound: T) -> Matcher
    where T: Value + PartialOrd
{
    Matcher::new(Typed::<T, _>::new(predicates::ord::ge(bound)))
}

/// Matches values that appear in `items`.
pub fn one_of<T, I>(items: I) -> Matcher
    where T: Value + PartialEq, I: IntoIterator<Item = T>
{
    Matcher::new(Typed::<T, _>::new(predicates::iter::in_iter(items)))
}

/// Matches any value of type `T`.
pub fn is_type<T: Value>() -> Matcher {
    Matcher::new(IsType::<T>(PhantomData))
}

/// Matches strings containing `pattern`.
pub fn str_contains<S: Into<String>>(pattern: S) -> Matcher {
    Matcher::new(Typed::<str, _>::new(predicates::str::contains(pattern)))
}

/// Matches strings starting with `prefix`.
pub fn str_starts_with<S: Into<String>>(prefix: S) -> Matcher {
    Matcher::new(Typed::<str, _>::new(predicates::str::starts_with(prefix)))
}

/// Matches strings ending with `suffix`.
pub fn str_ends_with<S: Into<String>>(suffix: S) -> Matcher {
    Matcher::new(Typed::<str, _>::new(predicates::str::ends_with(suffix)))
}

/// Matches `T` values for which `f` returns true.
///
/// `T` may be unsized, so `function::<str, _>` works on string arguments and
/// `function::<[u8], _>` on byte vectors.
pub fn function<T, F>(f: F) -> Matcher
    where T: Extract + Send + ?Sized + 'static,
          F: Fn(&T) -> bool + Send + 'static
{
    Matcher::new(Typed::<T, _>::new(predicates::function::function(f)))
}

/// Matches `T` values accepted by an arbitrary [`Predicate`].
pub fn pred<T, P>(p: P) -> Matcher
    where T: Extract + ?Sized + 'static,
          P: Predicate<T> + Send + 'static
{
    Matcher::new(Typed::<T, _>::new(p))
}

/// Inverts a matcher.
pub fn not(m: Matcher) -> Matcher {
    Matcher::new(Not(m))
}

/// Matches values accepted by every one of `matchers`.
pub fn all_of(matchers: Vec<Matcher>) -> Matcher {
    Matcher::new(Combined(Junction::All, matchers))
}

/// Matches values accepted by at least one of `matchers`.
pub fn any_of(matchers: Vec<Matcher>) -> Matcher {
    Matcher::new(Combined(Junction::Any, matchers))
}
