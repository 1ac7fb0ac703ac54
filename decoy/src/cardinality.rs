// vim: tw=80
use std::{
    fmt,
    ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo,
          RangeToInclusive}
};

/// How many times an expectation is required and allowed to be invoked.
///
/// `maximum` of `None` means there is no upper bound.
///
/// # Examples
/// ```
/// # use decoy::Cardinality;
/// let c = Cardinality::from(2..5);
/// assert!(!c.is_satisfied(1));
/// assert!(c.is_satisfied(2));
/// assert!(c.allows_more(3));
/// assert!(!c.allows_more(4));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cardinality {
    required: usize,
    maximum: Option<usize>,
}

impl Cardinality {
    /// Between `required` and `maximum` calls, inclusive.
    ///
    /// # Panics
    ///
    /// If `maximum < required`, since no call count could ever satisfy it.
    pub fn between(required: usize, maximum: usize) -> Self {
        assert!(maximum >= required,
            "Empty call count range: at least {} but at most {}",
            required, maximum);
        Cardinality { required, maximum: Some(maximum) }
    }

    pub fn exactly(n: usize) -> Self {
        Cardinality::between(n, n)
    }

    pub fn once() -> Self {
        Cardinality::exactly(1)
    }

    pub fn never() -> Self {
        Cardinality::exactly(0)
    }

    pub fn at_least(n: usize) -> Self {
        Cardinality { required: n, maximum: None }
    }

    pub fn at_most(n: usize) -> Self {
        Cardinality::between(0, n)
    }

    /// Any number of calls, including none
    pub fn any() -> Self {
        Cardinality::at_least(0)
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn maximum(&self) -> Option<usize> {
        self.maximum
    }

    /// Could an expectation that has been called `count` times accept one more
    /// call?
    pub fn allows_more(&self, count: usize) -> bool {
        self.maximum.map_or(true, |max| count < max)
    }

    /// Is it required that this expectation be called an exact number of times?
    pub fn is_exact(&self) -> bool {
        self.maximum == Some(self.required)
    }

    /// Has an expectation that has been called `count` times been called the
    /// minimum required number of times?
    pub fn is_satisfied(&self, count: usize) -> bool {
        count >= self.required
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::once()
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.required, self.maximum) {
            (_, Some(0)) => f.write_str("never"),
            (1, Some(1)) => f.write_str("once"),
            (n, Some(m)) if n == m => write!(f, "exactly {} times", n),
            (0, None) => f.write_str("any number of times"),
            (n, None) => write!(f, "at least {} {}", n, times(n)),
            (0, Some(m)) => write!(f, "at most {} {}", m, times(m)),
            (n, Some(m)) => write!(f, "between {} and {} times", n, m),
        }
    }
}

/// Format a call count the way reports print it.
pub(crate) fn invoked(count: usize) -> String {
    match count {
        0 => "never invoked".to_owned(),
        1 => "invoked once".to_owned(),
        n => format!("invoked {} times", n),
    }
}

fn times(n: usize) -> &'static str {
    if n == 1 { "time" } else { "times" }
}

impl From<usize> for Cardinality {
    fn from(n: usize) -> Self {
        Cardinality::exactly(n)
    }
}

impl From<Range<usize>> for Cardinality {
    /// A half-open range of call counts.
    ///
    /// # Panics
    ///
    /// If the range is empty.
    fn from(r: Range<usize>) -> Self {
        assert!(r.end > r.start, "Empty call count range {:?}", r);
        Cardinality::between(r.start, r.end - 1)
    }
}

impl From<RangeInclusive<usize>> for Cardinality {
    fn from(r: RangeInclusive<usize>) -> Self {
        Cardinality::between(*r.start(), *r.end())
    }
}

impl From<RangeFrom<usize>> for Cardinality {
    fn from(r: RangeFrom<usize>) -> Self {
        Cardinality::at_least(r.start)
    }
}

impl From<RangeTo<usize>> for Cardinality {
    fn from(r: RangeTo<usize>) -> Self {
        assert!(r.end > 0, "Empty call count range {:?}", r);
        Cardinality::at_most(r.end - 1)
    }
}

impl From<RangeToInclusive<usize>> for Cardinality {
    fn from(r: RangeToInclusive<usize>) -> Self {
        Cardinality::at_most(r.end)
    }
}

impl From<RangeFull> for Cardinality {
    fn from(_: RangeFull) -> Self {
        Cardinality::any()
    }
}
