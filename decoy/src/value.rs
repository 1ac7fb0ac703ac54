// vim: tw=80
//! Dynamically typed argument values.
//!
//! Every argument that crosses a mock object is boxed as a [`Value`], so the
//! dispatcher can match and print it without knowing its concrete type.
//! Downcasting is confined to this module.

use downcast::*;
use std::fmt;

use crate::error::MockError;

/// Anything that can be passed to a mocked method as an argument.
///
/// Blanket-implemented for every `'static`, `Debug`, `Send` type.
pub trait Value: Any + fmt::Debug + Send {}
impl<T: Any + fmt::Debug + Send> Value for T {}
downcast!(dyn Value);

/// Borrow a `Value` as a concrete type, if that's what it holds.
pub(crate) fn view<T: Any>(value: &dyn Value) -> Option<&T> {
    let r: Result<&T, _> = value.downcast_ref();
    r.ok()
}

/// Mutably borrow a `Value` as a concrete type.
pub(crate) fn view_mut<T: Any>(value: &mut dyn Value) -> Option<&mut T> {
    let r: Result<&mut T, _> = value.downcast_mut();
    r.ok()
}

/// Take ownership of the concrete value inside a boxed `Value`.
pub(crate) fn unbox<T: Any>(value: Box<dyn Value>) -> Option<T> {
    let r: Result<Box<T>, _> = value.downcast();
    r.ok().map(|b| *b)
}

/// View a `Value` as a string slice.  Owned and static strings both qualify,
/// because mock objects pass `&str` arguments as `String`.
pub(crate) fn as_str(value: &dyn Value) -> Option<&str> {
    if let Some(s) = view::<String>(value) {
        Some(s.as_str())
    } else if let Some(s) = view::<&'static str>(value) {
        Some(s)
    } else {
        view::<Box<str>>(value).map(|s| &**s)
    }
}

/// Types that a typed matcher can look for inside a [`Value`].
///
/// Every sized `Value` extracts itself; `str` extracts from any string type
/// and `[T]` extracts from a `Vec<T>`.
pub trait Extract {
    /// Borrow `value` as `Self`, or `None` if it holds some other type.
    fn extract(value: &dyn Value) -> Option<&Self>;
}

impl<T: Value> Extract for T {
    fn extract(value: &dyn Value) -> Option<&Self> {
        view::<T>(value)
    }
}

impl Extract for str {
    fn extract(value: &dyn Value) -> Option<&Self> {
        as_str(value)
    }
}

impl<T: Value> Extract for [T] {
    fn extract(value: &dyn Value) -> Option<&Self> {
        view::<Vec<T>>(value).map(Vec::as_slice)
    }
}

/// Which way data flows through a parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Passed by value or by shared reference.  Read-only.
    In,
    /// Written by the callee.  Its incoming value is meaningless.
    Out,
    /// Read and written by the callee, like `&mut T`.
    Ref,
}

impl Direction {
    /// May actions write to a parameter flowing this way?
    pub fn is_writable(self) -> bool {
        self != Direction::In
    }
}

/// A single argument of an [`Invocation`](crate::Invocation).
#[derive(Debug)]
pub struct Arg {
    name: Option<&'static str>,
    direction: Direction,
    value: Box<dyn Value>,
}

impl Arg {
    pub fn new<T: Value>(name: Option<&'static str>, direction: Direction,
                         value: T) -> Self
    {
        Arg { name, direction, value: Box::new(value) }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    pub fn value(&self) -> &dyn Value {
        self.value.as_ref()
    }
}

/// The ordered argument list of an invocation.
#[derive(Debug, Default)]
pub struct Arguments(Vec<Arg>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, arg: Arg) {
        self.0.push(arg);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }

    /// Look up an argument's position by its parameter name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|a| a.name == Some(name))
    }

    /// Borrow argument `index` as a `T`.
    pub fn try_get<T: Value>(&self, index: usize) -> Result<&T, MockError> {
        let arg = self.0.get(index)
            .ok_or(MockError::NoSuchArgument { index, len: self.0.len() })?;
        view::<T>(arg.value()).ok_or_else(|| MockError::ArgumentType {
            index,
            expected: std::any::type_name::<T>(),
            found: format!("{:?}", arg.value),
        })
    }

    /// Borrow argument `index` as a `T`.
    ///
    /// # Panics
    ///
    /// If there is no such argument or it holds a different type.  Intended
    /// for use inside actions, where a panic fails the test.
    pub fn get<T: Value>(&self, index: usize) -> &T {
        match self.try_get(index) {
            Ok(t) => t,
            Err(e) => panic!("{}", e),
        }
    }

    /// Replace the value of a writable argument.
    pub(crate) fn set<T: Value>(&mut self, index: usize, value: T)
        -> Result<(), MockError>
    {
        let len = self.0.len();
        let arg = self.0.get_mut(index)
            .ok_or(MockError::NoSuchArgument { index, len })?;
        if !arg.direction.is_writable() {
            return Err(MockError::ReadOnlyArgument { index });
        }
        if let Some(slot) = view_mut::<T>(arg.value.as_mut()) {
            *slot = value;
        } else {
            arg.value = Box::new(value);
        }
        Ok(())
    }

    /// Move argument `index` out as a `T`, leaving `()` behind.
    pub(crate) fn take<T: Value>(&mut self, index: usize)
        -> Result<T, MockError>
    {
        let len = self.0.len();
        let arg = self.0.get_mut(index)
            .ok_or(MockError::NoSuchArgument { index, len })?;
        let found = format!("{:?}", arg.value);
        let value = std::mem::replace(&mut arg.value, Box::new(()));
        unbox::<T>(value).ok_or(MockError::ArgumentType {
            index,
            expected: std::any::type_name::<T>(),
            found,
        })
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg.direction {
                Direction::In => write!(f, "{:?}", arg.value)?,
                Direction::Out => f.write_str("<out>")?,
                Direction::Ref => write!(f, "&mut {:?}", arg.value)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod t {
    use super::*;

    fn args() -> Arguments {
        let mut args = Arguments::new();
        args.push(Arg::new(Some("x"), Direction::In, 5u32));
        args.push(Arg::new(Some("s"), Direction::In, String::from("abc")));
        args.push(Arg::new(Some("buf"), Direction::Ref, vec![1u8]));
        args
    }

    #[test]
    fn display() {
        assert_eq!("5, \"abc\", &mut [1]", args().to_string());
    }

    #[test]
    fn extract_str_from_string() {
        let v: Box<dyn Value> = Box::new(String::from("abc"));
        assert_eq!(Some("abc"), <str as Extract>::extract(v.as_ref()));
        let v: Box<dyn Value> = Box::new("def");
        assert_eq!(Some("def"), <str as Extract>::extract(v.as_ref()));
    }

    #[test]
    fn extract_slice_from_vec() {
        let v: Box<dyn Value> = Box::new(vec![1u8, 2]);
        assert_eq!(Some(&[1u8, 2][..]), <[u8] as Extract>::extract(v.as_ref()));
        assert_eq!(None, <[u16] as Extract>::extract(v.as_ref()));
    }

    #[test]
    fn get_wrong_type() {
        let e = args().try_get::<i64>(0).unwrap_err();
        assert!(matches!(e, MockError::ArgumentType { index: 0, .. }));
    }

    #[test]
    fn position() {
        assert_eq!(Some(2), args().position("buf"));
        assert_eq!(None, args().position("nope"));
    }

    #[test]
    fn set_read_only() {
        let e = args().set(0, 6u32).unwrap_err();
        assert_eq!(MockError::ReadOnlyArgument { index: 0 }, e);
    }

    #[test]
    fn set_then_take() {
        let mut args = args();
        args.set(2, vec![4u8, 2]).unwrap();
        assert_eq!(vec![4u8, 2], args.take::<Vec<u8>>(2).unwrap());
    }
}
