// vim: tw=80
//! What a matched expectation does.
//!
//! Every expectation holds a list of [`Action`]s, performed in the order they
//! were added.  The builder methods on
//! [`ExpectationBuilder`](crate::ExpectationBuilder) cover the common cases;
//! anything else can implement `Action` and be attached with
//! [`will`](crate::ExpectationBuilder::will).

use fragile::Fragile;
use std::{
    any::type_name,
    fmt,
    marker::PhantomData,
    sync::{Arc, Mutex}
};

use crate::{Invocation, MockError, lock, value::Value};

/// Something done to an [`Invocation`] when its expectation matches.
///
/// An error is recorded with the `Mockery`, so verification still reports it
/// if the code under test swallows the resulting panic.  The remaining
/// actions of the expectation are skipped.
pub trait Action: fmt::Display + Send {
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError>;
}

pub(crate) struct ReturnConst<R>(pub(crate) R);

impl<R> fmt::Display for ReturnConst<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "return a constant {}", type_name::<R>())
    }
}

impl<R: Clone + Send + 'static> Action for ReturnConst<R> {
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        invocation.set_result(self.0.clone());
        Ok(())
    }
}

pub(crate) struct Returning<F, R>(pub(crate) F,
                                  pub(crate) PhantomData<fn() -> R>);

impl<F, R> fmt::Display for Returning<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("return a computed value")
    }
}

impl<F, R> Action for Returning<F, R>
    where F: FnMut(&Invocation) -> R + Send,
          R: Send + 'static
{
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        let r = (self.0)(invocation);
        invocation.set_result(r);
        Ok(())
    }
}

pub(crate) struct ReturnOnce<F, R>(pub(crate) Option<F>,
                                   pub(crate) PhantomData<fn() -> R>);

impl<F, R> fmt::Display for ReturnOnce<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("return a value once")
    }
}

impl<F, R> Action for ReturnOnce<F, R>
    where F: FnOnce(&Invocation) -> R + Send,
          R: Send + 'static
{
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        let f = self.0.take().ok_or(MockError::Exhausted)?;
        let r = f(invocation);
        invocation.set_result(r);
        Ok(())
    }
}

/// Confines a non-`Send` closure to the thread that created it.
pub(crate) struct ReturningSt<F, R>(pub(crate) Fragile<F>,
                                    pub(crate) PhantomData<fn() -> R>);

impl<F, R> fmt::Display for ReturningSt<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("return a computed value (single-threaded)")
    }
}

impl<F, R> Action for ReturningSt<F, R>
    where F: FnMut(&Invocation) -> R + 'static,
          R: 'static
{
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        let r = (self.0.get_mut())(invocation);
        invocation.set_result_st(r);
        Ok(())
    }
}

/// Unwind with a clone of the payload.  `panicking` is the `String` case.
pub(crate) struct Raising<P>(pub(crate) P);

impl<P: fmt::Debug> fmt::Display for Raising<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "panic with {:?}", self.0)
    }
}

impl<P: Clone + fmt::Debug + Send + 'static> Action for Raising<P> {
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        invocation.set_raised(self.0.clone());
        Ok(())
    }
}

pub(crate) struct SetArg<T> {
    pub(crate) index: usize,
    pub(crate) value: T,
}

impl<T: fmt::Debug> fmt::Display for SetArg<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "set argument {} to {:?}", self.index, self.value)
    }
}

impl<T: Value + Clone> Action for SetArg<T> {
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        invocation.set_arg(self.index, self.value.clone())
    }
}

pub(crate) struct SetNamedArg<T> {
    pub(crate) name: &'static str,
    pub(crate) value: T,
}

impl<T: fmt::Debug> fmt::Display for SetNamedArg<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "set {} to {:?}", self.name, self.value)
    }
}

impl<T: Value + Clone> Action for SetNamedArg<T> {
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        invocation.set_named_arg(self.name, self.value.clone())
    }
}

pub(crate) struct CaptureArg<T> {
    pub(crate) index: usize,
    pub(crate) captor: Captor<T>,
}

impl<T> fmt::Display for CaptureArg<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "capture argument {}", self.index)
    }
}

impl<T: Value + Clone> Action for CaptureArg<T> {
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        let value = invocation.arguments().try_get::<T>(self.index)?.clone();
        lock(&self.captor.0).push(value);
        Ok(())
    }
}

pub(crate) struct Doing<F>(pub(crate) F);

impl<F> fmt::Display for Doing<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("run a side effect")
    }
}

impl<F: FnMut(&mut Invocation) + Send> Action for Doing<F> {
    fn invoke(&mut self, invocation: &mut Invocation) -> Result<(), MockError> {
        (self.0)(invocation);
        Ok(())
    }
}

/// Collects copies of one argument every time an expectation matches.
///
/// Clones share the same storage, so one clone can be handed to
/// [`capture_arg`](crate::ExpectationBuilder::capture_arg) while the test
/// keeps another.
///
/// # Examples
/// ```
/// # use decoy::*;
/// let mockery = Mockery::new();
/// let log = mockery.mock::<MockObject>("log");
/// let captor = Captor::<String>::new();
/// mockery.allow(&log).method("write").capture_arg(0, &captor);
///
/// log.invoke(log.call("write").arg("msg", String::from("hello")));
/// log.invoke(log.call("write").arg("msg", String::from("world")));
/// assert_eq!(vec!["hello", "world"], captor.values());
/// ```
pub struct Captor<T>(Arc<Mutex<Vec<T>>>);

impl<T: Clone> Captor<T> {
    pub fn new() -> Self {
        Captor(Arc::new(Mutex::new(Vec::new())))
    }

    /// Every captured value, oldest first.
    pub fn values(&self) -> Vec<T> {
        lock(&self.0).clone()
    }

    /// The most recently captured value, if any.
    pub fn last(&self) -> Option<T> {
        lock(&self.0).last().cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.0).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Clone for Captor<T> {
    fn clone(&self) -> Self {
        Captor(self.0.clone())
    }
}

impl<T: Clone> Default for Captor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Captor<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Captor").field(&*lock(&self.0)).finish()
    }
}
