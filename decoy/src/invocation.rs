// vim: tw=80
use cfg_if::cfg_if;
use fragile::Fragile;
use std::{
    any::{Any, type_name},
    fmt,
    marker::PhantomData,
    panic,
    sync::Arc
};

use crate::{
    error::MockError,
    value::{Arg, Arguments, Direction, Value}
};

/// Identifies one mock object within its [`Mockery`](crate::Mockery).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ObjectId(pub(crate) usize);

/// The identity of the mock object that received an invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Receiver {
    pub(crate) id: ObjectId,
    pub(crate) name: Arc<str>,
}

impl Receiver {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What the matched expectation decided the call should do.
pub enum Outcome {
    /// No action supplied a result
    Pending,
    /// Return this value, which must be of the method's return type
    Returned(Box<dyn Any + Send>),
    /// Unwind with this panic payload
    Raised(Box<dyn Any + Send>),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Pending => f.write_str("Pending"),
            Outcome::Returned(_) => f.write_str("Returned(..)"),
            Outcome::Raised(_) => f.write_str("Raised(..)"),
        }
    }
}

/// A single call of a mocked method.
///
/// Mock objects build one per call and hand it to
/// [`MockObject::invoke`](crate::MockObject::invoke), which returns it with
/// its [`Outcome`] filled in by the matched expectation's actions.
///
/// # Examples
/// ```
/// # use decoy::*;
/// let mockery = Mockery::new();
/// let turtle = mockery.mock::<MockObject>("turtle");
/// mockery.expect(&turtle)
///     .method("turn")
///     .with(vec![matcher::eq(90i32)])
///     .returning(|call| *call.arguments().get::<i32>(0) > 0);
///
/// let call = Invocation::new(turtle.receiver(), "turn").arg("degrees", 90i32);
/// let turned: bool = turtle.invoke(call).returned();
/// assert!(turned);
/// ```
#[derive(Debug)]
pub struct Invocation {
    receiver: Receiver,
    method: &'static str,
    arguments: Arguments,
    outcome: Outcome,
}

impl Invocation {
    pub fn new(receiver: Receiver, method: &'static str) -> Self {
        Invocation {
            receiver,
            method,
            arguments: Arguments::new(),
            outcome: Outcome::Pending,
        }
    }

    /// Append an input argument.
    pub fn arg<T: Value>(mut self, name: &'static str, value: T) -> Self {
        self.arguments.push(Arg::new(Some(name), Direction::In, value));
        self
    }

    /// Append an output argument.  `placeholder` is reported in diagnostics
    /// and returned by [`take_arg`](Self::take_arg) if no action writes it.
    pub fn arg_out<T: Value>(mut self, name: &'static str, placeholder: T)
        -> Self
    {
        self.arguments.push(Arg::new(Some(name), Direction::Out, placeholder));
        self
    }

    /// Append an in/out argument, like a `&mut T` parameter.
    pub fn arg_ref<T: Value>(mut self, name: &'static str, value: T) -> Self {
        self.arguments.push(Arg::new(Some(name), Direction::Ref, value));
        self
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Set the value this invocation will return.
    pub fn set_result<R: Send + 'static>(&mut self, r: R) {
        self.outcome = Outcome::Returned(Box::new(r));
    }

    /// Like [`set_result`](Self::set_result), for values that are not
    /// `Send`.  The mock object must extract it on the same thread.
    pub fn set_result_st<R: 'static>(&mut self, r: R) {
        self.outcome = Outcome::Returned(Box::new(Fragile::new(r)));
    }

    /// Make this invocation unwind with `payload` instead of returning.
    pub fn set_raised<P: Send + 'static>(&mut self, payload: P) {
        self.outcome = Outcome::Raised(Box::new(payload));
    }

    /// Overwrite an `Out` or `Ref` argument.
    pub fn set_arg<T: Value>(&mut self, index: usize, value: T)
        -> Result<(), MockError>
    {
        self.arguments.set(index, value)
    }

    /// Overwrite an `Out` or `Ref` argument identified by its parameter name.
    pub fn set_named_arg<T: Value>(&mut self, name: &'static str, value: T)
        -> Result<(), MockError>
    {
        let index = self.arguments.position(name)
            .ok_or(MockError::NoSuchName { name })?;
        self.arguments.set(index, value)
    }

    /// Move an argument's final value out, so the mock object can write it
    /// back through its `&mut` parameter.
    pub fn try_take_arg<T: Value>(&mut self, index: usize)
        -> Result<T, MockError>
    {
        self.arguments.take(index)
    }

    /// Like [`try_take_arg`](Self::try_take_arg), but panics on failure.
    pub fn take_arg<T: Value>(&mut self, index: usize) -> T {
        match self.try_take_arg(index) {
            Ok(t) => t,
            Err(e) => panic!("{}: {}", self, e),
        }
    }

    /// Extract the configured return value.
    ///
    /// A raised payload resumes unwinding here.  If no action configured a
    /// result, methods returning `()` simply return; other return types get
    /// their default value when built with the **nightly** feature, and an
    /// error otherwise.
    pub fn try_returned<R: 'static>(self) -> Result<R, MockError> {
        let invocation = self.to_string();
        match self.outcome {
            Outcome::Raised(payload) => panic::resume_unwind(payload),
            Outcome::Returned(r) => match r.downcast::<R>() {
                Ok(r) => Ok(*r),
                Err(r) => r.downcast::<Fragile<R>>()
                    .map(|f| f.into_inner())
                    .map_err(|_| MockError::ReturnType {
                        invocation,
                        expected: type_name::<R>(),
                    })
            },
            Outcome::Pending => {
                let unit: Box<dyn Any> = Box::new(());
                match unit.downcast::<R>() {
                    Ok(r) => Ok(*r),
                    Err(_) => DefaultReturner::<R>::return_default()
                        .ok_or(MockError::MissingReturn { invocation })
                }
            }
        }
    }

    /// Like [`try_returned`](Self::try_returned), but panics on failure.
    pub fn returned<R: 'static>(self) -> R {
        match self.try_returned() {
            Ok(r) => r,
            Err(e) => panic!("{}", e),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}({})", self.receiver, self.method, self.arguments)
    }
}

#[doc(hidden)]
pub trait ReturnDefault<O> {
    fn return_default() -> Option<O>;
}

#[derive(Default)]
#[doc(hidden)]
pub struct DefaultReturner<O>(PhantomData<O>);

cfg_if! {
    if #[cfg(feature = "nightly")] {
        impl<O> ReturnDefault<O> for DefaultReturner<O> {
            default fn return_default() -> Option<O> {
                None
            }
        }

        impl<O: Default> ReturnDefault<O> for DefaultReturner<O> {
            fn return_default() -> Option<O> {
                Some(O::default())
            }
        }
    } else {
        impl<O> ReturnDefault<O> for DefaultReturner<O> {
            fn return_default() -> Option<O> {
                None
            }
        }
    }
}
