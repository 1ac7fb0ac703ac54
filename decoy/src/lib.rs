// vim: tw=80
//! An expectation-matching mock object library for Rust.
//!
//! Decoy builds mock objects that route every method call into a shared
//! dispatcher.  The dispatcher matches each call against the expectations
//! that the test declared, performs the matched expectation's actions, and
//! at the end of the test verifies that every expectation was satisfied.
//!
//! # Usage
//!
//! * Annotate a trait with [`#[mockable]`](mockable).  That generates a struct
//!   named `Mock` + the trait's name which implements the trait.
//! * In your test, create a [`Mockery`] and ask it for mock objects with
//!   [`Mockery::mock`].
//! * Declare expectations with [`Mockery::expect`], [`Mockery::allow`] and
//!   [`Mockery::ignore`].  Each can constrain the method, the arguments, the
//!   call count, the order of calls, and the state of named state machines,
//!   and each can supply a return value or other actions.
//! * Supply the mock objects to the code under test.  Any call contrary to
//!   your expectations panics with a report of what was expected.
//! * When the `Mockery` is dropped, it panics unless every expectation was
//!   satisfied.
//!
//! # User Guide
//!
//! * [`Getting started`](#getting-started)
//! * [`Return values`](#return-values)
//! * [`Matching arguments`](#matching-arguments)
//! * [`Call counts`](#call-counts)
//! * [`Ordering`](#ordering)
//! * [`States`](#states)
//! * [`Reference arguments`](#reference-arguments)
//! * [`Checkpoints`](#checkpoints)
//! * [`Manual mocks`](#manual-mocks)
//! * [`Crate features`](#crate-features)
//!
//! ## Getting Started
//! ```
//! use decoy::*;
//!
//! #[mockable]
//! trait Turtle {
//!     fn forward(&self, distance: i32);
//!     fn position(&self) -> (i32, i32);
//! }
//!
//! fn walk(t: &dyn Turtle) -> (i32, i32) {
//!     t.forward(10);
//!     t.position()
//! }
//!
//! let mockery = Mockery::new();
//! let turtle = mockery.mock::<MockTurtle>("turtle");
//! mockery.expect(&turtle)
//!     .method("forward")
//!     .with(vec![matcher::eq(10i32)]);
//! mockery.allow(&turtle)
//!     .method("position")
//!     .return_const((0, 10));
//! assert_eq!((0, 10), walk(&turtle));
//! ```
//!
//! ## Return values
//!
//! Methods that return `()` need no action.  For anything else, supply the
//! return value with [`return_const`](ExpectationBuilder::return_const),
//! [`returning`](ExpectationBuilder::returning),
//! [`return_once`](ExpectationBuilder::return_once) or
//! [`returning_st`](ExpectationBuilder::returning_st).  Calling a method that
//! needs a return value without one panics, unless the **nightly** feature
//! is enabled and the return type implements `Default`.
//!
//! An expectation can also make the method panic, with
//! [`panicking`](ExpectationBuilder::panicking) or an arbitrary payload with
//! [`raising`](ExpectationBuilder::raising).
//!
//! ```
//! # use decoy::*;
//! #[mockable]
//! trait Clock {
//!     fn now(&self) -> u64;
//! }
//!
//! let mockery = Mockery::new();
//! let clock = mockery.mock::<MockClock>("clock");
//! let mut t = 100u64;
//! mockery.allow(&clock).method("now").returning(move |_| {
//!     t += 1;
//!     t
//! });
//! assert_eq!(101, clock.now());
//! assert_eq!(102, clock.now());
//! ```
//!
//! ## Matching arguments
//!
//! Argument matchers live in the [`matcher`] module.  Pass one per argument
//! to [`with`](ExpectationBuilder::with), or match the whole argument list
//! with [`withf`](ExpectationBuilder::withf).  Typed matchers are built on
//! the [`predicates`](https://docs.rs/predicates) crate, so any [`Predicate`]
//! works with [`matcher::pred`].  If several expectations match a call, the
//! one declared first wins.
//!
//! ```
//! # use decoy::*;
//! # use decoy::matcher::*;
//! #[mockable]
//! trait Greeter {
//!     fn greet(&self, name: &str, times: u32) -> String;
//! }
//!
//! let mockery = Mockery::new();
//! let greeter = mockery.mock::<MockGreeter>("greeter");
//! mockery.expect(&greeter)
//!     .method("greet")
//!     .with(vec![str_starts_with("Al"), lt(3u32)])
//!     .return_const(String::from("hi"));
//! mockery.expect(&greeter)
//!     .method("greet")
//!     .withf(|args| *args.get::<u32>(1) >= 3)
//!     .return_const(String::from("hi hi hi"));
//! assert_eq!("hi", greeter.greet("Alice", 1));
//! assert_eq!("hi hi hi", greeter.greet("Bob", 3));
//! ```
//!
//! ## Call counts
//!
//! [`expect`](Mockery::expect) requires exactly one call, unless told
//! otherwise with [`times`](ExpectationBuilder::times), which accepts a
//! number or any kind of range.  [`allow`](Mockery::allow) starts out
//! permitting any number of calls.  An expectation that has used up its
//! calls no longer matches, so later expectations for the same method take
//! over.
//!
//! ```
//! # use decoy::*;
//! let mockery = Mockery::new();
//! let dice = mockery.mock::<MockObject>("dice");
//! mockery.expect(&dice).method("roll").times(2).return_const(6u8);
//! mockery.expect(&dice).method("roll").times(1..).return_const(1u8);
//! let roll = || dice.returned::<u8>(dice.invoke(dice.call("roll")));
//! assert_eq!(6, roll());
//! assert_eq!(6, roll());
//! assert_eq!(1, roll());
//! ```
//!
//! ## Ordering
//!
//! By default expectations may be satisfied in any order.  While the guard
//! returned by [`Mockery::ordered`] lives, new expectations must be satisfied
//! in the order they are declared; [`Mockery::unordered`] nests an unordered
//! group inside an ordered one.  An expectation in an ordered group may be
//! skipped once it has been called often enough.
//!
//! To order expectations independently of where they are declared, add
//! them to a named [`Sequence`].  Sequences may span several mock objects.
//!
//! ```should_panic
//! # use decoy::*;
//! let mockery = Mockery::new();
//! let turtle = mockery.mock::<MockObject>("turtle");
//! {
//!     let _g = mockery.ordered();
//!     mockery.expect(&turtle).method("pen_down");
//!     mockery.expect(&turtle).method("forward");
//! }
//! // Panics: pen_down must come first
//! turtle.invoke(turtle.call("forward"));
//! ```
//!
//! ## States
//!
//! A [`StateMachine`] is a named variable that expectations can require with
//! [`when`](ExpectationBuilder::when) and change with
//! [`then`](ExpectationBuilder::then).  See the [`state`] module.
//!
//! ## Reference arguments
//!
//! `&T` arguments are recorded as owned copies, so matchers see `T` (and
//! `&str` arguments are seen as `String`).  `&mut T` arguments are in/out
//! arguments: matchers see the incoming value, and actions like
//! [`set_arg`](ExpectationBuilder::set_arg) can replace it.
//!
//! ```
//! # use decoy::*;
//! #[mockable]
//! trait Reader {
//!     fn read(&self, buf: &mut Vec<u8>) -> usize;
//! }
//!
//! let mockery = Mockery::new();
//! let reader = mockery.mock::<MockReader>("reader");
//! mockery.expect(&reader)
//!     .method("read")
//!     .set_arg(0, vec![1u8, 2, 3])
//!     .return_const(3usize);
//! let mut buf = Vec::new();
//! assert_eq!(3, reader.read(&mut buf));
//! assert_eq!(vec![1, 2, 3], buf);
//! ```
//!
//! ## Checkpoints
//!
//! [`Mockery::checkpoint`] verifies every expectation so far and then
//! discards them, so a test can proceed in phases.  State machines keep
//! their states across a checkpoint.
//!
//! ## Manual mocks
//!
//! [`#[mockable]`](mockable) can't handle every trait.  Generic methods,
//! methods returning references, `async fn`s and associated types must be
//! mocked by hand: wrap a [`MockObject`], implement [`Mock`], and build an
//! [`Invocation`] for each call.
//!
//! ```
//! # use decoy::*;
//! struct MockCache(MockObject);
//!
//! impl Mock for MockCache {
//!     fn from_object(object: MockObject) -> Self {
//!         MockCache(object)
//!     }
//!     fn mock_object(&self) -> &MockObject {
//!         &self.0
//!     }
//! }
//!
//! impl MockCache {
//!     fn get<T: Value + Clone>(&self, key: &str) -> Option<T> {
//!         let call = self.0.call("get").arg("key", key.to_owned());
//!         self.0.returned(self.0.invoke(call))
//!     }
//! }
//!
//! let mockery = Mockery::new();
//! let cache = mockery.mock::<MockCache>("cache");
//! mockery.expect(&cache)
//!     .method("get")
//!     .with_args(["answer"])
//!     .return_const(Some(42u32));
//! assert_eq!(Some(42u32), cache.get("answer"));
//! ```
//!
//! ## Crate features
//!
//! * **nightly** - Methods whose expectation supplies no return value will
//!   return `Default::default()` if the return type implements `Default`.
//!   Requires the nightly compiler.
//!
//! ## Logging
//!
//! Decoy emits [`tracing`](https://docs.rs/tracing) events under the `decoy`
//! target.  It never installs a subscriber.

#![cfg_attr(feature = "nightly", feature(specialization))]
#![cfg_attr(feature = "nightly", allow(incomplete_features))]

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod action;
mod cardinality;
mod dispatch;
mod error;
mod expectation;
mod group;
mod invocation;
pub mod matcher;
mod mockery;
mod sequence;
pub mod state;
mod value;

pub use action::{Action, Captor};
pub use cardinality::Cardinality;
pub use decoy_derive::mockable;
pub use error::MockError;
pub use invocation::{
    DefaultReturner, Invocation, ObjectId, Outcome, Receiver, ReturnDefault
};
pub use mockery::{
    Config, ExpectationBuilder, GroupGuard, Mock, MockObject, Mockery
};
pub use predicates::prelude::{Predicate, predicate};
pub use sequence::Sequence;
pub use state::{State, StateMachine, StatePredicate};
pub use value::{Arg, Arguments, Direction, Extract, Value};

/// Lock a mutex, ignoring poison.  A panicking test thread must not make
/// every other thread that shares its mocks panic too.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
