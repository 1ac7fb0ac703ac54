// vim: tw=80
use fragile::Fragile;
use std::{
    cell::RefCell,
    fmt,
    marker::PhantomData,
    sync::{Arc, Mutex, MutexGuard},
    thread
};
use tracing::{debug, trace};

use crate::{
    action::{self, Action, Captor},
    cardinality::Cardinality,
    dispatch::{Actions, Dispatcher},
    error::MockError,
    expectation::{ArgsMatcher, Expectation, ExpectationId, MethodMatcher},
    group::{GroupId, Kind},
    invocation::{Invocation, Receiver},
    lock,
    matcher::Matcher,
    sequence::Sequence,
    state::{State, StateMachine, StatePredicate},
    value::{Arguments, Value}
};

thread_local! {
    /// Action lists being performed on this thread, innermost last.
    static RUNNING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks one expectation's actions as running on the current thread.
struct Running(usize);

impl Running {
    /// `None` if this thread is already inside those actions.
    fn enter(actions: &Actions) -> Option<Running> {
        let key = Arc::as_ptr(actions) as *const () as usize;
        RUNNING.with(|r| {
            let mut r = r.borrow_mut();
            if r.contains(&key) {
                None
            } else {
                r.push(key);
                Some(Running(key))
            }
        })
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        RUNNING.with(|r| r.borrow_mut().retain(|k| *k != self.0));
    }
}

/// Tunables for a [`Mockery`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Verify when the `Mockery` is dropped, unless the thread is already
    /// panicking.
    pub verify_on_drop: bool,
    /// How many past invocations to list in unexpected-invocation reports.
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { verify_on_drop: true, history_limit: 32 }
    }
}

pub(crate) struct Shared {
    dispatcher: Mutex<Dispatcher>,
}

impl Shared {
    pub(crate) fn dispatcher(&self) -> MutexGuard<'_, Dispatcher> {
        lock(&self.dispatcher)
    }
}

/// Owns all expectations, states and sequences of a test, and the mock
/// objects that are checked against them.
///
/// # Examples
/// ```
/// # use decoy::*;
/// let mockery = Mockery::new();
/// let turtle = mockery.mock::<MockObject>("turtle");
/// mockery.expect(&turtle)
///     .method("forward")
///     .with(vec![matcher::gt(0i32)])
///     .times(2);
///
/// turtle.invoke(turtle.call("forward").arg("distance", 10i32));
/// turtle.invoke(turtle.call("forward").arg("distance", 5i32));
/// mockery.verify();
/// ```
pub struct Mockery {
    shared: Arc<Shared>,
}

impl Mockery {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let dispatcher = Mutex::new(Dispatcher::new(config));
        Mockery { shared: Arc::new(Shared { dispatcher }) }
    }

    /// Create a mock object named `name`.  `M` is usually a type generated
    /// by [`#[mockable]`](crate::mockable), or plain [`MockObject`].
    pub fn mock<M: Mock>(&self, name: &str) -> M {
        let id = self.shared.dispatcher().new_object();
        trace!(name, "new mock object");
        let receiver = Receiver { id, name: Arc::from(name) };
        M::from_object(MockObject { receiver, shared: self.shared.clone() })
    }

    fn check_owner<M: Mock + ?Sized>(&self, mock: &M) -> Receiver {
        let object = mock.mock_object();
        assert!(Arc::ptr_eq(&object.shared, &self.shared),
            "{} belongs to a different Mockery", object.receiver);
        object.receiver.clone()
    }

    fn add<M: Mock + ?Sized>(&self, mock: &M) -> ExpectationBuilder<'_> {
        let receiver = self.check_owner(mock);
        let id = self.shared.dispatcher().add_expectation(receiver);
        ExpectationBuilder { mockery: self, id }
    }

    /// Expect a call on `mock`.  By default the expectation accepts any
    /// method and arguments, and must be called exactly once.
    pub fn expect<M: Mock + ?Sized>(&self, mock: &M) -> ExpectationBuilder<'_>
    {
        self.add(mock)
    }

    /// Allow calls on `mock` any number of times, including never.
    pub fn allow<M: Mock + ?Sized>(&self, mock: &M) -> ExpectationBuilder<'_> {
        let mut b = self.add(mock);
        b.times(..);
        b
    }

    /// Allow any method of `mock` to be called any number of times.
    pub fn ignore<M: Mock + ?Sized>(&self, mock: &M) -> ExpectationBuilder<'_>
    {
        self.allow(mock)
    }

    fn open(&self, kind: Kind) -> GroupGuard<'_> {
        let id = self.shared.dispatcher().open_group(kind);
        GroupGuard { mockery: self, id, _not_send: PhantomData }
    }

    /// Until the returned guard is dropped, new expectations must be
    /// satisfied in the order they are declared.
    ///
    /// # Examples
    /// ```
    /// # use decoy::*;
    /// let mockery = Mockery::new();
    /// let turtle = mockery.mock::<MockObject>("turtle");
    /// {
    ///     let _g = mockery.ordered();
    ///     mockery.expect(&turtle).method("pen_down");
    ///     mockery.expect(&turtle).method("forward");
    ///     mockery.expect(&turtle).method("pen_up");
    /// }
    /// turtle.invoke(turtle.call("pen_down"));
    /// turtle.invoke(turtle.call("forward"));
    /// turtle.invoke(turtle.call("pen_up"));
    /// ```
    pub fn ordered(&self) -> GroupGuard<'_> {
        self.open(Kind::Ordered)
    }

    /// Until the returned guard is dropped, new expectations may be satisfied
    /// in any order.  Useful inside [`ordered`](Self::ordered).
    pub fn unordered(&self) -> GroupGuard<'_> {
        self.open(Kind::Unordered)
    }

    /// Create a named sequence, which can order expectations across mock
    /// objects.
    pub fn sequence(&self, name: &str) -> Sequence {
        trace!(name, "new sequence");
        Sequence::new(self.shared.clone(), name)
    }

    /// Create a named state machine with no current state.
    pub fn states(&self, name: &str) -> StateMachine {
        trace!(name, "new state machine");
        StateMachine::new(self.shared.clone(), name)
    }

    /// Check that no unexpected invocation happened and that every
    /// expectation has been satisfied.
    pub fn try_verify(&self) -> Result<(), MockError> {
        self.shared.dispatcher().verify()
    }

    /// Like [`try_verify`](Self::try_verify), but panics on failure.
    pub fn verify(&self) {
        if let Err(e) = self.try_verify() {
            panic!("{}", e);
        }
    }

    /// Verify, then discard every expectation and sequence member.  State
    /// machines keep their current states.
    pub fn checkpoint(&self) {
        let mut dispatcher = self.shared.dispatcher();
        let r = dispatcher.verify();
        dispatcher.clear();
        drop(dispatcher);
        debug!("checkpoint");
        if let Err(e) = r {
            panic!("{}", e);
        }
    }
}

impl Default for Mockery {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mockery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Mockery").finish_non_exhaustive()
    }
}

impl Drop for Mockery {
    fn drop(&mut self) {
        let verify_on_drop = self.shared.dispatcher().config.verify_on_drop;
        if verify_on_drop && !thread::panicking() {
            self.verify();
        }
    }
}

/// Scopes an ordered or unordered group.  Returned by
/// [`Mockery::ordered`] and [`Mockery::unordered`].
#[must_use = "the group closes as soon as the guard is dropped"]
pub struct GroupGuard<'m> {
    mockery: &'m Mockery,
    id: GroupId,
    // Groups are per-thread scopes
    _not_send: PhantomData<*const ()>,
}

impl fmt::Debug for GroupGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GroupGuard").field("id", &self.id.0).finish()
    }
}

impl Drop for GroupGuard<'_> {
    fn drop(&mut self) {
        self.mockery.shared.dispatcher().close_group(self.id);
    }
}

/// Anything that wraps a [`MockObject`].
///
/// Implemented by the structs that [`#[mockable]`](crate::mockable)
/// generates, and by `MockObject` itself.
pub trait Mock {
    fn from_object(object: MockObject) -> Self where Self: Sized;
    fn mock_object(&self) -> &MockObject;
}

/// The untyped core of every mock object.  Routes invocations to its
/// [`Mockery`].
#[derive(Clone)]
pub struct MockObject {
    receiver: Receiver,
    shared: Arc<Shared>,
}

impl MockObject {
    pub fn receiver(&self) -> Receiver {
        self.receiver.clone()
    }

    pub fn name(&self) -> &str {
        self.receiver.name()
    }

    /// Start building an invocation of `method` on this object.
    pub fn call(&self, method: &'static str) -> Invocation {
        Invocation::new(self.receiver(), method)
    }

    /// Dispatch `invocation` and perform the matched expectation's actions.
    ///
    /// Actions run after the dispatcher is unlocked, so they may call other
    /// mock objects of the same `Mockery`.  A nested call that lands on the
    /// expectation whose actions are already running on this thread fails
    /// with [`MockError::Reentrant`].  Failures are also recorded with the
    /// `Mockery`.
    pub fn try_invoke(&self, mut invocation: Invocation)
        -> Result<Invocation, MockError>
    {
        let actions = self.shared.dispatcher().dispatch(&invocation)?;
        let r = match Running::enter(&actions) {
            Some(_running) => {
                let mut actions = lock(&actions);
                let r = actions.iter_mut()
                    .try_for_each(|a| a.invoke(&mut invocation));
                r.map_err(|cause| MockError::ActionFailed {
                    invocation: invocation.to_string(),
                    cause: Box::new(cause),
                })
            }
            None => Err(MockError::Reentrant {
                invocation: invocation.to_string()
            })
        };
        match r {
            Ok(()) => Ok(invocation),
            Err(e) => {
                self.shared.dispatcher().fail(e.clone());
                Err(e)
            }
        }
    }

    /// Extract the return value of a finished invocation.
    ///
    /// Unlike [`Invocation::returned`], a missing or mistyped return value is
    /// also recorded with the `Mockery`, so verification reports it even if
    /// the panic is caught by the code under test.
    pub fn returned<R: 'static>(&self, invocation: Invocation) -> R {
        match invocation.try_returned() {
            Ok(r) => r,
            Err(e) => {
                self.shared.dispatcher().fail(e.clone());
                panic!("{}", e);
            }
        }
    }

    /// Like [`try_invoke`](Self::try_invoke), but panics on failure.
    pub fn invoke(&self, invocation: Invocation) -> Invocation {
        match self.try_invoke(invocation) {
            Ok(i) => i,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Mock for MockObject {
    fn from_object(object: MockObject) -> Self {
        object
    }

    fn mock_object(&self) -> &MockObject {
        self
    }
}

impl fmt::Debug for MockObject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("MockObject").field(&self.receiver.name()).finish()
    }
}

/// Configures one expectation.  Returned by [`Mockery::expect`],
/// [`Mockery::allow`] and [`Mockery::ignore`].
///
/// The expectation is registered as soon as the builder is created; every
/// method updates it in place.
pub struct ExpectationBuilder<'m> {
    mockery: &'m Mockery,
    id: ExpectationId,
}

impl ExpectationBuilder<'_> {
    fn update<F: FnOnce(&mut Expectation)>(&mut self, f: F) -> &mut Self {
        let mut dispatcher = self.mockery.shared.dispatcher();
        match dispatcher.expectation_mut(self.id) {
            Some(e) => f(e),
            None => panic!("Expectation was discarded by a checkpoint"),
        }
        self
    }

    /// Expect the method named `name`.
    pub fn method(&mut self, name: &'static str) -> &mut Self {
        self.update(|e| e.method = MethodMatcher::Named(name))
    }

    /// Expect any method whose name `m` matches.
    pub fn method_matching(&mut self, m: Matcher) -> &mut Self {
        self.update(|e| e.method = MethodMatcher::Matching(m))
    }

    /// Expect exactly these arguments, one matcher per argument.
    pub fn with(&mut self, matchers: Vec<Matcher>) -> &mut Self {
        self.update(|e| e.args = ArgsMatcher::Each(matchers))
    }

    /// Expect arguments equal to these values.
    pub fn with_args<I, T>(&mut self, values: I) -> &mut Self
        where I: IntoIterator<Item = T>, T: Value + PartialEq
    {
        let matchers = values.into_iter().map(crate::matcher::eq).collect();
        self.with(matchers)
    }

    /// Expect a call with no arguments.
    pub fn with_no_args(&mut self) -> &mut Self {
        self.with(Vec::new())
    }

    /// Accept argument lists for which `f` returns true.
    pub fn withf<F>(&mut self, f: F) -> &mut Self
        where F: Fn(&Arguments) -> bool + Send + 'static
    {
        self.update(|e| e.args = ArgsMatcher::Fn(Box::new(f)))
    }

    /// Require and allow this many calls.  Accepts a `usize` or any range.
    pub fn times<C: Into<Cardinality>>(&mut self, c: C) -> &mut Self {
        let c = c.into();
        self.update(|e| e.cardinality = c)
    }

    pub fn once(&mut self) -> &mut Self {
        self.times(1)
    }

    /// Forbid calls.
    pub fn never(&mut self) -> &mut Self {
        self.times(0)
    }

    /// Allow any number of calls, including none.
    pub fn times_any(&mut self) -> &mut Self {
        self.times(..)
    }

    pub fn at_least(&mut self, n: usize) -> &mut Self {
        self.times(n..)
    }

    pub fn at_most(&mut self, n: usize) -> &mut Self {
        self.times(..=n)
    }

    /// Require and allow a number of calls in the half-open range.
    pub fn times_range(&mut self, range: std::ops::Range<usize>) -> &mut Self {
        self.times(range)
    }

    /// Only match while `pred` holds.
    pub fn when<P: Into<StatePredicate>>(&mut self, pred: P) -> &mut Self {
        let pred = pred.into();
        self.check_state(pred.state());
        self.update(|e| e.when.push(pred))
    }

    /// Move a state machine to `state` whenever this expectation is
    /// performed.
    pub fn then(&mut self, state: State) -> &mut Self {
        self.check_state(&state);
        self.update(|e| e.then.push(state))
    }

    fn check_state(&self, state: &State) {
        assert!(state.belongs_to(&self.mockery.shared),
            "State {} belongs to a different Mockery", state);
    }

    /// Append this expectation to `seq`.
    pub fn in_sequence(&mut self, seq: &Sequence) -> &mut Self {
        assert!(Arc::ptr_eq(seq.shared(), &self.mockery.shared),
            "Sequence {:?} belongs to a different Mockery", seq.name());
        let id = self.id;
        {
            let mut dispatcher = self.mockery.shared.dispatcher();
            dispatcher.sequences.append(seq.id(), id);
        }
        let name = Arc::from(seq.name());
        self.update(|e| e.sequences.push((seq.id(), name)))
    }

    /// Add an action.  Actions run in the order they are added.
    pub fn will<A: Action + 'static>(&mut self, action: A) -> &mut Self {
        let mut actions = None;
        self.update(|e| actions = Some(e.actions.clone()));
        if let Some(actions) = actions {
            lock(&actions).push(Box::new(action));
        }
        self
    }

    /// Return a clone of `c` every time.
    pub fn return_const<R>(&mut self, c: R) -> &mut Self
        where R: Clone + Send + 'static
    {
        self.will(action::ReturnConst(c))
    }

    /// Return whatever `f` computes from the invocation.
    pub fn returning<F, R>(&mut self, f: F) -> &mut Self
        where F: FnMut(&Invocation) -> R + Send + 'static,
              R: Send + 'static
    {
        self.will(action::Returning(f, PhantomData))
    }

    /// Return the result of a closure that may only be called once.  Useful
    /// for return values that are not `Clone`.
    pub fn return_once<F, R>(&mut self, f: F) -> &mut Self
        where F: FnOnce(&Invocation) -> R + Send + 'static,
              R: Send + 'static
    {
        self.will(action::ReturnOnce(Some(f), PhantomData))
    }

    /// Single-threaded version of [`returning`](Self::returning), for
    /// closures or return types that are not `Send`.
    ///
    /// It is a runtime error to call the mock method from a different thread
    /// than the one that configured it.
    pub fn returning_st<F, R>(&mut self, f: F) -> &mut Self
        where F: FnMut(&Invocation) -> R + 'static,
              R: 'static
    {
        self.will(action::ReturningSt(Fragile::new(f), PhantomData))
    }

    /// Make the mock method panic with `msg`.
    pub fn panicking<S: Into<String>>(&mut self, msg: S) -> &mut Self {
        self.raising(msg.into())
    }

    /// Make the mock method unwind with a clone of `payload`, which can be
    /// recovered with [`std::panic::catch_unwind`].
    pub fn raising<P>(&mut self, payload: P) -> &mut Self
        where P: Clone + fmt::Debug + Send + 'static
    {
        self.will(action::Raising(payload))
    }

    /// Write `value` into the `Out` or `Ref` argument at `index`.
    pub fn set_arg<T: Value + Clone>(&mut self, index: usize, value: T)
        -> &mut Self
    {
        self.will(action::SetArg { index, value })
    }

    /// Write `value` into the `Out` or `Ref` argument named `name`.
    pub fn set_named_arg<T>(&mut self, name: &'static str, value: T)
        -> &mut Self
        where T: Value + Clone
    {
        self.will(action::SetNamedArg { name, value })
    }

    /// Record a copy of the argument at `index` in `captor`.
    pub fn capture_arg<T>(&mut self, index: usize, captor: &Captor<T>)
        -> &mut Self
        where T: Value + Clone
    {
        self.will(action::CaptureArg { index, captor: captor.clone() })
    }

    /// Run an arbitrary side effect, which may inspect and modify the
    /// invocation.
    pub fn doing<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(&mut Invocation) + Send + 'static
    {
        self.will(action::Doing(f))
    }
}

impl fmt::Debug for ExpectationBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExpectationBuilder").field("id", &self.id.0).finish()
    }
}
