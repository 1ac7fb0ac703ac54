// vim: tw=80
//! State machines that gate expectations.
//!
//! A state machine is a named variable.  Expectations can require it to be in
//! (or not in) a particular state with
//! [`when`](crate::ExpectationBuilder::when), and move it to a new state when
//! they are performed with [`then`](crate::ExpectationBuilder::then).
//!
//! # Examples
//! ```
//! # use decoy::*;
//! let mockery = Mockery::new();
//! let turtle = mockery.mock::<MockObject>("turtle");
//! let pen = mockery.states("pen").starts_as("up");
//!
//! mockery.expect(&turtle).method("pen_down")
//!     .when(pen.is("up"))
//!     .then(pen.is("down"));
//! mockery.expect(&turtle).method("forward")
//!     .when(pen.is("down"));
//!
//! turtle.invoke(turtle.call("pen_down"));
//! turtle.invoke(turtle.call("forward").arg("distance", 10));
//! assert!(pen.is_in("down"));
//! ```

use std::{
    fmt,
    sync::{Arc, Weak}
};
use tracing::debug;

use crate::mockery::Shared;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct MachineId(usize);

/// A particular value of a particular state machine.
#[derive(Clone)]
pub struct State {
    machine: MachineId,
    machine_name: Arc<str>,
    name: Arc<str>,
    /// `MachineId`s are only unique within one `Mockery`.
    owner: Weak<Shared>,
}

impl State {
    pub(crate) fn belongs_to(&self, shared: &Arc<Shared>) -> bool {
        Weak::as_ptr(&self.owner) == Arc::as_ptr(shared)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("State")
            .field("machine", &self.machine_name)
            .field("name", &self.name)
            .finish()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.machine == other.machine &&
            self.name == other.name &&
            Weak::ptr_eq(&self.owner, &other.owner)
    }
}

impl Eq for State {}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} is {}", self.machine_name, self.name)
    }
}

/// A precondition on a state machine's current value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StatePredicate {
    Is(State),
    IsNot(State),
}

impl fmt::Display for StatePredicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StatePredicate::Is(s) => fmt::Display::fmt(s, f),
            StatePredicate::IsNot(s) =>
                write!(f, "{} is not {}", s.machine_name, s.name)
        }
    }
}

impl StatePredicate {
    pub(crate) fn state(&self) -> &State {
        match self {
            StatePredicate::Is(s) | StatePredicate::IsNot(s) => s
        }
    }
}

impl From<State> for StatePredicate {
    fn from(state: State) -> Self {
        StatePredicate::Is(state)
    }
}

struct Machine {
    name: Arc<str>,
    current: Option<Arc<str>>,
}

/// Every state machine of one [`Mockery`](crate::Mockery).
#[derive(Default)]
pub(crate) struct States(Vec<Machine>);

impl States {
    pub(crate) fn add(&mut self, name: &str) -> MachineId {
        self.0.push(Machine { name: Arc::from(name), current: None });
        MachineId(self.0.len() - 1)
    }

    pub(crate) fn current(&self, id: MachineId) -> Option<&str> {
        self.0.get(id.0).and_then(|m| m.current.as_deref())
    }

    pub(crate) fn set(&mut self, state: &State) {
        if let Some(m) = self.0.get_mut(state.machine.0) {
            debug!(machine = %m.name, state = %state.name, "state transition");
            m.current = Some(state.name.clone());
        }
    }

    pub(crate) fn holds(&self, pred: &StatePredicate) -> bool {
        match pred {
            StatePredicate::Is(s) =>
                self.current(s.machine) == Some(&*s.name),
            StatePredicate::IsNot(s) =>
                self.current(s.machine) != Some(&*s.name)
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for States {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for m in self.0.iter() {
            match &m.current {
                Some(c) => writeln!(f, "  {} is {}", m.name, c)?,
                None => writeln!(f, "  {} has no current state", m.name)?,
            }
        }
        Ok(())
    }
}

/// A handle to one state machine, returned by
/// [`Mockery::states`](crate::Mockery::states).
#[derive(Clone)]
pub struct StateMachine {
    id: MachineId,
    name: Arc<str>,
    shared: Arc<Shared>,
}

impl StateMachine {
    pub(crate) fn new(shared: Arc<Shared>, name: &str) -> Self {
        let id = shared.dispatcher().states.add(name);
        StateMachine { id, name: Arc::from(name), shared }
    }

    /// Set the initial state.
    pub fn starts_as(self, state: &str) -> Self {
        self.set(state);
        self
    }

    /// Move directly to `state`, outside of any expectation.
    pub fn set(&self, state: &str) {
        let s = self.is(state);
        self.shared.dispatcher().states.set(&s);
    }

    /// The state `state` of this machine, for use with
    /// [`when`](crate::ExpectationBuilder::when) and
    /// [`then`](crate::ExpectationBuilder::then).
    pub fn is(&self, state: &str) -> State {
        State {
            machine: self.id,
            machine_name: self.name.clone(),
            name: Arc::from(state),
            owner: Arc::downgrade(&self.shared),
        }
    }

    /// A precondition that holds whenever this machine is not in `state`.
    pub fn is_not(&self, state: &str) -> StatePredicate {
        StatePredicate::IsNot(self.is(state))
    }

    /// The current state, if one has been set.
    pub fn current(&self) -> Option<String> {
        self.shared.dispatcher().states.current(self.id).map(str::to_owned)
    }

    pub fn is_in(&self, state: &str) -> bool {
        self.current().as_deref() == Some(state)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("current", &self.current())
            .finish()
    }
}
