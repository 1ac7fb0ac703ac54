// vim: tw=80
//! A single expected invocation and everything that constrains it.

use std::{
    fmt,
    sync::{Arc, Mutex}
};

use crate::{
    action::Action,
    cardinality::{Cardinality, invoked},
    group::Group,
    invocation::{Invocation, Receiver},
    matcher::Matcher,
    sequence::{SequenceId, Sequences},
    state::{State, StatePredicate, States},
    value::Arguments
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct ExpectationId(pub(crate) usize);

/// Everything outside of an expectation that decides whether it may match.
pub(crate) struct Context<'a> {
    pub(crate) states: &'a States,
    pub(crate) sequences: &'a Sequences,
    pub(crate) root: &'a Group,
}

/// Which methods an expectation accepts.
pub(crate) enum MethodMatcher {
    Any,
    Named(&'static str),
    Matching(Matcher),
}

impl MethodMatcher {
    fn matches(&self, method: &'static str) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Named(name) => *name == method,
            MethodMatcher::Matching(m) => m.matches(&method),
        }
    }
}

impl fmt::Display for MethodMatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MethodMatcher::Any => f.write_str("<any method>"),
            MethodMatcher::Named(name) => f.write_str(name),
            MethodMatcher::Matching(m) => write!(f, "<method {}>", m),
        }
    }
}

/// Which argument lists an expectation accepts.
pub(crate) enum ArgsMatcher {
    Any,
    /// One matcher per argument, and exactly as many arguments as matchers
    Each(Vec<Matcher>),
    Fn(Box<dyn Fn(&Arguments) -> bool + Send>),
}

impl ArgsMatcher {
    fn matches(&self, args: &Arguments) -> bool {
        match self {
            ArgsMatcher::Any => true,
            ArgsMatcher::Each(matchers) => matchers.len() == args.len() &&
                matchers.iter()
                    .zip(args.iter())
                    .all(|(m, a)| m.matches(a.value())),
            ArgsMatcher::Fn(f) => f(args),
        }
    }

    fn mismatch(&self, args: &Arguments) -> Option<Mismatch> {
        match self {
            ArgsMatcher::Any => None,
            ArgsMatcher::Each(matchers) if matchers.len() != args.len() =>
                Some(Mismatch::ArgCount {
                    expected: matchers.len(),
                    actual: args.len()
                }),
            ArgsMatcher::Each(matchers) => matchers.iter()
                .zip(args.iter())
                .enumerate()
                .find(|(_, (m, a))| !m.matches(a.value()))
                .map(|(index, (m, a))| Mismatch::Argument {
                    index,
                    explanation: m.explain(a.value())
                }),
            ArgsMatcher::Fn(f) if !f(args) => Some(Mismatch::Args),
            ArgsMatcher::Fn(_) => None,
        }
    }
}

impl fmt::Display for ArgsMatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArgsMatcher::Any => f.write_str(".."),
            ArgsMatcher::Each(matchers) => {
                for (i, m) in matchers.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
            ArgsMatcher::Fn(_) => f.write_str("<withf>"),
        }
    }
}

/// Why an expectation did not accept an invocation.
#[derive(Debug)]
pub(crate) enum Mismatch {
    Receiver,
    Method,
    Exhausted(Cardinality),
    ArgCount { expected: usize, actual: usize },
    Argument { index: usize, explanation: String },
    Args,
    State(StatePredicate),
    Sequence(Arc<str>),
    /// An ordered group isn't ready for this expectation
    Order,
}

impl Mismatch {
    /// Is this worth telling the user about?  An expectation for a different
    /// object or method is just noise.
    pub(crate) fn is_relevant(&self) -> bool {
        !matches!(self, Mismatch::Receiver | Mismatch::Method)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mismatch::Receiver => f.write_str("different receiver"),
            Mismatch::Method => f.write_str("different method"),
            Mismatch::Exhausted(c) =>
                write!(f, "already invoked the maximum number of times ({})",
                       c),
            Mismatch::ArgCount { expected, actual } =>
                write!(f, "expected {} arguments, but got {}", expected,
                       actual),
            Mismatch::Argument { index, explanation } =>
                write!(f, "argument {}: {}", index, explanation),
            Mismatch::Args => f.write_str("arguments rejected by withf"),
            Mismatch::State(p) => write!(f, "precondition {} is false", p),
            Mismatch::Sequence(name) =>
                write!(f, "out of order in sequence {:?}", name),
            Mismatch::Order =>
                f.write_str("not allowed at this point of an ordered group"),
        }
    }
}

/// One expected invocation.
pub(crate) struct Expectation {
    id: ExpectationId,
    receiver: Receiver,
    pub(crate) cardinality: Cardinality,
    pub(crate) method: MethodMatcher,
    pub(crate) args: ArgsMatcher,
    pub(crate) when: Vec<StatePredicate>,
    pub(crate) then: Vec<State>,
    pub(crate) sequences: Vec<(SequenceId, Arc<str>)>,
    pub(crate) actions: Arc<Mutex<Vec<Box<dyn Action>>>>,
    calls: usize,
}

impl Expectation {
    pub(crate) fn new(id: ExpectationId, receiver: Receiver) -> Self {
        Expectation {
            id,
            receiver,
            cardinality: Cardinality::default(),
            method: MethodMatcher::Any,
            args: ArgsMatcher::Any,
            when: Vec::new(),
            then: Vec::new(),
            sequences: Vec::new(),
            actions: Arc::new(Mutex::new(Vec::new())),
            calls: 0,
        }
    }

    pub(crate) fn id(&self) -> ExpectationId {
        self.id
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls
    }

    /// Can this expectation accept another call?
    pub(crate) fn is_active(&self) -> bool {
        self.cardinality.allows_more(self.calls)
    }

    /// Has this expectation been called often enough?
    pub(crate) fn is_met(&self) -> bool {
        self.cardinality.is_satisfied(self.calls)
    }

    pub(crate) fn matches(&self, inv: &Invocation, ctx: &Context) -> bool {
        self.is_active()
            && self.receiver.id == inv.receiver().id
            && self.method.matches(inv.method())
            && self.args.matches(inv.arguments())
            && self.when.iter().all(|p| ctx.states.holds(p))
            && self.sequences.iter()
                .all(|(s, _)| ctx.sequences.allows(*s, self.id, ctx.root))
    }

    /// The first reason this expectation rejects `inv`, checked in the same
    /// order as [`matches`](Self::matches).
    pub(crate) fn mismatch(&self, inv: &Invocation, ctx: &Context)
        -> Option<Mismatch>
    {
        if self.receiver.id != inv.receiver().id {
            return Some(Mismatch::Receiver);
        }
        if !self.method.matches(inv.method()) {
            return Some(Mismatch::Method);
        }
        if !self.is_active() {
            return Some(Mismatch::Exhausted(self.cardinality));
        }
        if let Some(m) = self.args.mismatch(inv.arguments()) {
            return Some(m);
        }
        if let Some(p) = self.when.iter().find(|p| !ctx.states.holds(p)) {
            return Some(Mismatch::State(p.clone()));
        }
        self.sequences.iter()
            .find(|(s, _)| !ctx.sequences.allows(*s, self.id, ctx.root))
            .map(|(_, name)| Mismatch::Sequence(name.clone()))
    }

    /// Count one call.  The caller applies transitions and runs actions.
    pub(crate) fn record(&mut self) {
        self.calls += 1;
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected {}, {}: {}.{}({})", self.cardinality,
               invoked(self.calls), self.receiver, self.method, self.args)?;
        for p in self.when.iter() {
            write!(f, "; when {}", p)?;
        }
        for s in self.then.iter() {
            write!(f, "; then {}", s)?;
        }
        for (_, name) in self.sequences.iter() {
            write!(f, "; in sequence {:?}", name)?;
        }
        Ok(())
    }
}
