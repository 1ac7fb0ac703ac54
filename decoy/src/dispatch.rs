// vim: tw=80
//! The dispatcher: matches invocations against expectations and reports what
//! went wrong.

use std::{
    collections::VecDeque,
    fmt::Write,
    sync::{Arc, Mutex}
};
use tracing::{debug, trace, warn};

use crate::{
    action::Action,
    error::MockError,
    expectation::{Context, Expectation, ExpectationId},
    group::{Group, GroupId, Kind, Node},
    invocation::{Invocation, ObjectId, Receiver},
    mockery::Config,
    sequence::Sequences,
    state::States
};

pub(crate) type Actions = Arc<Mutex<Vec<Box<dyn Action>>>>;

/// Everything a [`Mockery`](crate::Mockery) knows, behind its lock.
pub(crate) struct Dispatcher {
    pub(crate) config: Config,
    pub(crate) root: Group,
    /// Groups opened by live `GroupGuard`s, innermost last
    open: Vec<GroupId>,
    pub(crate) states: States,
    pub(crate) sequences: Sequences,
    history: VecDeque<String>,
    /// The first failure, kept so verification can report it again
    failure: Option<MockError>,
    next_id: usize,
}

impl Dispatcher {
    pub(crate) fn new(config: Config) -> Self {
        Dispatcher {
            config,
            root: Group::root(),
            open: Vec::new(),
            states: States::default(),
            sequences: Sequences::default(),
            history: VecDeque::new(),
            failure: None,
            // 0 belongs to the root group
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn new_object(&mut self) -> ObjectId {
        ObjectId(self.next_id())
    }

    /// Add to the innermost open group.
    fn push(&mut self, node: Node) {
        let id = self.open.last().copied().unwrap_or(GroupId(0));
        match self.root.group_mut(id) {
            Some(g) => g.push(node),
            None => self.root.push(node),
        }
    }

    pub(crate) fn add_expectation(&mut self, receiver: Receiver)
        -> ExpectationId
    {
        let id = ExpectationId(self.next_id());
        trace!(receiver = %receiver, id = id.0, "new expectation");
        let e = Expectation::new(id, receiver);
        self.push(Node::Leaf(e));
        id
    }

    pub(crate) fn expectation_mut(&mut self, id: ExpectationId)
        -> Option<&mut Expectation>
    {
        self.root.find_mut(id)
    }

    pub(crate) fn open_group(&mut self, kind: Kind) -> GroupId {
        let id = GroupId(self.next_id());
        trace!(id = id.0, ?kind, "new group");
        self.push(Node::Group(Group::new(id, kind)));
        self.open.push(id);
        id
    }

    pub(crate) fn close_group(&mut self, id: GroupId) {
        if let Some(i) = self.open.iter().rposition(|g| *g == id) {
            self.open.remove(i);
        }
    }

    /// Find and perform the expectation for `inv`.  Returns the actions that
    /// the caller must run once the lock is released.
    pub(crate) fn dispatch(&mut self, inv: &Invocation)
        -> Result<Actions, MockError>
    {
        let path = self.root.select(inv, &Context {
            states: &self.states,
            sequences: &self.sequences,
            root: &self.root,
        });
        let performed = path.and_then(|p| self.root.perform(&p)).map(|e| {
            e.record();
            debug!(invocation = %inv, expectation = %e, "dispatched");
            (e.then.clone(), e.actions.clone())
        });
        let Some((transitions, actions)) = performed else {
            return Err(self.unexpected(inv));
        };
        for state in transitions.iter() {
            self.states.set(state);
        }
        self.remember(inv);
        Ok(actions)
    }

    fn remember(&mut self, inv: &Invocation) {
        if self.config.history_limit == 0 {
            return;
        }
        while self.history.len() >= self.config.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(inv.to_string());
    }

    /// Build the report for an invocation that nothing matched, and record it
    /// as a failure.
    fn unexpected(&mut self, inv: &Invocation) -> MockError {
        let mut report = String::new();
        self.describe(&mut report);
        let ctx = Context {
            states: &self.states,
            sequences: &self.sequences,
            root: &self.root,
        };
        let mut mismatches = Vec::new();
        self.root.mismatches(inv, &ctx, true, &mut mismatches);
        if !mismatches.is_empty() {
            report.push_str("why they did not match:\n");
            for (e, m) in mismatches {
                let _ = writeln!(report, "  {}\n    {}", e, m);
            }
        }
        if !self.history.is_empty() {
            report.push_str("what happened before this:\n");
            for h in self.history.iter() {
                let _ = writeln!(report, "  {}", h);
            }
        }
        let e = MockError::UnexpectedInvocation {
            invocation: inv.to_string(),
            report
        };
        warn!(invocation = %inv, "unexpected invocation");
        self.fail(e.clone());
        e
    }

    /// Record a failure, unless an earlier one is already recorded.
    pub(crate) fn fail(&mut self, e: MockError) {
        if self.failure.is_none() {
            self.failure = Some(e);
        }
    }

    /// Expectations and states, as listed by every report.
    fn describe(&self, out: &mut String) {
        out.push_str("expectations:\n");
        if self.root.is_empty() {
            out.push_str("  none\n");
        } else {
            self.root.describe(out, 1);
        }
        if !self.states.is_empty() {
            out.push_str("states:\n");
            let _ = write!(out, "{}", self.states);
        }
    }

    pub(crate) fn verify(&self) -> Result<(), MockError> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        if self.root.is_met() {
            return Ok(());
        }
        let mut report = String::new();
        self.describe(&mut report);
        warn!("not all expectations were satisfied");
        Err(MockError::Unsatisfied { report })
    }

    /// Forget every expectation and sequence member.  States, the recorded
    /// failure and the history survive.
    pub(crate) fn clear(&mut self) {
        self.root.clear();
        self.open.clear();
        self.sequences.clear();
    }
}
