// vim: tw=80
//! Cross-object ordering of expectations.

use std::{fmt, sync::Arc};

use crate::{
    expectation::{Expectation, ExpectationId},
    group::Group,
    mockery::Shared
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct SequenceId(usize);

/// Every sequence of one [`Mockery`](crate::Mockery), as the expectations
/// appended to each, in order.  Names live in the [`Sequence`] handles.
#[derive(Default)]
pub(crate) struct Sequences(Vec<Vec<ExpectationId>>);

impl Sequences {
    pub(crate) fn add(&mut self) -> SequenceId {
        self.0.push(Vec::new());
        SequenceId(self.0.len() - 1)
    }

    pub(crate) fn append(&mut self, id: SequenceId, e: ExpectationId) {
        if let Some(m) = self.0.get_mut(id.0) {
            m.push(e);
        }
    }

    /// May expectation `e` be invoked now, as far as sequence `id` is
    /// concerned?
    ///
    /// Every member before `e` must be satisfied, and no member after it may
    /// have been invoked yet.  Members no longer present in `root` (discarded
    /// by a checkpoint) are ignored.
    pub(crate) fn allows(&self, id: SequenceId, e: ExpectationId, root: &Group)
        -> bool
    {
        let Some(members) = self.0.get(id.0) else {
            return true;
        };
        let Some(pos) = members.iter().position(|m| *m == e) else {
            return true;
        };
        let before = &members[..pos];
        let after = &members[pos + 1..];
        let earlier_met = before.iter()
            .filter_map(|m| root.find(*m))
            .all(Expectation::is_met);
        let later_idle = after.iter()
            .filter_map(|m| root.find(*m))
            .all(|x| x.calls() == 0);
        earlier_met && later_idle
    }

    /// Forget every member, keeping the sequences themselves so existing
    /// handles stay usable.
    pub(crate) fn clear(&mut self) {
        for m in self.0.iter_mut() {
            m.clear();
        }
    }
}

/// A handle to a named sequence, returned by
/// [`Mockery::sequence`](crate::Mockery::sequence).
///
/// Expectations added to a sequence with
/// [`in_sequence`](crate::ExpectationBuilder::in_sequence) must be invoked in
/// the order they were added, even when they belong to different mock
/// objects.
///
/// # Examples
/// ```
/// # use decoy::*;
/// let mockery = Mockery::new();
/// let door = mockery.mock::<MockObject>("door");
/// let lamp = mockery.mock::<MockObject>("lamp");
/// let evening = mockery.sequence("evening");
///
/// mockery.expect(&door).method("open").in_sequence(&evening);
/// mockery.expect(&lamp).method("switch_on").in_sequence(&evening);
///
/// door.invoke(door.call("open"));
/// lamp.invoke(lamp.call("switch_on"));
/// ```
#[derive(Clone)]
pub struct Sequence {
    id: SequenceId,
    name: Arc<str>,
    shared: Arc<Shared>,
}

impl Sequence {
    pub(crate) fn new(shared: Arc<Shared>, name: &str) -> Self {
        let id = shared.dispatcher().sequences.add();
        Sequence { id, name: Arc::from(name), shared }
    }

    pub(crate) fn id(&self) -> SequenceId {
        self.id
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Sequence").field(&self.name).finish()
    }
}
