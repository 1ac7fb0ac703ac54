// vim: tw=80
//! Ordered and unordered containers of expectations.

use std::fmt::Write;

use crate::{
    expectation::{Context, Expectation, ExpectationId, Mismatch},
    invocation::Invocation
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct GroupId(pub(crate) usize);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Kind {
    /// Children may be invoked in any order.  The first matching child wins.
    Unordered,
    /// Children must be invoked in declaration order.  A child may be skipped
    /// only once it is satisfied.
    Ordered,
}

pub(crate) enum Node {
    Leaf(Expectation),
    Group(Group),
}

impl Node {
    fn select(&self, inv: &Invocation, ctx: &Context) -> Option<Vec<usize>> {
        match self {
            Node::Leaf(e) if e.matches(inv, ctx) => Some(Vec::new()),
            Node::Leaf(_) => None,
            Node::Group(g) => g.select(inv, ctx),
        }
    }

    fn is_met(&self) -> bool {
        match self {
            Node::Leaf(e) => e.is_met(),
            Node::Group(g) => g.is_met(),
        }
    }
}

pub(crate) struct Group {
    id: GroupId,
    kind: Kind,
    children: Vec<Node>,
    /// Index of the most recently invoked child of an ordered group
    cursor: usize,
}

impl Group {
    pub(crate) fn new(id: GroupId, kind: Kind) -> Self {
        Group { id, kind, children: Vec::new(), cursor: 0 }
    }

    /// The outermost group of a mockery.
    pub(crate) fn root() -> Self {
        Group::new(GroupId(0), Kind::Unordered)
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.children.clear();
        self.cursor = 0;
    }

    /// Is every child satisfied?  An ordered group doesn't care about children
    /// it has already moved past.
    pub(crate) fn is_met(&self) -> bool {
        self.candidates().iter().all(Node::is_met)
    }

    fn candidates(&self) -> &[Node] {
        match self.kind {
            Kind::Unordered => &self.children[..],
            Kind::Ordered => {
                let start = self.cursor.min(self.children.len());
                &self.children[start..]
            }
        }
    }

    /// Find the expectation that should handle `inv`.  Returns the path of
    /// child indices leading to it.
    pub(crate) fn select(&self, inv: &Invocation, ctx: &Context)
        -> Option<Vec<usize>>
    {
        match self.kind {
            Kind::Unordered => {
                self.children.iter()
                    .enumerate()
                    .find_map(|(i, c)| c.select(inv, ctx).map(|p| (i, p)))
                    .map(|(i, p)| prepend(i, p))
            }
            Kind::Ordered => {
                for (i, c) in self.children.iter().enumerate().skip(self.cursor)
                {
                    if let Some(p) = c.select(inv, ctx) {
                        return Some(prepend(i, p));
                    }
                    if !c.is_met() {
                        break;
                    }
                }
                None
            }
        }
    }

    /// Advance cursors along `path` and return the expectation at its end.
    pub(crate) fn perform(&mut self, path: &[usize])
        -> Option<&mut Expectation>
    {
        let (&i, rest) = path.split_first()?;
        if self.kind == Kind::Ordered {
            self.cursor = i;
        }
        match self.children.get_mut(i)? {
            Node::Leaf(e) => Some(e),
            Node::Group(g) => g.perform(rest),
        }
    }

    pub(crate) fn find(&self, id: ExpectationId) -> Option<&Expectation> {
        self.children.iter().find_map(|c| match c {
            Node::Leaf(e) if e.id() == id => Some(e),
            Node::Leaf(_) => None,
            Node::Group(g) => g.find(id),
        })
    }

    pub(crate) fn find_mut(&mut self, id: ExpectationId)
        -> Option<&mut Expectation>
    {
        self.children.iter_mut().find_map(|c| match c {
            Node::Leaf(e) if e.id() == id => Some(e),
            Node::Leaf(_) => None,
            Node::Group(g) => g.find_mut(id),
        })
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| match c {
            Node::Group(g) => g.group_mut(id),
            Node::Leaf(_) => None,
        })
    }

    /// Collect, for every expectation that might have been meant to handle
    /// `inv`, the reason it didn't.  `reachable` is false when an enclosing
    /// ordered group isn't ready for this one yet.
    pub(crate) fn mismatches<'a>(&'a self, inv: &Invocation, ctx: &Context,
                                 reachable: bool,
                                 out: &mut Vec<(&'a Expectation, Mismatch)>)
    {
        let mut reachable = reachable;
        for (i, c) in self.children.iter().enumerate() {
            let in_order = match self.kind {
                Kind::Unordered => reachable,
                Kind::Ordered => {
                    let ok = reachable && i >= self.cursor;
                    if i >= self.cursor && !c.is_met() {
                        reachable = false;
                    }
                    ok
                }
            };
            match c {
                Node::Leaf(e) => match e.mismatch(inv, ctx) {
                    Some(m) if m.is_relevant() => out.push((e, m)),
                    Some(_) => (),
                    None if !in_order => out.push((e, Mismatch::Order)),
                    None => (),
                },
                Node::Group(g) => g.mismatches(inv, ctx, in_order, out),
            }
        }
    }

    /// Render every expectation, indented by nesting depth.
    pub(crate) fn describe(&self, out: &mut String, depth: usize) {
        for c in self.children.iter() {
            match c {
                Node::Leaf(e) => {
                    let _ = writeln!(out, "{:w$}{}", "", e, w = depth * 2);
                }
                Node::Group(g) => {
                    let header = match g.kind {
                        Kind::Ordered => "in order:",
                        Kind::Unordered => "in any order:",
                    };
                    let _ = writeln!(out, "{:w$}{}", "", header, w = depth * 2);
                    g.describe(out, depth + 1);
                }
            }
        }
    }
}

fn prepend(i: usize, mut path: Vec<usize>) -> Vec<usize> {
    path.insert(0, i);
    path
}
