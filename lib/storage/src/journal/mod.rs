//! The change journal of the working set.
//!
//! Every mutation of the entity store that matters for persistence is recorded as a
//! [DatasetChange]. The [ChangeJournal] keeps one stack of changes per named graph and merges
//! consecutive changes of the same entity and graph. Changes that affect more than one graph are
//! never merged and freeze the order of everything recorded before them.

mod change;

use crate::index::BackingMap;
pub use change::{ChangeScope, DatasetChange, GraphReconstruct, GraphUpdate, QuadSet};
use rdf_working_set_common::error::StateError;
use rdf_working_set_model::Node;
use std::fmt::{Display, Formatter};
use tracing::{debug, trace};

/// An ordered log of [DatasetChange]s.
///
/// Graph-scoped changes are kept in one stack per graph. A new change is merged with the top of
/// its stack if [DatasetChange::can_merge_with] holds and pushed otherwise. A cross-graph change
/// first moves all pending stacks into the frozen list, in the order their graphs were first
/// touched, and is then appended to it.
///
/// In thread-safe mode, the per-graph stacks live in a concurrent map and the merge step runs
/// while holding the lock of the stack's entry.
#[derive(Clone, Debug)]
pub struct ChangeJournal {
    /// Changes whose order is fixed.
    frozen: Vec<DatasetChange>,
    /// The pending changes of each graph. [None] is the default graph.
    pending: BackingMap<Option<Node>, GraphChanges>,
    /// Used for ordering the pending stacks when they are frozen.
    sequence: u64,
}

#[derive(Clone, Debug, Default)]
struct GraphChanges {
    /// The time at which the graph was first touched. Zero for a fresh stack.
    sequence: u64,
    changes: Vec<DatasetChange>,
}

impl ChangeJournal {
    /// Creates a new empty [ChangeJournal].
    pub fn new(thread_safe: bool) -> Self {
        Self {
            frozen: Vec::new(),
            pending: BackingMap::new(thread_safe),
            sequence: 0,
        }
    }

    pub fn is_thread_safe(&self) -> bool {
        self.pending.is_concurrent()
    }

    /// Switches the backing map of the per-graph stacks.
    ///
    /// # Errors
    ///
    /// Returns [StateError::ThreadSafetyLocked] if the journal is not empty and the requested
    /// mode differs from the current one.
    pub fn set_thread_safe(&mut self, thread_safe: bool) -> Result<(), StateError> {
        if self.is_thread_safe() == thread_safe {
            return Ok(());
        }
        if !self.is_empty() {
            return Err(StateError::ThreadSafetyLocked);
        }

        *self = Self::new(thread_safe);
        Ok(())
    }

    /// Records `change`.
    ///
    /// Empty changes are dropped. A merge that results in an empty change removes the change
    /// from its stack.
    pub fn add(&mut self, change: DatasetChange) {
        if change.is_empty() {
            trace!(%change, "Dropping empty change");
            return;
        }

        let graph = match change.scope() {
            ChangeScope::Graph(graph) => graph.cloned(),
            ChangeScope::CrossGraph => {
                self.freeze();
                self.frozen.push(change);
                return;
            }
        };

        self.sequence += 1;
        let sequence = self.sequence;
        self.pending.upsert(graph, |stack| {
            if stack.sequence == 0 {
                stack.sequence = sequence;
            }
            push_or_merge(&mut stack.changes, change);
        });
    }

    /// Returns all changes in order: frozen changes first, followed by the pending changes of
    /// each graph in the order the graphs were first touched.
    pub fn changes(&self) -> Vec<DatasetChange> {
        let mut changes = self.frozen.clone();
        for (_, stack) in self.pending_stacks() {
            changes.extend(stack.changes);
        }
        changes
    }

    /// Returns the changes scoped to `graph`, in order. [None] selects the default graph.
    /// Cross-graph changes are not included.
    pub fn for_graph(&self, graph: Option<&Node>) -> Vec<DatasetChange> {
        let mut changes = self
            .frozen
            .iter()
            .filter(|change| change.scope() == ChangeScope::Graph(graph))
            .cloned()
            .collect::<Vec<_>>();
        let key = graph.cloned();
        if let Some(pending) = self.pending.with(&key, |stack| stack.changes.clone()) {
            changes.extend(pending);
        }
        changes
    }

    /// Returns the changes whose order has been fixed by a cross-graph change.
    pub fn frozen(&self) -> &[DatasetChange] {
        &self.frozen
    }

    /// Returns the number of changes.
    pub fn len(&self) -> usize {
        let mut len = self.frozen.len();
        self.pending.for_each(|_, stack| len += stack.changes.len());
        len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the journal holds changes and no per-graph stack has been emptied by merging.
    pub fn has_changes(&self) -> bool {
        let mut any = !self.frozen.is_empty();
        let mut all_stacks_filled = true;
        self.pending.for_each(|_, stack| {
            if stack.changes.is_empty() {
                all_stacks_filled = false;
            } else {
                any = true;
            }
        });
        any && all_stacks_filled
    }

    /// Discards all changes.
    pub fn clear(&mut self) {
        self.frozen.clear();
        self.pending.clear();
        self.sequence = 0;
    }

    /// Removes all changes and returns them in order.
    pub fn drain(&mut self) -> Vec<DatasetChange> {
        let mut changes = std::mem::take(&mut self.frozen);
        for (_, stack) in self.drain_pending() {
            changes.extend(stack.changes);
        }
        self.sequence = 0;
        changes
    }

    fn freeze(&mut self) {
        let stacks = self.drain_pending();
        if stacks.is_empty() {
            return;
        }

        let before = self.frozen.len();
        for (_, stack) in stacks {
            self.frozen.extend(stack.changes);
        }
        debug!(frozen = self.frozen.len() - before, "Froze pending graph changes");
    }

    fn drain_pending(&mut self) -> Vec<(Option<Node>, GraphChanges)> {
        let mut stacks = self.pending.drain();
        stacks.sort_by_key(|(_, stack)| stack.sequence);
        stacks
    }

    fn pending_stacks(&self) -> Vec<(Option<Node>, GraphChanges)> {
        let mut stacks = Vec::with_capacity(self.pending.len());
        self.pending
            .for_each(|graph, stack| stacks.push((graph.clone(), stack.clone())));
        stacks.sort_by_key(|(_, stack)| stack.sequence);
        stacks
    }
}

impl Default for ChangeJournal {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Display for ChangeJournal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, change) in self.changes().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{change}")?;
        }
        Ok(())
    }
}

fn push_or_merge(changes: &mut Vec<DatasetChange>, change: DatasetChange) {
    let Some(top) = changes.pop() else {
        changes.push(change);
        return;
    };

    match top.merge_with(change) {
        Ok(merged) => {
            trace!(%merged, "Merged change with the top of its graph stack");
            if !merged.is_empty() {
                changes.push(merged);
            }
        }
        Err((top, change)) => {
            changes.push(top);
            changes.push(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ChangeJournal, ChangeScope, DatasetChange, GraphReconstruct, GraphUpdate};
    use insta::{allow_duplicates, assert_snapshot};
    use rdf_working_set_model::{EntityId, Literal, NamedNode, Node, Quad};

    fn entity(name: &str) -> EntityId {
        EntityId::Uri(NamedNode::new_unchecked(format!("http://e.org/{name}")))
    }

    fn graph(name: &str) -> Node {
        Node::Uri(NamedNode::new_unchecked(format!("http://e.org/{name}")))
    }

    fn quad(entity_name: &str, graph_name: &str, value: &str) -> Quad {
        Quad::new(
            entity(entity_name),
            NamedNode::new_unchecked("http://e.org/p"),
            Literal::new_simple_literal(value),
            Some(graph(graph_name)),
        )
        .unwrap()
    }

    fn update(graph_name: &str, removed: &[&str], added: &[&str]) -> DatasetChange {
        GraphUpdate::new(
            entity("e"),
            Some(graph(graph_name)),
            removed.iter().map(|value| quad("e", graph_name, value)),
            added.iter().map(|value| quad("e", graph_name, value)),
        )
        .into()
    }

    fn both_modes(test: impl Fn(ChangeJournal)) {
        test(ChangeJournal::new(false));
        test(ChangeJournal::new(true));
    }

    #[test]
    fn consecutive_updates_merge() {
        both_modes(|mut journal| {
            journal.add(update("g", &["1"], &["2"]));
            journal.add(update("g", &["2"], &["3"]));

            assert_eq!(journal.changes(), vec![update("g", &["1"], &["3"])]);
            assert!(journal.has_changes());
        });
    }

    #[test]
    fn reconstruct_absorbs_update() {
        both_modes(|mut journal| {
            let content = [quad("e", "g", "a"), quad("e", "g", "b")];
            journal.add(GraphReconstruct::new(entity("e"), Some(graph("g")), content).into());
            journal.add(update("g", &["a"], &["c"]));

            allow_duplicates! {
                assert_snapshot!(journal.to_string(), @r#"GraphReconstruct(<http://e.org/e>, <http://e.org/g>, content: [<http://e.org/e> <http://e.org/p> "b" <http://e.org/g> ., <http://e.org/e> <http://e.org/p> "c" <http://e.org/g> .])"#);
            }
        });
    }

    #[test]
    fn cross_graph_change_freezes_order() {
        both_modes(|mut journal| {
            journal.add(update("g1", &[], &["1"]));
            journal.add(update("g2", &[], &["2"]));
            journal.add(DatasetChange::EntityDelete(entity("x")));
            journal.add(update("g1", &[], &["3"]));

            assert_eq!(journal.frozen().len(), 3);
            allow_duplicates! {
                assert_snapshot!(journal.to_string(), @r#"
                GraphUpdate(<http://e.org/e>, <http://e.org/g1>, removed: [], added: [<http://e.org/e> <http://e.org/p> "1" <http://e.org/g1> .])
                GraphUpdate(<http://e.org/e>, <http://e.org/g2>, removed: [], added: [<http://e.org/e> <http://e.org/p> "2" <http://e.org/g2> .])
                EntityDelete(<http://e.org/x>)
                GraphUpdate(<http://e.org/e>, <http://e.org/g1>, removed: [], added: [<http://e.org/e> <http://e.org/p> "3" <http://e.org/g1> .])
                "#);
            }
        });
    }

    #[test]
    fn pending_graphs_keep_first_touch_order() {
        both_modes(|mut journal| {
            journal.add(update("b", &[], &["1"]));
            journal.add(update("a", &[], &["2"]));
            journal.add(update("b", &[], &["3"]));

            let changes = journal.changes();
            let graphs = changes
                .iter()
                .map(DatasetChange::scope)
                .collect::<Vec<_>>();
            assert_eq!(
                graphs,
                vec![
                    ChangeScope::Graph(Some(&graph("b"))),
                    ChangeScope::Graph(Some(&graph("a")))
                ]
            );
        });
    }

    #[test]
    fn empty_changes_are_dropped() {
        both_modes(|mut journal| {
            journal.add(update("g", &[], &[]));
            journal.add(GraphReconstruct::new(entity("e"), Some(graph("g")), []).into());

            assert!(journal.is_empty());
            assert!(!journal.has_changes());
        });
    }

    #[test]
    fn cancelled_stack_has_no_changes() {
        both_modes(|mut journal| {
            journal.add(DatasetChange::EntityDelete(entity("x")));
            journal.add(update("g", &[], &["1"]));
            journal.add(update("g", &["1"], &[]));

            assert_eq!(journal.len(), 1);
            assert!(!journal.has_changes());
        });
    }

    #[test]
    fn for_graph_filters_frozen_and_pending() {
        both_modes(|mut journal| {
            journal.add(update("g1", &[], &["1"]));
            journal.add(DatasetChange::RemoveReferences(entity("x")));
            journal.add(update("g2", &[], &["2"]));
            journal.add(update("g1", &[], &["3"]));

            assert_eq!(
                journal.for_graph(Some(&graph("g1"))),
                vec![update("g1", &[], &["1"]), update("g1", &[], &["3"])]
            );
        });
    }

    #[test]
    fn default_graph_changes_merge_without_freezing() {
        both_modes(|mut journal| {
            let default_quad = |value: &str| {
                Quad::new(
                    entity("e"),
                    NamedNode::new_unchecked("http://e.org/p"),
                    Literal::new_simple_literal(value),
                    None,
                )
                .unwrap()
            };
            journal.add(update("g", &[], &["1"]));
            journal.add(
                GraphReconstruct::new(entity("e"), None, [default_quad("a"), default_quad("b")])
                    .into(),
            );
            journal.add(GraphUpdate::new(entity("e"), None, [default_quad("a")], []).into());

            assert!(journal.frozen().is_empty());
            assert_eq!(
                journal.for_graph(None),
                vec![DatasetChange::from(GraphReconstruct::new(
                    entity("e"),
                    None,
                    [default_quad("b")]
                ))]
            );
            assert_eq!(journal.len(), 2);
            assert!(journal.has_changes());
        });
    }

    #[test]
    fn drain_empties_the_journal() {
        both_modes(|mut journal| {
            journal.add(update("g", &[], &["1"]));
            journal.add(DatasetChange::EntityDelete(entity("x")));
            journal.add(update("g", &[], &["2"]));

            let drained = journal.drain();
            assert_eq!(drained.len(), 3);
            assert!(journal.is_empty());
        });
    }

    #[test]
    fn thread_safety_is_locked_while_holding_changes() {
        let mut journal = ChangeJournal::new(false);
        journal.add(DatasetChange::EntityDelete(entity("x")));
        assert!(journal.set_thread_safe(true).is_err());

        journal.clear();
        assert!(journal.set_thread_safe(true).is_ok());
        assert!(journal.is_thread_safe());
    }
}
