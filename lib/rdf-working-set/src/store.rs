//! API to access the in-memory working set of a session.
//!
//! The entry point of the module is the [`EntityStore`] struct.
//!
//! Usage example:
//! ```
//! use rdf_working_set::model::{BlankNode, EntityId, NamedNode, Node, Quad};
//! use rdf_working_set::store::EntityStore;
//! use rdf_working_set::DeleteBehaviour;
//!
//! let mut store = EntityStore::new();
//!
//! // an entity with an anonymous address
//! let person = EntityId::new("http://example.com/person")?;
//! let address = Node::from(BlankNode::new("address", &person)?);
//! let has_address = NamedNode::new("http://schema.org/address")?;
//! let street = NamedNode::new("http://schema.org/street")?;
//! store.assert_entity(
//!     &person,
//!     [
//!         Quad::new(person.clone(), has_address, address.clone(), None)?,
//!         Quad::new(
//!             EntityId::from_node(&address).unwrap(),
//!             street,
//!             NamedNode::new("http://example.com/main-street")?,
//!             None,
//!         )?,
//!     ],
//! )?;
//! assert_eq!(store.blank_reference_count(&address)?, 1);
//!
//! // deleting the person collects the orphaned address
//! store.delete(&person, DeleteBehaviour::default())?;
//! assert!(store.is_empty());
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

use itertools::Itertools;
use rdf_working_set_common::error::{StateError, StoreResult};
use rdf_working_set_common::{DeleteBehaviour, StoreConfig};
use rdf_working_set_model::{Culture, EntityId, Node, Quad};
use rdf_working_set_storage::{
    BlankNodeRefCounts, ChangeJournal, DatasetChange, GraphReconstruct, GraphUpdate,
    IndexCorruptionError, QuadCollection,
};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

/// The working set of a single session.
///
/// The store holds the quads of all entities that have been loaded, counts the references to
/// blank nodes, and records every mutation in a [ChangeJournal]. If change tracking is enabled,
/// it additionally retains a snapshot of the state after the last [reset](Self::reset_state)
/// that [rollback](Self::rollback) restores.
///
/// Writes take `&mut self`. To share a store between threads, enable
/// [thread-safety](StoreConfig::thread_safe) and wrap the store in a lock.
#[derive(Debug)]
pub struct EntityStore {
    quads: QuadCollection,
    ref_counts: BlankNodeRefCounts,
    asserted: FxHashSet<EntityId>,
    journal: ChangeJournal,
    /// The state restored by a rollback. Only present while tracking changes.
    snapshot: Option<Snapshot>,
    disposed: bool,
}

#[derive(Clone, Debug)]
struct Snapshot {
    quads: QuadCollection,
    asserted: FxHashSet<EntityId>,
}

impl Snapshot {
    fn new(thread_safe: bool) -> Self {
        Self {
            quads: QuadCollection::new(thread_safe),
            asserted: FxHashSet::default(),
        }
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl EntityStore {
    /// Creates a new [EntityStore] with the default [StoreConfig].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [EntityStore] with the given `config`.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            quads: QuadCollection::new(config.thread_safe),
            ref_counts: BlankNodeRefCounts::new(),
            asserted: FxHashSet::default(),
            journal: ChangeJournal::new(config.thread_safe),
            snapshot: config
                .track_changes
                .then(|| Snapshot::new(config.thread_safe)),
            disposed: false,
        }
    }

    pub fn is_thread_safe(&self) -> bool {
        self.quads.is_thread_safe()
    }

    pub fn is_tracking_changes(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Switches between plain and concurrent indices.
    ///
    /// # Errors
    ///
    /// Fails if the store holds data or has been disposed.
    pub fn set_thread_safe(&mut self, thread_safe: bool) -> StoreResult<()> {
        self.ensure_live()?;
        if self.is_thread_safe() == thread_safe {
            return Ok(());
        }
        if self.holds_data() {
            warn!(thread_safe, "Rejected changing thread-safety of a non-empty store");
            return Err(StateError::ThreadSafetyLocked.into());
        }

        self.quads = QuadCollection::new(thread_safe);
        self.journal.set_thread_safe(thread_safe)?;
        if let Some(snapshot) = &mut self.snapshot {
            *snapshot = Snapshot::new(thread_safe);
        }
        debug!(thread_safe, "Changed thread-safety");
        Ok(())
    }

    /// Enables or disables change tracking.
    ///
    /// Disabling change tracking drops the rollback snapshot and clears the journal.
    ///
    /// # Errors
    ///
    /// Fails if the store holds quads or has been disposed.
    pub fn set_track_changes(&mut self, track_changes: bool) -> StoreResult<()> {
        self.ensure_live()?;
        if self.is_tracking_changes() == track_changes {
            return Ok(());
        }
        if !self.quads.is_empty() {
            warn!(track_changes, "Rejected changing change tracking of a non-empty store");
            return Err(StateError::TrackingLocked.into());
        }

        self.snapshot = track_changes.then(|| Snapshot::new(self.is_thread_safe()));
        self.journal.clear();
        debug!(track_changes, "Changed change tracking");
        Ok(())
    }

    /// Returns the number of quads.
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Whether any quad of `entity` is present.
    pub fn contains_entity(&self, entity: &EntityId) -> bool {
        self.quads.contains_entity(entity)
    }

    /// Whether `entity` has been asserted and not deleted since.
    pub fn is_asserted(&self, entity: &EntityId) -> bool {
        self.asserted.contains(entity)
    }

    /// Returns all quads.
    pub fn quads(&self) -> Vec<Quad> {
        self.quads.quads()
    }

    /// Returns the quads owned by `entity`.
    pub fn get_entity_quads(&self, entity: &EntityId) -> Vec<Quad> {
        self.quads.quads_for_entity(entity)
    }

    /// Returns the objects of `entity` for `predicate`.
    ///
    /// If a `graph` is given, only objects in that graph are returned. For quads with a blank
    /// subject, a graph also matches if the requested graph URI ends with the graph URI of the
    /// quad. This is an approximation for blank nodes whose graph is only known relative to the
    /// graph of their root entity.
    pub fn get_objects_for_predicate(
        &self,
        entity: &EntityId,
        predicate: &Node,
        graph: Option<&Node>,
    ) -> Vec<Node> {
        self.quads
            .quads_for_subject_predicate(&entity.to_node(), predicate)
            .into_iter()
            .filter(|quad| graph.map_or(true, |graph| graph_matches(quad, graph)))
            .map(|quad| quad.object().clone())
            .collect()
    }

    /// Checks that all indices of the live state agree with each other.
    ///
    /// # Errors
    ///
    /// Returns every inconsistency that has been found.
    pub fn validate(&self) -> Result<(), Vec<IndexCorruptionError>> {
        self.quads.validate()
    }

    /// Returns the number of quads that reference the blank `node` as object.
    ///
    /// # Errors
    ///
    /// Fails if `node` is not a blank node.
    pub fn blank_reference_count(&self, node: &Node) -> StoreResult<usize> {
        Ok(self.ref_counts.count(node)?)
    }

    /// Returns the recorded changes.
    pub fn changes(&self) -> &ChangeJournal {
        &self.journal
    }

    /// Whether the journal holds changes that must be written back.
    pub fn has_changes(&self) -> bool {
        self.journal.has_changes()
    }

    /// Removes all recorded changes and returns them in order.
    ///
    /// The rollback snapshot is not touched. Call [Self::reset_state] once the changes have
    /// been persisted.
    pub fn take_changes(&mut self) -> Vec<DatasetChange> {
        self.journal.drain()
    }

    /// Adds the quads of `entity` to the store.
    ///
    /// Asserting an entity a second time is a no-op. Every blank object of a newly added quad
    /// gains a reference. If changes are tracked, the quads also become part of the rollback
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the store has been disposed.
    pub fn assert_entity(
        &mut self,
        entity: &EntityId,
        quads: impl IntoIterator<Item = Quad>,
    ) -> StoreResult<()> {
        self.ensure_live()?;
        if self.asserted.contains(entity) {
            trace!(entity = %entity, "Entity has already been asserted");
            return Ok(());
        }

        let mut added = 0;
        for quad in quads {
            if !self.quads.add(quad.clone()) {
                continue;
            }

            added += 1;
            if quad.object().is_blank() {
                self.ref_counts.increment(quad.object())?;
            }
            if let Some(snapshot) = &mut self.snapshot {
                snapshot.quads.add(quad);
            }
        }

        self.asserted.insert(entity.clone());
        if let Some(snapshot) = &mut self.snapshot {
            snapshot.asserted.insert(entity.clone());
        }
        debug!(entity = %entity, quads = added, "Asserted entity");
        Ok(())
    }

    /// Replaces the objects of `entity` for `predicate`.
    ///
    /// The current values are selected like in [Self::get_objects_for_predicate]. If a `culture`
    /// is given, only literals of that culture are replaced and all other values are kept. The
    /// new values are computed after the current values have been removed. New quads are placed
    /// in `graph`.
    ///
    /// Blank nodes that are no longer referenced afterward are deleted. The change is recorded
    /// per affected graph: as a [GraphUpdate], or as a [GraphReconstruct] of the whole graph if
    /// a quad removed from that graph involved a blank node.
    ///
    /// # Errors
    ///
    /// Fails if `predicate` is a literal or the store has been disposed.
    pub fn replace_predicate_values<I>(
        &mut self,
        entity: &EntityId,
        predicate: &Node,
        new_values: impl FnOnce() -> I,
        graph: Option<&Node>,
        culture: Option<&Culture>,
    ) -> StoreResult<()>
    where
        I: IntoIterator<Item = Node>,
    {
        self.ensure_live()?;
        Quad::check_predicate(predicate)?;

        let mut removed = self
            .quads
            .quads_for_subject_predicate(&entity.to_node(), predicate)
            .into_iter()
            .filter(|quad| quad.entity_id() == entity)
            .filter(|quad| graph.map_or(true, |graph| graph_matches(quad, graph)))
            .filter(|quad| culture.map_or(true, |culture| culture.matches(quad.object())))
            .collect::<Vec<_>>();
        for quad in &removed {
            self.quads.remove(quad);
            if quad.object().is_blank() {
                self.ref_counts.decrement(quad.object())?;
            }
        }

        let mut added = Vec::new();
        for value in new_values() {
            let quad = Quad::new(entity.clone(), predicate.clone(), value, graph.cloned())?;
            if self.quads.add(quad.clone()) {
                if quad.object().is_blank() {
                    self.ref_counts.increment(quad.object())?;
                }
                added.push(quad);
            }
        }

        let mut collected = Vec::new();
        for quad in &removed {
            self.collect_if_orphaned(quad.object(), &mut collected)?;
        }

        if self.is_tracking_changes() {
            let re_added = removed
                .iter()
                .filter(|quad| added.contains(quad))
                .cloned()
                .collect::<Vec<_>>();
            removed.retain(|quad| !re_added.contains(quad));
            added.retain(|quad| !re_added.contains(quad));
            removed.extend(collected);
            self.record_graph_changes(entity, &removed, &added);
        }
        Ok(())
    }

    /// Deletes `entity` and every blank node that is no longer referenced afterward.
    ///
    /// For blank entities, the quads that reference the entity are removed as well. See
    /// [DeleteBehaviour] for the other options.
    ///
    /// For each graph in which a removed quad involved a blank node, a [GraphReconstruct] of the
    /// remaining content is recorded. Deleting a non-blank entity additionally records
    /// [DatasetChange::EntityDelete] and, with [DeleteBehaviour::NULLIFY_CHILDREN],
    /// [DatasetChange::RemoveReferences].
    ///
    /// # Errors
    ///
    /// Fails if the store has been disposed.
    pub fn delete(&mut self, entity: &EntityId, behaviour: DeleteBehaviour) -> StoreResult<()> {
        self.ensure_live()?;

        let mut removed = Vec::new();
        self.remove_entity(entity, behaviour, &mut removed)?;

        let nullify = behaviour.contains(DeleteBehaviour::NULLIFY_CHILDREN);
        if nullify && !entity.is_blank() {
            removed.extend(self.quads.remove_where_object(&entity.to_node()));
        }
        debug!(entity = %entity, %behaviour, removed = removed.len(), "Deleted entity");

        if self.is_tracking_changes() {
            // The entity's own quads and the references to it are covered by the cross-graph
            // changes. Only graphs with blank nodes need to be recorded separately.
            let blank_graphs = graphs_touching_blank(&removed);
            removed.retain(|quad| blank_graphs.contains(&quad.graph().cloned()));
            self.record_graph_changes(entity, &removed, &[]);

            if !entity.is_blank() {
                self.journal.add(DatasetChange::EntityDelete(entity.clone()));
                if nullify {
                    self.journal
                        .add(DatasetChange::RemoveReferences(entity.clone()));
                }
            }
        }
        Ok(())
    }

    /// Makes the current state the state restored by [Self::rollback] and clears the journal.
    ///
    /// # Errors
    ///
    /// Fails if the store has been disposed.
    pub fn reset_state(&mut self) -> StoreResult<()> {
        self.ensure_live()?;
        if let Some(snapshot) = &mut self.snapshot {
            snapshot.quads = self.quads.clone();
            snapshot.asserted = self.asserted.clone();
        }
        self.journal.clear();
        debug!(quads = self.quads.len(), "Reset store state");
        Ok(())
    }

    /// Restores the state of the last [reset](Self::reset_state) and discards the journal.
    ///
    /// # Errors
    ///
    /// Fails if change tracking is disabled or the store has been disposed.
    pub fn rollback(&mut self) -> StoreResult<()> {
        self.ensure_live()?;
        let Some(snapshot) = &self.snapshot else {
            return Err(StateError::RollbackUnavailable.into());
        };

        self.quads = snapshot.quads.clone();
        self.asserted = snapshot.asserted.clone();
        self.ref_counts.rebuild(&self.quads);
        self.journal.clear();
        debug!(quads = self.quads.len(), "Rolled back store state");
        Ok(())
    }

    /// Releases all indices. Every later write fails and every later read is empty.
    ///
    /// Disposing a store twice is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.quads.clear();
        self.ref_counts.clear();
        self.asserted.clear();
        self.journal.clear();
        self.snapshot = None;
        self.disposed = true;
        debug!("Disposed store");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Records the `removed` and `added` quads of a mutation of `entity`, one change per graph.
    ///
    /// A graph in which a removed quad involves a blank node is recorded as a
    /// [GraphReconstruct] of its remaining content. If nothing remains, the removed quads are
    /// recorded as a [GraphUpdate] instead, as the journal drops empty reconstructs.
    fn record_graph_changes(&mut self, entity: &EntityId, removed: &[Quad], added: &[Quad]) {
        let blank_graphs = graphs_touching_blank(removed);
        let graphs = removed
            .iter()
            .chain(added)
            .map(|quad| quad.graph().cloned())
            .sorted()
            .dedup()
            .collect_vec();

        for graph in graphs {
            let content = if blank_graphs.contains(&graph) {
                self.quads.quads_in_graph(graph.as_ref())
            } else {
                Vec::new()
            };

            let change = if content.is_empty() {
                let in_graph = |quad: &&Quad| quad.graph() == graph.as_ref();
                let removed = removed.iter().filter(in_graph).cloned().collect_vec();
                let added = added.iter().filter(in_graph).cloned().collect_vec();
                DatasetChange::from(GraphUpdate::new(entity.clone(), graph, removed, added))
            } else {
                GraphReconstruct::new(entity.clone(), graph, content).into()
            };
            self.journal.add(change);
        }
    }

    /// Removes the quads of `entity`, the quads that reference it if it is blank, and cascades
    /// into blank children. All removed quads are appended to `removed`.
    fn remove_entity(
        &mut self,
        entity: &EntityId,
        behaviour: DeleteBehaviour,
        removed: &mut Vec<Quad>,
    ) -> StoreResult<()> {
        let mut dropped = self
            .quads
            .quads_for_entity(entity)
            .into_iter()
            .filter(|quad| self.quads.remove(quad))
            .collect::<Vec<_>>();
        let node = entity.to_node();
        if entity.is_blank() {
            dropped.extend(self.quads.remove_where_object(&node));
        }

        for quad in &dropped {
            if quad.object().is_blank() {
                self.ref_counts.decrement(quad.object())?;
            }
        }
        if let Node::Blank(blank) = &node {
            self.ref_counts.forget(blank);
        }
        self.asserted.remove(entity);
        removed.extend(dropped.iter().cloned());

        let force_children = behaviour.contains(DeleteBehaviour::DELETE_CHILDREN);
        for quad in &dropped {
            let child = quad.object();
            if !child.is_blank() || child == &node {
                continue;
            }

            if force_children && quad.entity_id() == entity {
                self.delete_blank(child, behaviour, removed)?;
            } else {
                self.collect_if_orphaned(child, removed)?;
            }
        }
        Ok(())
    }

    /// Deletes the blank `node` if nothing references it anymore.
    fn collect_if_orphaned(&mut self, node: &Node, removed: &mut Vec<Quad>) -> StoreResult<()> {
        if !node.is_blank() || self.ref_counts.count(node)? > 0 {
            return Ok(());
        }
        self.delete_blank(node, DeleteBehaviour::NONE, removed)
    }

    fn delete_blank(
        &mut self,
        node: &Node,
        behaviour: DeleteBehaviour,
        removed: &mut Vec<Quad>,
    ) -> StoreResult<()> {
        let Some(child) = EntityId::from_node(node) else {
            return Ok(());
        };
        if !self.quads.contains_entity(&child)
            && self.quads.referencing_entities(node).is_empty()
        {
            return Ok(());
        }

        trace!(blank = %node, "Collecting blank node");
        self.remove_entity(&child, behaviour, removed)
    }

    /// Whether the store holds quads or recorded changes.
    fn holds_data(&self) -> bool {
        !self.quads.is_empty() || !self.journal.is_empty()
    }

    fn ensure_live(&self) -> Result<(), StateError> {
        if self.disposed {
            Err(StateError::Disposed)
        } else {
            Ok(())
        }
    }
}

/// Returns the graphs of the `quads` that involve a blank node.
fn graphs_touching_blank(quads: &[Quad]) -> FxHashSet<Option<Node>> {
    quads
        .iter()
        .filter(|quad| quad.touches_blank())
        .map(|quad| quad.graph().cloned())
        .collect()
}

/// Whether `quad` lies in the requested `graph`.
fn graph_matches(quad: &Quad, graph: &Node) -> bool {
    match quad.graph() {
        Some(quad_graph) if quad_graph == graph => true,
        Some(Node::Uri(quad_graph)) if quad.subject().is_blank() => graph
            .as_uri()
            .is_some_and(|graph| graph.as_str().ends_with(quad_graph.as_str())),
        _ => false,
    }
}
