use crate::index::validation::validate_collection;
use crate::index::{BackingMap, IndexCorruptionError};
use rdf_working_set_common::error::StateError;
use rdf_working_set_model::{EntityId, Node, Quad, SubjectPredicate};
use rustc_hash::FxHashSet;

/// An indexed, mutable collection of quads.
///
/// Every quad in the primary set is reachable through the entity, subject, and subject-predicate
/// indices. Quads with a non-literal object are additionally registered in the reverse object
/// index, which maps the object node to the entities that reference it. Literal objects are not
/// indexed in reverse. Lookups for literals fall back to scanning the primary set.
///
/// The collection does not track blank node reference counts. See
/// [BlankNodeRefCounts](crate::BlankNodeRefCounts).
#[derive(Clone, Debug)]
pub struct QuadCollection {
    pub(super) quads: BackingMap<Quad, ()>,
    pub(super) by_entity: BackingMap<EntityId, FxHashSet<Quad>>,
    pub(super) by_subject: BackingMap<Node, FxHashSet<Quad>>,
    pub(super) by_subject_predicate: BackingMap<SubjectPredicate, FxHashSet<Quad>>,
    pub(super) by_object: BackingMap<Node, FxHashSet<EntityId>>,
    /// Set by the first successful [add](Self::add). Reset by [clear](Self::clear).
    written: bool,
}

impl QuadCollection {
    /// Creates a new empty [QuadCollection].
    ///
    /// If `thread_safe` is set, all indices are backed by concurrent maps.
    pub fn new(thread_safe: bool) -> Self {
        Self {
            quads: BackingMap::new(thread_safe),
            by_entity: BackingMap::new(thread_safe),
            by_subject: BackingMap::new(thread_safe),
            by_subject_predicate: BackingMap::new(thread_safe),
            by_object: BackingMap::new(thread_safe),
            written: false,
        }
    }

    pub fn is_thread_safe(&self) -> bool {
        self.quads.is_concurrent()
    }

    /// Switches the backing maps of all indices.
    ///
    /// # Errors
    ///
    /// Returns [StateError::ThreadSafetyLocked] if the collection has been written to since it
    /// was created or cleared and the requested mode differs from the current one. Removing all
    /// quads again does not unlock the mode.
    pub fn set_thread_safe(&mut self, thread_safe: bool) -> Result<(), StateError> {
        if self.is_thread_safe() == thread_safe {
            return Ok(());
        }
        if self.written {
            return Err(StateError::ThreadSafetyLocked);
        }

        *self = Self::new(thread_safe);
        Ok(())
    }

    /// Returns the number of quads.
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Whether a quad has been added since the collection was created or cleared.
    pub fn is_written(&self) -> bool {
        self.written
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.quads.contains_key(quad)
    }

    /// Whether any quad of `entity` is present.
    pub fn contains_entity(&self, entity: &EntityId) -> bool {
        self.by_entity.contains_key(entity)
    }

    /// Inserts `quad` into the primary set and all indices.
    ///
    /// Returns `false` if the quad was already present.
    pub fn add(&mut self, quad: Quad) -> bool {
        if self.quads.contains_key(&quad) {
            return false;
        }

        self.by_entity
            .upsert(quad.entity_id().clone(), |set| set.insert(quad.clone()));
        self.by_subject
            .upsert(quad.subject().clone(), |set| set.insert(quad.clone()));
        self.by_subject_predicate
            .upsert(quad.subject_predicate(), |set| set.insert(quad.clone()));
        if !quad.object().is_literal() {
            self.by_object.upsert(quad.object().clone(), |set| {
                set.insert(quad.entity_id().clone())
            });
        }
        self.quads.insert(quad, ());
        self.written = true;
        true
    }

    /// Removes `quad` from the primary set and all indices.
    ///
    /// Returns `false` if the quad was not present.
    pub fn remove(&mut self, quad: &Quad) -> bool {
        if self.quads.remove(quad).is_none() {
            return false;
        }

        self.by_entity
            .modify(quad.entity_id(), |set| set.remove(quad), FxHashSet::is_empty);
        self.by_subject
            .modify(quad.subject(), |set| set.remove(quad), FxHashSet::is_empty);
        self.by_subject_predicate.modify(
            &quad.subject_predicate(),
            |set| set.remove(quad),
            FxHashSet::is_empty,
        );

        if !quad.object().is_literal() {
            let still_referenced = self
                .by_entity
                .with(quad.entity_id(), |set| {
                    set.iter().any(|other| other.object() == quad.object())
                })
                .unwrap_or(false);
            if !still_referenced {
                self.by_object.modify(
                    quad.object(),
                    |set| set.remove(quad.entity_id()),
                    FxHashSet::is_empty,
                );
            }
        }
        true
    }

    /// Returns the quads owned by `entity`.
    pub fn quads_for_entity(&self, entity: &EntityId) -> Vec<Quad> {
        sorted(self.by_entity.with(entity, collect_set))
    }

    /// Returns the quads with the given `subject`.
    pub fn quads_for_subject(&self, subject: &Node) -> Vec<Quad> {
        sorted(self.by_subject.with(subject, collect_set))
    }

    /// Returns the quads with the given `subject` and `predicate` in any graph.
    pub fn quads_for_subject_predicate(&self, subject: &Node, predicate: &Node) -> Vec<Quad> {
        let key = SubjectPredicate::new(subject.clone(), predicate.clone());
        sorted(self.by_subject_predicate.with(&key, collect_set))
    }

    /// Returns the entities that own at least one quad with `object` as object.
    pub fn referencing_entities(&self, object: &Node) -> Vec<EntityId> {
        if object.is_literal() {
            let mut entities = self
                .scan(|quad| quad.object() == object)
                .into_iter()
                .map(|quad| quad.entity_id().clone())
                .collect::<Vec<_>>();
            entities.sort_unstable();
            entities.dedup();
            return entities;
        }

        let mut entities = self
            .by_object
            .with(object, |set| set.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        entities.sort_unstable();
        entities
    }

    /// Removes every quad whose object equals `object` and returns the removed quads.
    pub fn remove_where_object(&mut self, object: &Node) -> Vec<Quad> {
        let matching = if object.is_literal() {
            self.scan(|quad| quad.object() == object)
        } else {
            let mut matching = Vec::new();
            for entity in self.referencing_entities(object) {
                self.by_entity.with(&entity, |set| {
                    matching.extend(
                        set.iter().filter(|quad| quad.object() == object).cloned(),
                    );
                });
            }
            matching.sort_unstable();
            matching
        };

        for quad in &matching {
            self.remove(quad);
        }
        matching
    }

    /// Returns all quads placed in `graph`. [None] selects quads without a graph.
    pub fn quads_in_graph(&self, graph: Option<&Node>) -> Vec<Quad> {
        self.scan(|quad| quad.graph() == graph)
    }

    /// Returns all quads.
    pub fn quads(&self) -> Vec<Quad> {
        self.scan(|_| true)
    }

    /// Returns all entities that own at least one quad.
    pub fn entities(&self) -> Vec<EntityId> {
        let mut entities = self.by_entity.keys();
        entities.sort_unstable();
        entities
    }

    /// Removes all quads from all indices.
    pub fn clear(&mut self) {
        self.quads.clear();
        self.by_entity.clear();
        self.by_subject.clear();
        self.by_subject_predicate.clear();
        self.by_object.clear();
        self.written = false;
    }

    /// Checks that the primary set and all secondary indices agree with each other.
    ///
    /// # Errors
    ///
    /// Returns every inconsistency that has been found.
    pub fn validate(&self) -> Result<(), Vec<IndexCorruptionError>> {
        validate_collection(self)
    }

    fn scan(&self, mut predicate: impl FnMut(&Quad) -> bool) -> Vec<Quad> {
        let mut result = Vec::new();
        self.quads.for_each(|quad, _| {
            if predicate(quad) {
                result.push(quad.clone());
            }
        });
        result.sort_unstable();
        result
    }
}

impl Default for QuadCollection {
    fn default() -> Self {
        Self::new(false)
    }
}

fn collect_set(set: &FxHashSet<Quad>) -> Vec<Quad> {
    set.iter().cloned().collect()
}

fn sorted(quads: Option<Vec<Quad>>) -> Vec<Quad> {
    let mut quads = quads.unwrap_or_default();
    quads.sort_unstable();
    quads
}
