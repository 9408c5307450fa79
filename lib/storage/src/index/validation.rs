use crate::index::QuadCollection;
use rdf_working_set_model::{EntityId, Quad};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Validates the indices of a [QuadCollection].
///
/// The following rules are checked:
/// - Every quad in the primary set is reachable through all secondary indices.
/// - Every quad in a secondary index is part of the primary set and stored under its own key.
/// - The reverse object index only lists entities that still reference the object.
/// - Secondary indices do not keep empty entries.
pub(super) fn validate_collection(
    collection: &QuadCollection,
) -> Result<(), Vec<IndexCorruptionError>> {
    let mut state = ValidationState::default();

    collection.quads.for_each(|quad, _| {
        state.check_reachable(collection, quad);
    });
    collection.by_entity.for_each(|entity, quads| {
        state.check_entries(collection, IndexName::Entity, quads, |quad| {
            quad.entity_id() == entity
        });
    });
    collection.by_subject.for_each(|subject, quads| {
        state.check_entries(collection, IndexName::Subject, quads, |quad| {
            quad.subject() == subject
        });
    });
    collection.by_subject_predicate.for_each(|key, quads| {
        state.check_entries(collection, IndexName::SubjectPredicate, quads, |quad| {
            quad.subject() == key.subject() && quad.predicate() == key.predicate()
        });
    });
    collection.by_object.for_each(|object, entities| {
        if entities.is_empty() {
            state.push(IndexName::Object, IndexCorruption::EmptyEntry, object);
        }
        for entity in entities {
            let referenced = collection
                .by_entity
                .with(entity, |quads| quads.iter().any(|quad| quad.object() == object))
                .unwrap_or(false);
            if !referenced {
                state.push(IndexName::Object, IndexCorruption::StaleReference, entity);
            }
        }
    });

    if state.corruptions.is_empty() {
        Ok(())
    } else {
        Err(state.corruptions)
    }
}

#[derive(Default)]
struct ValidationState {
    /// The corruptions that have been found so far.
    corruptions: Vec<IndexCorruptionError>,
}

impl ValidationState {
    fn check_reachable(&mut self, collection: &QuadCollection, quad: &Quad) {
        let contains = |set: &rustc_hash::FxHashSet<Quad>| set.contains(quad);

        if collection.by_entity.with(quad.entity_id(), contains) != Some(true) {
            self.push(IndexName::Entity, IndexCorruption::MissingQuad, quad);
        }
        if collection.by_subject.with(quad.subject(), contains) != Some(true) {
            self.push(IndexName::Subject, IndexCorruption::MissingQuad, quad);
        }
        if collection
            .by_subject_predicate
            .with(&quad.subject_predicate(), contains)
            != Some(true)
        {
            self.push(IndexName::SubjectPredicate, IndexCorruption::MissingQuad, quad);
        }
        if !quad.object().is_literal() && !references(collection, quad) {
            self.push(IndexName::Object, IndexCorruption::MissingQuad, quad);
        }
    }

    fn check_entries<'a>(
        &mut self,
        collection: &QuadCollection,
        index: IndexName,
        quads: impl IntoIterator<Item = &'a Quad>,
        belongs_to_key: impl Fn(&Quad) -> bool,
    ) {
        let mut is_empty = true;
        for quad in quads {
            is_empty = false;
            if !collection.quads.contains_key(quad) {
                self.push(index, IndexCorruption::DanglingQuad, quad);
            }
            if !belongs_to_key(quad) {
                self.push(index, IndexCorruption::MisplacedQuad, quad);
            }
        }
        if is_empty {
            self.push(index, IndexCorruption::EmptyEntry, "<empty>");
        }
    }

    fn push(&mut self, index: IndexName, corruption: IndexCorruption, entry: impl Display) {
        self.corruptions.push(IndexCorruptionError {
            index,
            corruption,
            entry: entry.to_string(),
        });
    }
}

fn references(collection: &QuadCollection, quad: &Quad) -> bool {
    let entity: &EntityId = quad.entity_id();
    collection
        .by_object
        .with(quad.object(), |entities| entities.contains(entity))
        .unwrap_or(false)
}

/// An inconsistency between the indices of a [QuadCollection].
#[derive(Clone, Debug, Error)]
#[error("Corruption in the {index} index: {corruption} ({entry})")]
pub struct IndexCorruptionError {
    /// The offending index.
    index: IndexName,
    /// The corruption.
    corruption: IndexCorruption,
    /// The offending entry.
    entry: String,
}

impl IndexCorruptionError {
    pub fn index(&self) -> IndexName {
        self.index
    }

    pub fn corruption(&self) -> IndexCorruption {
        self.corruption
    }
}

/// The secondary indices of a [QuadCollection].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexName {
    Entity,
    Subject,
    SubjectPredicate,
    Object,
}

impl Display for IndexName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexName::Entity => write!(f, "entity"),
            IndexName::Subject => write!(f, "subject"),
            IndexName::SubjectPredicate => write!(f, "subject-predicate"),
            IndexName::Object => write!(f, "object"),
        }
    }
}

/// An enum for distinguishing between index corruptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexCorruption {
    /// A quad of the primary set cannot be found through the index.
    MissingQuad,
    /// The index holds a quad that is not part of the primary set.
    DanglingQuad,
    /// The index holds a quad under a key that does not match the quad.
    MisplacedQuad,
    /// The reverse object index lists an entity that no longer references the object.
    StaleReference,
    /// The index keeps a key without values.
    EmptyEntry,
}

impl Display for IndexCorruption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexCorruption::MissingQuad => write!(f, "Quad is missing"),
            IndexCorruption::DanglingQuad => write!(f, "Quad is not part of the collection"),
            IndexCorruption::MisplacedQuad => write!(f, "Quad is stored under a foreign key"),
            IndexCorruption::StaleReference => {
                write!(f, "Entity no longer references the object")
            }
            IndexCorruption::EmptyEntry => write!(f, "Entry is empty"),
        }
    }
}
