//! Contains the in-memory quad index and the change journal of the
//! [RDF Working Set](https://docs.rs/rdf-working-set/).

mod index;
mod journal;

pub use index::{
    BlankNodeRefCounts, IndexCorruption, IndexCorruptionError, IndexName, QuadCollection,
};
pub use journal::{
    ChangeJournal, ChangeScope, DatasetChange, GraphReconstruct, GraphUpdate, QuadSet,
};
