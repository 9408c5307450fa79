//! The in-memory quad index of the working set.
//!
//! A [QuadCollection] keeps a primary set of quads and four secondary indices: by owning entity,
//! by subject, by subject and predicate (ignoring the graph), and a reverse index from object
//! nodes to the entities that reference them. All indices are backed by the same kind of map,
//! either a plain hash map or a concurrent one.
//!
//! [BlankNodeRefCounts] tracks how many quads reference each blank node as object. It is kept
//! next to the collection by the entity store and drives the collection of orphaned blank nodes.

mod backing;
mod collection;
mod ref_counts;
mod validation;

pub(crate) use backing::BackingMap;
pub use collection::QuadCollection;
pub use ref_counts::BlankNodeRefCounts;
pub use validation::{IndexCorruption, IndexCorruptionError, IndexName};
