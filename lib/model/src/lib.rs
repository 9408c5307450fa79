#![doc(test(attr(deny(warnings))))]

//! The data model of the RDF working set: nodes, entity identifiers and the quads that describe
//! entities.
//!
//! URIs and literals are taken from oxigraph's [oxrdf] crate. Blank nodes are not, as blank nodes
//! in the working set are scoped to the entity that owns them.

mod culture;
mod error;
mod rdf;

pub use culture::Culture;
pub use error::*;
pub use rdf::*;

// Re-export some oxrdf types.
pub use oxrdf::vocab;
pub use oxrdf::{
    BlankNodeIdParseError, IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef,
};
