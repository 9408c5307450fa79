use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The three kinds of [Node](crate::Node)s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A node identified by an absolute URI.
    Uri,
    /// A literal value.
    Literal,
    /// A locally scoped blank node.
    Blank,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Uri => f.write_str("URI"),
            NodeKind::Literal => f.write_str("literal"),
            NodeKind::Blank => f.write_str("blank"),
        }
    }
}

/// An operation received a node of a kind it is not defined for.
///
/// This error indicates a programming error of the caller (e.g., counting references to a URI
/// node or using a literal as predicate). It should not be recovered from.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Expected a {expected} node, found a {found} node.")]
pub struct InvalidNodeKindError {
    /// A description of the accepted node kinds.
    pub expected: &'static str,
    /// The kind of the node that was passed.
    pub found: NodeKind,
}

impl InvalidNodeKindError {
    /// Creates a new [InvalidNodeKindError].
    pub fn new(expected: &'static str, found: NodeKind) -> Self {
        Self { expected, found }
    }
}
