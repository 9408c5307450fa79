use crate::{BlankNode, NodeKind};
use oxrdf::{Literal, NamedNode};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A node in the working set.
///
/// Nodes are immutable values. URI nodes compare by their absolute URI, literals by value, datatype
/// and language tag, and blank nodes by their local identifier and scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    Uri(NamedNode),
    Literal(Literal),
    Blank(BlankNode),
}

impl Node {
    /// Returns the [NodeKind] of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Uri(_) => NodeKind::Uri,
            Node::Literal(_) => NodeKind::Literal,
            Node::Blank(_) => NodeKind::Blank,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Node::Uri(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    pub fn as_uri(&self) -> Option<&NamedNode> {
        match self {
            Node::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankNode> {
        match self {
            Node::Blank(blank) => Some(blank),
            _ => None,
        }
    }

    /// Returns the language tag if this node is a language-tagged literal.
    pub fn language(&self) -> Option<&str> {
        self.as_literal().and_then(Literal::language)
    }
}

impl From<NamedNode> for Node {
    fn from(value: NamedNode) -> Self {
        Node::Uri(value)
    }
}

impl From<Literal> for Node {
    fn from(value: Literal) -> Self {
        Node::Literal(value)
    }
}

impl From<BlankNode> for Node {
    fn from(value: BlankNode) -> Self {
        Node::Blank(value)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Uri(uri) => write!(f, "{uri}"),
            Node::Literal(literal) => write!(f, "{literal}"),
            Node::Blank(blank) => write!(f, "{blank}"),
        }
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Blank nodes sort before URIs, which sort before literals.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Node::Blank(a), Node::Blank(b)) => a.cmp(b),
            (Node::Blank(_), _) => Ordering::Less,
            (Node::Uri(_), Node::Blank(_)) => Ordering::Greater,
            (Node::Uri(a), Node::Uri(b)) => a.as_str().cmp(b.as_str()),
            (Node::Uri(_), Node::Literal(_)) => Ordering::Less,
            (Node::Literal(a), Node::Literal(b)) => cmp_literals(a, b),
            (Node::Literal(_), _) => Ordering::Greater,
        }
    }
}

fn cmp_literals(a: &Literal, b: &Literal) -> Ordering {
    a.value()
        .cmp(b.value())
        .then_with(|| a.datatype().as_str().cmp(b.datatype().as_str()))
        .then_with(|| a.language().cmp(&b.language()))
}
