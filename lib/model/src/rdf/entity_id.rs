use crate::{BlankNode, Node};
use oxrdf::{BlankNodeIdParseError, IriParseError, NamedNode};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// The logical key that groups the quads describing one entity.
///
/// Entities are either identified by a URI or by a [BlankId] that is scoped to a root entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Uri(NamedNode),
    Blank(BlankId),
}

impl EntityId {
    /// Creates a URI-backed [EntityId].
    pub fn new(iri: impl Into<String>) -> Result<Self, IriParseError> {
        Ok(Self::Uri(NamedNode::new(iri)?))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, EntityId::Blank(_))
    }

    pub fn as_uri(&self) -> Option<&NamedNode> {
        match self {
            EntityId::Uri(uri) => Some(uri),
            EntityId::Blank(_) => None,
        }
    }

    /// Returns the root entity. For URI-backed identifiers, this is the identifier itself.
    pub fn root(&self) -> &EntityId {
        match self {
            EntityId::Uri(_) => self,
            EntityId::Blank(blank) => blank.root(),
        }
    }

    /// Returns the node that is used as subject for the quads of this entity.
    pub fn to_node(&self) -> Node {
        match self {
            EntityId::Uri(uri) => Node::Uri(uri.clone()),
            EntityId::Blank(blank) => Node::Blank(BlankNode::from_parts(
                blank.id.clone(),
                Arc::clone(&blank.root),
            )),
        }
    }

    /// Returns the entity identified by `node`. Literals do not identify entities.
    pub fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Uri(uri) => Some(EntityId::Uri(uri.clone())),
            Node::Blank(blank) => Some(blank.to_entity_id()),
            Node::Literal(_) => None,
        }
    }
}

impl From<NamedNode> for EntityId {
    fn from(value: NamedNode) -> Self {
        EntityId::Uri(value)
    }
}

impl From<BlankId> for EntityId {
    fn from(value: BlankId) -> Self {
        EntityId::Blank(value)
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Uri(uri) => write!(f, "{uri}"),
            EntityId::Blank(blank) => write!(f, "{blank}"),
        }
    }
}

/// Identifies a blank entity.
///
/// The local identifier is only meaningful relative to the root entity. Two [BlankId]s with the
/// same local identifier but different roots are distinct entities.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlankId {
    id: oxrdf::BlankNode,
    root: Arc<EntityId>,
}

impl BlankId {
    /// Creates a new [BlankId] scoped to the root of `scope`.
    pub fn new(
        id: impl Into<String>,
        scope: &EntityId,
    ) -> Result<Self, BlankNodeIdParseError> {
        Ok(Self::from_parts(oxrdf::BlankNode::new(id)?, root_of(scope)))
    }

    /// Creates a new [BlankId] without validating the local identifier.
    pub fn new_unchecked(id: impl Into<String>, scope: &EntityId) -> Self {
        Self::from_parts(oxrdf::BlankNode::new_unchecked(id), root_of(scope))
    }

    pub(crate) fn from_parts(id: oxrdf::BlankNode, root: Arc<EntityId>) -> Self {
        Self { id, root }
    }

    /// Returns the local identifier.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the root entity.
    pub fn root(&self) -> &EntityId {
        &self.root
    }
}

pub(super) fn root_of(scope: &EntityId) -> Arc<EntityId> {
    match scope {
        EntityId::Blank(blank) => Arc::clone(&blank.root),
        EntityId::Uri(_) => Arc::new(scope.clone()),
    }
}

impl PartialOrd for BlankId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlankId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.root
            .cmp(&other.root)
            .then_with(|| self.id.as_str().cmp(other.id.as_str()))
    }
}

impl Display for BlankId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use crate::{BlankId, BlankNode, EntityId, Node};
    use oxrdf::{Literal, NamedNode};

    fn root() -> EntityId {
        EntityId::new("http://example.com/root").unwrap()
    }

    #[test]
    fn node_roundtrip() {
        let uri = root();
        let blank = EntityId::Blank(BlankId::new_unchecked("b1", &uri));

        assert_eq!(EntityId::from_node(&uri.to_node()), Some(uri.clone()));
        assert_eq!(EntityId::from_node(&blank.to_node()), Some(blank));
    }

    #[test]
    fn literals_do_not_identify_entities() {
        let literal = Node::from(Literal::new_simple_literal("value"));
        assert_eq!(EntityId::from_node(&literal), None);
    }

    #[test]
    fn blank_id_and_blank_node_agree() {
        let blank = BlankId::new_unchecked("b1", &root());
        let node = BlankNode::new_unchecked("b1", &root());

        assert_eq!(EntityId::Blank(blank.clone()).to_node(), Node::Blank(node.clone()));
        assert_eq!(node.to_entity_id(), EntityId::Blank(blank));
    }

    #[test]
    fn root_of_nested_blank_is_uri() {
        let parent = EntityId::Blank(BlankId::new_unchecked("parent", &root()));
        let child = BlankId::new_unchecked("child", &parent);

        assert_eq!(child.root(), &root());
        assert_eq!(EntityId::Blank(child).root(), &root());
    }

    #[test]
    fn same_local_id_with_different_roots_differs() {
        let other = EntityId::Uri(NamedNode::new_unchecked("http://example.com/other"));
        assert_ne!(
            BlankId::new_unchecked("b1", &root()),
            BlankId::new_unchecked("b1", &other)
        );
    }

    #[test]
    fn invalid_iri_is_rejected() {
        assert!(EntityId::new("not an iri").is_err());
    }
}
