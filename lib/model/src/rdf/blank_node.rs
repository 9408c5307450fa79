use super::entity_id::root_of;
use crate::{BlankId, EntityId};
use oxrdf::{BlankNodeIdParseError, NamedNode};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A blank node that is scoped to the root entity that owns it.
///
/// Blank node identifiers are only unique within their scope. Two blank nodes are equal if they
/// have the same local identifier and the same scope. The graph the blank node was read from is
/// carried along for addressing, but does not take part in equality, hashing or ordering.
#[derive(Clone, Debug)]
pub struct BlankNode {
    id: oxrdf::BlankNode,
    scope: Arc<EntityId>,
    graph: Option<NamedNode>,
}

impl BlankNode {
    /// Creates a new [BlankNode] with the local identifier `id`.
    ///
    /// The node is scoped to the root of `scope`. Passing a blank entity therefore scopes the new
    /// node to the same root as that entity.
    pub fn new(
        id: impl Into<String>,
        scope: &EntityId,
    ) -> Result<Self, BlankNodeIdParseError> {
        Ok(Self::from_parts(oxrdf::BlankNode::new(id)?, root_of(scope)))
    }

    /// Creates a new [BlankNode] without validating the local identifier.
    pub fn new_unchecked(id: impl Into<String>, scope: &EntityId) -> Self {
        Self::from_parts(oxrdf::BlankNode::new_unchecked(id), root_of(scope))
    }

    /// Creates a [BlankNode] with a fresh random identifier in the given `scope`.
    pub fn generate(scope: &EntityId) -> Self {
        Self::from_parts(oxrdf::BlankNode::default(), root_of(scope))
    }

    pub(crate) fn from_parts(id: oxrdf::BlankNode, scope: Arc<EntityId>) -> Self {
        Self {
            id,
            scope,
            graph: None,
        }
    }

    /// Returns the local identifier.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the root entity this blank node is scoped to.
    pub fn scope(&self) -> &EntityId {
        &self.scope
    }

    /// Returns the graph this blank node has been read from, if known.
    pub fn graph(&self) -> Option<&NamedNode> {
        self.graph.as_ref()
    }

    /// Returns a copy of this node that remembers the graph it was read from.
    #[must_use]
    pub fn with_graph(self, graph: NamedNode) -> Self {
        Self {
            graph: Some(graph),
            ..self
        }
    }

    /// Returns the identifier of the entity described by this blank node.
    pub fn to_entity_id(&self) -> EntityId {
        EntityId::Blank(BlankId::from_parts(self.id.clone(), Arc::clone(&self.scope)))
    }
}

impl PartialEq for BlankNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.scope == other.scope
    }
}

impl Eq for BlankNode {}

impl Hash for BlankNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.scope.hash(state);
    }
}

impl PartialOrd for BlankNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlankNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scope
            .cmp(&other.scope)
            .then_with(|| self.id.as_str().cmp(other.id.as_str()))
    }
}

impl Display for BlankNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
