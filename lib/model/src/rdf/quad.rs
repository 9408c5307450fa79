use crate::{EntityId, InvalidNodeKindError, Node, NodeKind};
use std::fmt::{Display, Formatter};

/// An immutable quad that belongs to an entity.
///
/// The subject of a quad is always the node form of its [EntityId]. Equality and hashing are
/// structural over all components, including the graph and the owning entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    subject: Node,
    predicate: Node,
    object: Node,
    graph: Option<Node>,
    entity_id: EntityId,
}

impl Quad {
    /// Creates a new [Quad] describing `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `predicate` is a literal.
    pub fn new(
        entity_id: EntityId,
        predicate: impl Into<Node>,
        object: impl Into<Node>,
        graph: Option<Node>,
    ) -> Result<Self, InvalidNodeKindError> {
        let predicate = predicate.into();
        Self::check_predicate(&predicate)?;
        Ok(Self {
            subject: entity_id.to_node(),
            predicate,
            object: object.into(),
            graph,
            entity_id,
        })
    }

    /// Checks whether `predicate` may be used in the predicate position.
    pub fn check_predicate(predicate: &Node) -> Result<(), InvalidNodeKindError> {
        match predicate.kind() {
            NodeKind::Literal => Err(InvalidNodeKindError::new(
                "URI or blank",
                NodeKind::Literal,
            )),
            NodeKind::Uri | NodeKind::Blank => Ok(()),
        }
    }

    pub fn subject(&self) -> &Node {
        &self.subject
    }

    pub fn predicate(&self) -> &Node {
        &self.predicate
    }

    pub fn object(&self) -> &Node {
        &self.object
    }

    pub fn graph(&self) -> Option<&Node> {
        self.graph.as_ref()
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    /// Returns a copy of this quad that is placed in `graph`.
    #[must_use]
    pub fn in_graph(self, graph: Option<Node>) -> Self {
        Self { graph, ..self }
    }

    /// Returns the key of this quad in the subject-predicate index.
    pub fn subject_predicate(&self) -> SubjectPredicate {
        SubjectPredicate::new(self.subject.clone(), self.predicate.clone())
    }

    /// Compares subject, predicate and object while ignoring the graph and the owning entity.
    pub fn loose_eq(&self, other: &Quad) -> bool {
        self.subject == other.subject
            && self.predicate == other.predicate
            && self.object == other.object
    }

    /// Whether the subject or the object of this quad is a blank node.
    pub fn touches_blank(&self) -> bool {
        self.subject.is_blank() || self.object.is_blank()
    }
}

impl Display for Quad {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {graph}")?;
        }
        f.write_str(" .")
    }
}

/// The key of the subject-predicate index.
///
/// The key deliberately ignores the graph, such that the values of a predicate that are spread
/// across multiple graphs are found with a single lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubjectPredicate {
    subject: Node,
    predicate: Node,
}

impl SubjectPredicate {
    pub fn new(subject: Node, predicate: Node) -> Self {
        Self { subject, predicate }
    }

    pub fn subject(&self) -> &Node {
        &self.subject
    }

    pub fn predicate(&self) -> &Node {
        &self.predicate
    }
}
