use itertools::Itertools;
use rdf_working_set_model::{EntityId, Node, Quad};
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};

/// An unordered set of quads carried by a [DatasetChange].
pub type QuadSet = FxHashSet<Quad>;

/// A change to the dataset that must be written back on commit.
///
/// [GraphUpdate]s and [GraphReconstruct]s are scoped to a single graph, which may be the default
/// graph. [EntityDelete](Self::EntityDelete) and [RemoveReferences](Self::RemoveReferences) affect
/// every graph and never merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetChange {
    /// Removes and adds individual quads of an entity in a graph.
    GraphUpdate(GraphUpdate),
    /// Replaces the whole content of a graph.
    GraphReconstruct(GraphReconstruct),
    /// Deletes every quad of an entity.
    EntityDelete(EntityId),
    /// Deletes every quad that references an entity as object.
    RemoveReferences(EntityId),
}

impl DatasetChange {
    /// Returns the entity this change originates from.
    pub fn entity(&self) -> &EntityId {
        match self {
            DatasetChange::GraphUpdate(update) => update.entity(),
            DatasetChange::GraphReconstruct(reconstruct) => reconstruct.entity(),
            DatasetChange::EntityDelete(entity) | DatasetChange::RemoveReferences(entity) => {
                entity
            }
        }
    }

    /// Returns the part of the dataset this change applies to.
    pub fn scope(&self) -> ChangeScope<'_> {
        match self {
            DatasetChange::GraphUpdate(update) => ChangeScope::Graph(update.graph()),
            DatasetChange::GraphReconstruct(reconstruct) => {
                ChangeScope::Graph(reconstruct.graph())
            }
            DatasetChange::EntityDelete(_) | DatasetChange::RemoveReferences(_) => {
                ChangeScope::CrossGraph
            }
        }
    }

    /// Whether this change affects more than one graph.
    pub fn is_cross_graph(&self) -> bool {
        self.scope() == ChangeScope::CrossGraph
    }

    /// Whether applying this change would be a no-op.
    pub fn is_empty(&self) -> bool {
        match self {
            DatasetChange::GraphUpdate(update) => update.is_empty(),
            DatasetChange::GraphReconstruct(reconstruct) => reconstruct.is_empty(),
            DatasetChange::EntityDelete(_) | DatasetChange::RemoveReferences(_) => false,
        }
    }

    /// Whether `later`, applied after this change, can be folded into this change.
    ///
    /// Only graph-scoped changes of the same entity and graph merge. An update followed by a
    /// reconstruct does not merge, as the update is not part of the reconstructed content.
    pub fn can_merge_with(&self, later: &DatasetChange) -> bool {
        let mergeable_kinds = match (self, later) {
            (DatasetChange::GraphUpdate(_), DatasetChange::GraphUpdate(_))
            | (DatasetChange::GraphReconstruct(_), DatasetChange::GraphUpdate(_))
            | (DatasetChange::GraphReconstruct(_), DatasetChange::GraphReconstruct(_)) => true,
            (DatasetChange::GraphUpdate(_), DatasetChange::GraphReconstruct(_))
            | (_, DatasetChange::EntityDelete(_))
            | (_, DatasetChange::RemoveReferences(_))
            | (DatasetChange::EntityDelete(_), _)
            | (DatasetChange::RemoveReferences(_), _) => false,
        };

        mergeable_kinds && self.entity() == later.entity() && self.scope() == later.scope()
    }

    /// Folds `later` into this change.
    ///
    /// # Errors
    ///
    /// Returns both changes unmodified if they cannot be merged.
    pub fn merge_with(
        self,
        later: DatasetChange,
    ) -> Result<DatasetChange, (DatasetChange, DatasetChange)> {
        if !self.can_merge_with(&later) {
            return Err((self, later));
        }

        match (self, later) {
            (DatasetChange::GraphUpdate(earlier), DatasetChange::GraphUpdate(later)) => {
                Ok(DatasetChange::GraphUpdate(earlier.compose(later)))
            }
            (DatasetChange::GraphReconstruct(mut earlier), DatasetChange::GraphUpdate(later)) => {
                earlier.apply(later);
                Ok(DatasetChange::GraphReconstruct(earlier))
            }
            (DatasetChange::GraphReconstruct(_), later @ DatasetChange::GraphReconstruct(_)) => {
                Ok(later)
            }
            (earlier, later) => Err((earlier, later)),
        }
    }
}

impl From<GraphUpdate> for DatasetChange {
    fn from(value: GraphUpdate) -> Self {
        DatasetChange::GraphUpdate(value)
    }
}

impl From<GraphReconstruct> for DatasetChange {
    fn from(value: GraphReconstruct) -> Self {
        DatasetChange::GraphReconstruct(value)
    }
}

impl Display for DatasetChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetChange::GraphUpdate(update) => update.fmt(f),
            DatasetChange::GraphReconstruct(reconstruct) => reconstruct.fmt(f),
            DatasetChange::EntityDelete(entity) => write!(f, "EntityDelete({entity})"),
            DatasetChange::RemoveReferences(entity) => {
                write!(f, "RemoveReferences({entity})")
            }
        }
    }
}

/// The part of the dataset a [DatasetChange] applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeScope<'change> {
    /// A single graph. [None] is the default graph.
    Graph(Option<&'change Node>),
    /// Every graph that holds quads of the entity.
    CrossGraph,
}

/// Removes and adds quads of an entity in a single graph. A graph of [None] is the default graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphUpdate {
    entity: EntityId,
    graph: Option<Node>,
    removed: QuadSet,
    added: QuadSet,
}

impl GraphUpdate {
    pub fn new(
        entity: EntityId,
        graph: Option<Node>,
        removed: impl IntoIterator<Item = Quad>,
        added: impl IntoIterator<Item = Quad>,
    ) -> Self {
        Self {
            entity,
            graph,
            removed: removed.into_iter().collect(),
            added: added.into_iter().collect(),
        }
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn graph(&self) -> Option<&Node> {
        self.graph.as_ref()
    }

    pub fn removed(&self) -> &QuadSet {
        &self.removed
    }

    pub fn added(&self) -> &QuadSet {
        &self.added
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Composes this update with a `later` update of the same entity and graph.
    ///
    /// A quad that is added and later removed (or removed and later added again) cancels out.
    fn compose(self, later: GraphUpdate) -> GraphUpdate {
        let added = self
            .added
            .iter()
            .filter(|quad| !later.removed.contains(*quad))
            .chain(later.added.iter().filter(|quad| !self.removed.contains(*quad)))
            .cloned()
            .collect();
        let removed = self
            .removed
            .iter()
            .filter(|quad| !later.added.contains(*quad))
            .chain(later.removed.iter().filter(|quad| !self.added.contains(*quad)))
            .cloned()
            .collect();

        GraphUpdate {
            entity: self.entity,
            graph: self.graph,
            removed,
            added,
        }
    }
}

impl Display for GraphUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GraphUpdate({}, {}, removed: [{}], added: [{}])",
            self.entity,
            DisplayGraph(self.graph.as_ref()),
            self.removed.iter().sorted().join(", "),
            self.added.iter().sorted().join(", ")
        )
    }
}

/// Replaces the content of a graph with the given quads. A graph of [None] is the default graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphReconstruct {
    entity: EntityId,
    graph: Option<Node>,
    content: QuadSet,
}

impl GraphReconstruct {
    pub fn new(
        entity: EntityId,
        graph: Option<Node>,
        content: impl IntoIterator<Item = Quad>,
    ) -> Self {
        Self {
            entity,
            graph,
            content: content.into_iter().collect(),
        }
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn graph(&self) -> Option<&Node> {
        self.graph.as_ref()
    }

    pub fn content(&self) -> &QuadSet {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn apply(&mut self, update: GraphUpdate) {
        self.content.retain(|quad| !update.removed.contains(quad));
        self.content.extend(update.added);
    }
}

impl Display for GraphReconstruct {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GraphReconstruct({}, {}, content: [{}])",
            self.entity,
            DisplayGraph(self.graph.as_ref()),
            self.content.iter().sorted().join(", ")
        )
    }
}

struct DisplayGraph<'a>(Option<&'a Node>);

impl Display for DisplayGraph<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(graph) => graph.fmt(f),
            None => f.write_str("DEFAULT"),
        }
    }
}
