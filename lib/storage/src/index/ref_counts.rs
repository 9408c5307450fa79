use crate::QuadCollection;
use rdf_working_set_model::{BlankNode, InvalidNodeKindError, Node};
use rustc_hash::FxHashMap;

/// Counts how many quads reference a blank node as their object.
///
/// Only blank nodes are counted. Passing any other node kind is a precondition violation and
/// yields an [InvalidNodeKindError]. Nodes whose count drops to zero are removed from the map,
/// such that an absent node and a node with a count of zero are indistinguishable.
#[derive(Clone, Debug, Default)]
pub struct BlankNodeRefCounts {
    counts: FxHashMap<BlankNode, usize>,
}

impl BlankNodeRefCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of `node` and returns the new count.
    pub fn increment(&mut self, node: &Node) -> Result<usize, InvalidNodeKindError> {
        let blank = expect_blank(node)?;
        let count = self.counts.entry(blank.clone()).or_default();
        *count += 1;
        Ok(*count)
    }

    /// Decrements the count of `node` and returns the new count.
    ///
    /// Decrementing an unknown node is a no-op that returns zero.
    pub fn decrement(&mut self, node: &Node) -> Result<usize, InvalidNodeKindError> {
        let blank = expect_blank(node)?;
        let Some(count) = self.counts.get_mut(blank) else {
            return Ok(0);
        };

        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(blank);
        }
        Ok(remaining)
    }

    /// Returns the count of `node`.
    pub fn count(&self, node: &Node) -> Result<usize, InvalidNodeKindError> {
        let blank = expect_blank(node)?;
        Ok(self.counts.get(blank).copied().unwrap_or(0))
    }

    /// Drops the count of `node`.
    pub fn forget(&mut self, node: &BlankNode) {
        self.counts.remove(node);
    }

    /// Returns the number of blank nodes with a positive count.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Recounts all blank objects of `quads`.
    pub fn rebuild(&mut self, quads: &QuadCollection) {
        self.counts.clear();
        for quad in quads.quads() {
            if let Node::Blank(blank) = quad.object() {
                *self.counts.entry(blank.clone()).or_default() += 1;
            }
        }
    }
}

fn expect_blank(node: &Node) -> Result<&BlankNode, InvalidNodeKindError> {
    node.as_blank()
        .ok_or_else(|| InvalidNodeKindError::new("blank", node.kind()))
}

#[cfg(test)]
mod tests {
    use crate::{BlankNodeRefCounts, QuadCollection};
    use rdf_working_set_model::{
        BlankNode, EntityId, Literal, NamedNode, Node, NodeKind, Quad,
    };

    fn root() -> EntityId {
        EntityId::Uri(NamedNode::new_unchecked("http://example.com/root"))
    }

    fn blank(id: &str) -> Node {
        Node::Blank(BlankNode::new_unchecked(id, &root()))
    }

    #[test]
    fn increment_and_decrement() {
        let mut counts = BlankNodeRefCounts::new();
        let b1 = blank("b1");

        assert_eq!(counts.increment(&b1).unwrap(), 1);
        assert_eq!(counts.increment(&b1).unwrap(), 2);
        assert_eq!(counts.decrement(&b1).unwrap(), 1);
        assert_eq!(counts.decrement(&b1).unwrap(), 0);
        assert_eq!(counts.count(&b1).unwrap(), 0);
        assert!(counts.is_empty());
    }

    #[test]
    fn decrement_unknown_node_is_noop() {
        let mut counts = BlankNodeRefCounts::new();
        assert_eq!(counts.decrement(&blank("b1")).unwrap(), 0);
        assert!(counts.is_empty());
    }

    #[test]
    fn non_blank_nodes_are_rejected() {
        let mut counts = BlankNodeRefCounts::new();
        let uri = Node::Uri(NamedNode::new_unchecked("http://example.com/a"));
        let literal = Node::Literal(Literal::new_simple_literal("a"));

        assert_eq!(counts.increment(&uri).unwrap_err().found, NodeKind::Uri);
        assert_eq!(counts.decrement(&literal).unwrap_err().found, NodeKind::Literal);
        assert!(counts.count(&uri).is_err());
    }

    #[test]
    fn rebuild_counts_blank_objects() {
        let mut collection = QuadCollection::new(false);
        let predicate = NamedNode::new_unchecked("http://example.com/p");
        let other = EntityId::Uri(NamedNode::new_unchecked("http://example.com/other"));
        collection.add(Quad::new(root(), predicate.clone(), blank("b1"), None).unwrap());
        collection.add(Quad::new(other, predicate.clone(), blank("b1"), None).unwrap());
        collection.add(Quad::new(root(), predicate, blank("b2"), None).unwrap());

        let mut counts = BlankNodeRefCounts::new();
        counts.increment(&blank("stale")).unwrap();
        counts.rebuild(&collection);

        assert_eq!(counts.count(&blank("b1")).unwrap(), 2);
        assert_eq!(counts.count(&blank("b2")).unwrap(), 1);
        assert_eq!(counts.count(&blank("stale")).unwrap(), 0);
        assert_eq!(counts.len(), 2);
    }
}
