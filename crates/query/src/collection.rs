use std::ops::{ControlFlow, Index};
use std::{iter, slice};

use html::NodeKey;

/// Ordered, densely indexed node list plus the selector text it was resolved from.
///
/// Built once per resolution and never mutated afterwards; `selector` is empty when the
/// nodes did not come from a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collection {
    nodes: Vec<NodeKey>,
    selector: String,
}

impl Collection {
    pub fn new(nodes: impl IntoIterator<Item = NodeKey>, selector: impl Into<String>) -> Self {
        Collection {
            nodes: nodes.into_iter().collect(),
            selector: selector.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeKey> {
        self.nodes.get(index).copied()
    }

    pub fn first(&self) -> Option<NodeKey> {
        self.get(0)
    }

    pub fn iter(&self) -> iter::Copied<slice::Iter<'_, NodeKey>> {
        self.nodes.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeKey] {
        &self.nodes
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Visit `(index, node)` in order until the callback breaks.
    pub fn each<F>(&self, mut callback: F) -> &Self
    where
        F: FnMut(usize, NodeKey) -> ControlFlow<()>,
    {
        for (index, node) in self.iter().enumerate() {
            if callback(index, node).is_break() {
                break;
            }
        }
        self
    }
}

impl Index<usize> for Collection {
    type Output = NodeKey;

    fn index(&self, index: usize) -> &NodeKey {
        &self.nodes[index]
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = NodeKey;
    type IntoIter = iter::Copied<slice::Iter<'a, NodeKey>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<NodeKey>> for Collection {
    fn from(nodes: Vec<NodeKey>) -> Self {
        Collection::new(nodes, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ids: &[u32]) -> Vec<NodeKey> {
        ids.iter().copied().map(NodeKey).collect()
    }

    #[test]
    fn empty_collection_has_no_selector() {
        let c = Collection::empty();
        assert_eq!(c.len(), 0);
        assert!(c.is_empty());
        assert_eq!(c.selector(), "");
        assert_eq!(c.get(0), None);
    }

    #[test]
    fn indexes_densely_and_keeps_selector() {
        let c = Collection::new(keys(&[4, 2, 9]), "li");
        assert_eq!(c.len(), 3);
        assert_eq!(c[1], NodeKey(2));
        assert_eq!(c.get(2), Some(NodeKey(9)));
        assert_eq!(c.first(), Some(NodeKey(4)));
        assert_eq!(c.selector(), "li");
        let collected: Vec<_> = (&c).into_iter().collect();
        assert_eq!(collected, keys(&[4, 2, 9]));
    }

    #[test]
    fn each_stops_on_break_and_returns_self() {
        let c = Collection::new(keys(&[1, 2, 3, 4]), "");
        let mut seen = Vec::new();
        let returned = c.each(|i, node| {
            seen.push((i, node));
            if i == 1 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(std::ptr::eq(returned, &c));
        assert_eq!(seen, vec![(0, NodeKey(1)), (1, NodeKey(2))]);
    }
}
