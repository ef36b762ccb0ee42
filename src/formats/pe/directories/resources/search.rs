//! Lookups over an already-built resource tree.
//!
//! Everything here reads the in-memory tree only; no image bytes are touched.

use super::node::{NodeId, NodeKind, ResourceNode, ResourceTree};

/// Nodes matched by [`ResourceTree::search`], in pre-order
#[derive(Debug, Clone, Default)]
pub struct ResourceSearchResult<'t, 'a> {
    items: Vec<&'t ResourceNode<'a>>,
}

impl<'t, 'a> ResourceSearchResult<'t, 'a> {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[&'t ResourceNode<'a>] {
        &self.items
    }

    pub fn first(&self) -> Option<&'t ResourceNode<'a>> {
        self.items.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'t ResourceNode<'a>> + '_ {
        self.items.iter().copied()
    }
}

impl<'t, 'a> IntoIterator for ResourceSearchResult<'t, 'a> {
    type Item = &'t ResourceNode<'a>;
    type IntoIter = std::vec::IntoIter<&'t ResourceNode<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> ResourceTree<'a> {
    /// Walk parent links up to the node without a parent.
    ///
    /// Returns `None` only for an id that does not belong to this tree.
    pub fn find_root(&self, id: NodeId) -> Option<&ResourceNode<'a>> {
        let mut node = self.node(id)?;
        while let Some(parent) = node.parent() {
            node = self.node(parent)?;
        }
        Some(node)
    }

    /// Last node on the child chain of `id`
    pub fn find_last_child(&self, id: NodeId) -> Option<&ResourceNode<'a>> {
        self.children(id).last()
    }

    /// Every node for which `predicate` holds, walking pre-order from
    /// `start` (children before siblings).
    ///
    /// The walk never stops early, so matches nested inside a matching
    /// subtree are returned as well.
    pub fn search<'t, P>(&'t self, start: NodeId, mut predicate: P) -> ResourceSearchResult<'t, 'a>
    where
        P: FnMut(&ResourceNode<'a>) -> bool,
    {
        ResourceSearchResult {
            items: self.pre_order(start).filter(|n| predicate(*n)).collect(),
        }
    }

    /// First node in pre-order from `start` whose kind and directory level
    /// both match.
    pub fn find_by_type_and_level(
        &self,
        start: NodeId,
        kind: NodeKind,
        level: u32,
    ) -> Option<&ResourceNode<'a>> {
        self.pre_order(start)
            .find(|n| n.kind() == kind && n.directory_level() == level)
    }

    /// Nearest strict ancestor of `id` whose kind and directory level both
    /// match. Never descends.
    pub fn find_ancestor_by_type_and_level(
        &self,
        id: NodeId,
        kind: NodeKind,
        level: u32,
    ) -> Option<&ResourceNode<'a>> {
        let mut current = self.node(id)?.parent();
        while let Some(parent_id) = current {
            let parent = self.node(parent_id)?;
            if parent.kind() == kind && parent.directory_level() == level {
                return Some(parent);
            }
            current = parent.parent();
        }
        None
    }
}
