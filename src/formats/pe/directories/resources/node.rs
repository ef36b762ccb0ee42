//! Resource tree node model.
//!
//! Nodes live in a single arena owned by [`ResourceTree`] and refer to each
//! other by [`NodeId`]. Links follow a first-child / next-sibling layout, so
//! dropping the tree frees everything at once without recursing.

use serde::Serialize;

use super::anomaly::ResourceAnomaly;
use super::raw::{
    ImageResourceDataEntry, ImageResourceDirStringU, ImageResourceDirectory,
    ImageResourceDirectoryEntry,
};
use crate::formats::pe::types::{PeError, Result};

/// Index of a node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which raw structure a node wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Directory,
    DirectoryEntry,
    NameString,
    DataDescriptor,
}

/// Borrowed view of the structure behind a node
#[derive(Debug, Clone, Copy)]
pub enum RawNode<'a> {
    Directory(&'a ImageResourceDirectory),
    DirectoryEntry(&'a ImageResourceDirectoryEntry),
    NameString(&'a ImageResourceDirStringU),
    DataDescriptor(&'a ImageResourceDataEntry),
}

impl RawNode<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Directory(_) => NodeKind::Directory,
            Self::DirectoryEntry(_) => NodeKind::DirectoryEntry,
            Self::NameString(_) => NodeKind::NameString,
            Self::DataDescriptor(_) => NodeKind::DataDescriptor,
        }
    }
}

/// Resource name/ID as keyed by a directory entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ResourceId {
    Id(u16),
    Name(String),
}

impl ResourceId {
    pub fn as_id(&self) -> Option<u16> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }
}

/// One element of the resource directory tree
#[derive(Debug, Clone)]
pub struct ResourceNode<'a> {
    id: NodeId,
    depth: u8,
    directory_level: u32,
    offset: usize,
    raw: RawNode<'a>,
    decoded_name: Option<String>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl<'a> ResourceNode<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.raw.kind()
    }

    /// Distance from the root
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Tier in the type / name / language layout; bumps by one below each
    /// directory
    pub fn directory_level(&self) -> u32 {
        self.directory_level
    }

    /// File offset of the wrapped structure
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn raw(&self) -> RawNode<'a> {
        self.raw
    }

    /// Decoded name of a name-keyed directory entry
    pub fn decoded_name(&self) -> Option<&str> {
        self.decoded_name.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn as_directory(&self) -> Option<&'a ImageResourceDirectory> {
        match self.raw {
            RawNode::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn as_entry(&self) -> Option<&'a ImageResourceDirectoryEntry> {
        match self.raw {
            RawNode::DirectoryEntry(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn as_name_string(&self) -> Option<&'a ImageResourceDirStringU> {
        match self.raw {
            RawNode::NameString(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_data_entry(&self) -> Option<&'a ImageResourceDataEntry> {
        match self.raw {
            RawNode::DataDescriptor(data) => Some(data),
            _ => None,
        }
    }

    /// Key of a directory entry: the decoded name for name-keyed entries,
    /// the numeric id otherwise. Name-keyed entries whose name could not be
    /// read have no key.
    pub fn resource_id(&self) -> Option<ResourceId> {
        let entry = self.as_entry()?;
        if entry.name_is_string() {
            self.decoded_name.clone().map(ResourceId::Name)
        } else {
            Some(ResourceId::Id(entry.id()))
        }
    }
}

/// Arena holding every node of one resource directory
#[derive(Debug, Clone, Default)]
pub struct ResourceTree<'a> {
    nodes: Vec<ResourceNode<'a>>,
    anomalies: Vec<ResourceAnomaly>,
}

impl<'a> ResourceTree<'a> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create a node and append it as the last child of `parent`.
    ///
    /// Nodes created without a parent are roots. Storage is reserved
    /// fallibly so exhaustion surfaces as an error.
    pub(crate) fn create_node(
        &mut self,
        depth: u8,
        raw: RawNode<'a>,
        offset: usize,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let index = u32::try_from(self.nodes.len())
            .map_err(|_| PeError::LimitExceeded("resource nodes"))?;
        self.nodes
            .try_reserve(1)
            .map_err(|_| PeError::AllocationFailed {
                what: "resource nodes",
                requested: std::mem::size_of::<ResourceNode<'a>>(),
            })?;
        let id = NodeId(index);

        let directory_level = match parent {
            Some(p) => {
                let parent_node = &self.nodes[p.index()];
                match parent_node.kind() {
                    NodeKind::Directory => parent_node.directory_level + 1,
                    _ => parent_node.directory_level,
                }
            }
            None => 0,
        };

        self.nodes.push(ResourceNode {
            id,
            depth,
            directory_level,
            offset,
            raw,
            decoded_name: None,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
        });

        if let Some(p) = parent {
            match self.nodes[p.index()].last_child {
                Some(last) => self.nodes[last.index()].next_sibling = Some(id),
                None => self.nodes[p.index()].first_child = Some(id),
            }
            self.nodes[p.index()].last_child = Some(id);
        }

        Ok(id)
    }

    pub(crate) fn set_decoded_name(&mut self, id: NodeId, name: String) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.decoded_name = Some(name);
        }
    }

    pub(crate) fn push_anomaly(&mut self, anomaly: ResourceAnomaly) -> Result<()> {
        self.anomalies
            .try_reserve(1)
            .map_err(|_| PeError::AllocationFailed {
                what: "resource anomalies",
                requested: std::mem::size_of::<ResourceAnomaly>(),
            })?;
        self.anomalies.push(anomaly);
        Ok(())
    }

    /// The root directory node, if any node was built
    pub fn root(&self) -> Option<&ResourceNode<'a>> {
        self.nodes.first()
    }

    /// Look up a node; ids from another tree may return `None`
    pub fn node(&self, id: NodeId) -> Option<&ResourceNode<'a>> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> &[ResourceNode<'a>] {
        &self.nodes
    }

    /// Branches cut short while this tree was built
    pub fn anomalies(&self) -> &[ResourceAnomaly] {
        &self.anomalies
    }

    pub fn parent(&self, id: NodeId) -> Option<&ResourceNode<'a>> {
        self.node(id)?.parent.and_then(|p| self.node(p))
    }

    /// Direct children of `id`, in file order
    pub fn children(&self, id: NodeId) -> Children<'_, 'a> {
        Children {
            tree: self,
            next: self.node(id).and_then(|n| n.first_child),
        }
    }

    /// Pre-order walk of the whole tree from the root
    pub fn iter(&self) -> PreOrder<'_, 'a> {
        match self.root() {
            Some(root) => self.pre_order(root.id),
            None => PreOrder {
                tree: self,
                stack: Vec::new(),
            },
        }
    }

    /// Pre-order walk starting at `start`: the node, its subtree, then each
    /// following sibling with its subtree.
    pub fn pre_order(&self, start: NodeId) -> PreOrder<'_, 'a> {
        let mut stack = Vec::new();
        if self.node(start).is_some() {
            stack.push(start);
        }
        PreOrder { tree: self, stack }
    }
}

/// Iterator over the children of one node
pub struct Children<'t, 'a> {
    tree: &'t ResourceTree<'a>,
    next: Option<NodeId>,
}

impl<'t, 'a> Iterator for Children<'t, 'a> {
    type Item = &'t ResourceNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.node(self.next?)?;
        self.next = node.next_sibling;
        Some(node)
    }
}

/// Depth-first, child-before-sibling iterator with an explicit stack
pub struct PreOrder<'t, 'a> {
    tree: &'t ResourceTree<'a>,
    stack: Vec<NodeId>,
}

impl<'t, 'a> Iterator for PreOrder<'t, 'a> {
    type Item = &'t ResourceNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.node(self.stack.pop()?)?;
        if let Some(sibling) = node.next_sibling {
            self.stack.push(sibling);
        }
        if let Some(child) = node.first_child {
            self.stack.push(child);
        }
        Some(node)
    }
}
