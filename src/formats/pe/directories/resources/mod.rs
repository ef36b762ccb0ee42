//! Resource directory (`.rsrc`) parsing
//!
//! The directory is an attacker-shaped tree: the builder borrows every raw
//! structure straight from the image after a bounds check, and the search
//! helpers then work on the validated in-memory tree only.

pub mod anomaly;
pub mod builder;
pub mod node;
pub mod raw;
pub mod search;
pub mod types;

pub use anomaly::ResourceAnomaly;
pub use builder::build_resource_tree;
pub use node::{Children, NodeId, NodeKind, PreOrder, RawNode, ResourceId, ResourceNode, ResourceTree};
pub use raw::{
    ImageResourceDataEntry, ImageResourceDirStringU, ImageResourceDirectory,
    ImageResourceDirectoryEntry,
};
pub use search::ResourceSearchResult;
pub use types::{lookup_type_descriptor, ResourceTypeDescriptor, RESOURCE_TYPES};

use serde::Serialize;
use tracing::debug;

use crate::formats::pe::sections::SectionTable;
use crate::formats::pe::types::{DataDirectory, ParseOptions, Result};
use crate::formats::pe::utils::BoundsCheck;

/// Parsed resource directory of one image
///
/// `tree` is `None` when the image has no usable resource directory, which
/// is an ordinary outcome rather than an error.
#[derive(Debug, Clone, Default)]
pub struct ResourcesView<'a> {
    base_offset: Option<usize>,
    tree: Option<ResourceTree<'a>>,
}

impl<'a> ResourcesView<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Root directory node
    pub fn root(&self) -> Option<&ResourceNode<'a>> {
        self.tree.as_ref().and_then(|t| t.root())
    }

    pub fn tree(&self) -> Option<&ResourceTree<'a>> {
        self.tree.as_ref()
    }

    /// File offset of the root directory header
    pub fn base_offset(&self) -> Option<usize> {
        self.base_offset
    }

    pub fn anomalies(&self) -> &[ResourceAnomaly] {
        self.tree.as_ref().map(|t| t.anomalies()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.root().is_none()
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.tree.as_ref().map_or(0, |t| t.len())
    }

    /// One summary per data descriptor, in tree order.
    ///
    /// Type, name and language come from the directory entries at levels
    /// 1, 2 and 3 above the leaf; any of them may be missing in an
    /// irregular tree.
    pub fn entries(&self) -> Vec<ResourceEntrySummary> {
        let (Some(tree), Some(root)) = (self.tree.as_ref(), self.root()) else {
            return Vec::new();
        };

        let key_at = |id: NodeId, level: u32| {
            tree.find_ancestor_by_type_and_level(id, NodeKind::DirectoryEntry, level)
                .and_then(|entry| entry.resource_id())
        };

        tree.search(root.id(), |n| n.kind() == NodeKind::DataDescriptor)
            .into_iter()
            .filter_map(|leaf| {
                let data = leaf.as_data_entry()?;
                let type_id = key_at(leaf.id(), 1);
                let descriptor = type_id
                    .as_ref()
                    .and_then(ResourceId::as_id)
                    .and_then(|code| lookup_type_descriptor(code as u32));
                Some(ResourceEntrySummary {
                    type_id,
                    name_id: key_at(leaf.id(), 2),
                    language_id: key_at(leaf.id(), 3),
                    descriptor_offset: leaf.offset(),
                    data_rva: data.data_rva(),
                    size: data.size(),
                    code_page: data.code_page(),
                    descriptor,
                })
            })
            .collect()
    }

    /// Release the tree. Consuming the view makes a second dispose
    /// impossible; an empty view has nothing to free.
    pub fn dispose(self) {
        if let Some(tree) = &self.tree {
            debug!(nodes = tree.len(), "Disposing resource tree");
        }
    }
}

/// Flat description of one resource leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntrySummary {
    pub type_id: Option<ResourceId>,
    pub name_id: Option<ResourceId>,
    pub language_id: Option<ResourceId>,
    /// File offset of the data descriptor itself
    pub descriptor_offset: usize,
    pub data_rva: u32,
    pub size: u32,
    pub code_page: u32,
    pub descriptor: Option<&'static ResourceTypeDescriptor>,
}

/// File offset of the resource root directory, if the image has one.
pub fn locate_resource_base(
    data: &[u8],
    sections: &SectionTable,
    dir: Option<&DataDirectory>,
) -> Option<usize> {
    let Some(dir) = dir else {
        debug!("No resource data directory");
        return None;
    };
    if dir.virtual_address == 0 || dir.size == 0 {
        debug!(
            rva = dir.virtual_address,
            size = dir.size,
            "Resource data directory is empty"
        );
        return None;
    }
    let Some(offset) = sections.rva_to_offset(dir.virtual_address) else {
        debug!(rva = dir.virtual_address, "Resource RVA is outside every section");
        return None;
    };
    if !data.can_read(offset, ImageResourceDirectory::SIZE) {
        debug!(offset, "Resource root directory runs past the image");
        return None;
    }
    Some(offset)
}

/// Parse the resource directory
pub fn load_resources<'a>(
    data: &'a [u8],
    sections: &SectionTable,
    dir: Option<&DataDirectory>,
    options: &ParseOptions,
) -> Result<ResourcesView<'a>> {
    if !options.parse_resources {
        return Ok(ResourcesView::empty());
    }
    let Some(base) = locate_resource_base(data, sections, dir) else {
        return Ok(ResourcesView::empty());
    };

    let span = crate::span_trace!("load_resources", base);
    let _guard = span.enter();

    let tree = build_resource_tree(data, base, options)?;
    if tree.root().is_none() {
        return Ok(ResourcesView::empty());
    }
    Ok(ResourcesView {
        base_offset: Some(base),
        tree: Some(tree),
    })
}
