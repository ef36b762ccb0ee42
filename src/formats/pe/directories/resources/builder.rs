//! Recursive descent over the raw resource directory.
//!
//! Every structure is borrowed through [`read_struct`], which asks the
//! bounds oracle first. A failed check abandons that branch only; the
//! problem is logged and kept as a [`ResourceAnomaly`] on the tree.

use tracing::{debug, trace, warn};

use super::anomaly::ResourceAnomaly;
use super::node::{NodeId, NodeKind, RawNode, ResourceTree};
use super::raw::{
    ImageResourceDataEntry, ImageResourceDirStringU, ImageResourceDirectory,
    ImageResourceDirectoryEntry,
};
use crate::formats::pe::types::{ParseOptions, PeError, Result};
use crate::formats::pe::utils::{decode_wide_to_narrow, read_struct, ReadExt};

/// Build the resource tree rooted at file offset `base`.
///
/// Malformed input never fails the build; only allocation failure does.
/// An unreadable root header yields an empty tree.
pub fn build_resource_tree<'a>(
    data: &'a [u8],
    base: usize,
    options: &ParseOptions,
) -> Result<ResourceTree<'a>> {
    let mut builder = TreeBuilder {
        data,
        base,
        options,
        max_depth: options.resource_depth_limit(),
        tree: ResourceTree::new(),
        budget_exhausted: false,
    };

    let Some(root_dir) = read_struct::<ImageResourceDirectory>(data, base) else {
        debug!(offset = base, "Resource root directory is unreadable");
        return Ok(builder.tree);
    };
    if options.max_resource_nodes == 0 {
        builder.record(ResourceAnomaly::NodeLimitReached { limit: 0 })?;
        return Ok(builder.tree);
    }

    let root = builder
        .tree
        .create_node(0, RawNode::Directory(root_dir), base, None)?;
    builder.visit(root)?;

    debug!(
        nodes = builder.tree.len(),
        anomalies = builder.tree.anomalies().len(),
        "Resource tree built"
    );
    Ok(builder.tree)
}

struct TreeBuilder<'a, 'o> {
    data: &'a [u8],
    /// File offset every in-directory offset is relative to
    base: usize,
    options: &'o ParseOptions,
    max_depth: u8,
    tree: ResourceTree<'a>,
    budget_exhausted: bool,
}

impl<'a> TreeBuilder<'a, '_> {
    fn visit(&mut self, id: NodeId) -> Result<()> {
        let Some(node) = self.tree.node(id) else {
            return Err(PeError::MalformedResourceDirectory);
        };
        let (depth, offset, raw, parent) = (node.depth(), node.offset(), node.raw(), node.parent());

        match raw {
            RawNode::Directory(dir) => self.visit_directory(id, depth, offset, dir),
            RawNode::DirectoryEntry(entry) => self.visit_entry(id, depth, offset, entry),
            RawNode::NameString(name) => match parent {
                Some(owner) => self.visit_name(owner, offset, name),
                None => Ok(()),
            },
            // Payload extraction starts here; only the descriptor is read.
            RawNode::DataDescriptor(_) => Ok(()),
        }
    }

    fn visit_directory(
        &mut self,
        id: NodeId,
        depth: u8,
        offset: usize,
        dir: &'a ImageResourceDirectory,
    ) -> Result<()> {
        let declared = dir.total_entries();
        trace!(offset, entries = declared, depth, "Resource directory");

        let Some(first) = offset.checked_add(ImageResourceDirectory::SIZE) else {
            return self.record(ResourceAnomaly::TruncatedDirectory {
                offset,
                declared,
                parsed: 0,
            });
        };

        for i in 0..declared {
            let entry_offset = i
                .checked_mul(ImageResourceDirectoryEntry::SIZE)
                .and_then(|rel| first.checked_add(rel));
            let entry = entry_offset
                .and_then(|o| read_struct::<ImageResourceDirectoryEntry>(self.data, o).map(|e| (o, e)));

            let Some((entry_offset, entry)) = entry else {
                self.record(ResourceAnomaly::TruncatedDirectory {
                    offset,
                    declared,
                    parsed: i,
                })?;
                break;
            };

            match self.create_child(depth, RawNode::DirectoryEntry(entry), entry_offset, id)? {
                Some(child) => self.visit(child)?,
                None => break,
            }
        }
        Ok(())
    }

    fn visit_entry(
        &mut self,
        id: NodeId,
        depth: u8,
        offset: usize,
        entry: &'a ImageResourceDirectoryEntry,
    ) -> Result<()> {
        if entry.name_is_string() {
            let name_offset = self.resolve(entry.name_offset());
            match name_offset
                .and_then(|o| read_struct::<ImageResourceDirStringU>(self.data, o).map(|s| (o, s)))
            {
                Some((name_offset, name)) => {
                    if let Some(child) =
                        self.create_child(depth, RawNode::NameString(name), name_offset, id)?
                    {
                        self.visit(child)?;
                    }
                }
                None => self.record(ResourceAnomaly::UnreadableName {
                    entry_offset: offset,
                    name_offset: self.base.saturating_add(entry.name_offset() as usize),
                })?,
            }
        }

        let target = self.resolve(entry.offset_to_data());
        let reported = self.base.saturating_add(entry.offset_to_data() as usize);

        if entry.data_is_directory() {
            if let Some(target) = target {
                if self.options.detect_directory_loops && self.on_path(id, target) {
                    return self.record(ResourceAnomaly::DirectoryLoop {
                        entry_offset: offset,
                        target,
                    });
                }
            }
            match target.and_then(|o| read_struct::<ImageResourceDirectory>(self.data, o).map(|d| (o, d))) {
                Some((target, dir)) => {
                    if let Some(child) = self.create_child(depth, RawNode::Directory(dir), target, id)? {
                        self.visit(child)?;
                    }
                }
                None => self.record(ResourceAnomaly::UnreadableDirectory {
                    entry_offset: offset,
                    target: reported,
                })?,
            }
        } else {
            match target.and_then(|o| read_struct::<ImageResourceDataEntry>(self.data, o).map(|d| (o, d))) {
                Some((target, leaf)) => {
                    if let Some(child) =
                        self.create_child(depth, RawNode::DataDescriptor(leaf), target, id)?
                    {
                        self.visit(child)?;
                    }
                }
                None => self.record(ResourceAnomaly::UnreadableDataEntry {
                    entry_offset: offset,
                    target: reported,
                })?,
            }
        }
        Ok(())
    }

    /// Decode a name string and hang the result on its owning entry.
    ///
    /// The header itself was bounds-checked when the node was borrowed.
    fn visit_name(
        &mut self,
        owner: NodeId,
        offset: usize,
        name: &'a ImageResourceDirStringU,
    ) -> Result<()> {
        let length = name.length();
        if length as usize > self.options.max_name_length {
            return self.record(ResourceAnomaly::NameTooLong { offset, length });
        }

        let payload = offset
            .checked_add(ImageResourceDirStringU::SIZE)
            .and_then(|start| self.data.read_slice_at(start, name.payload_len()));
        let Some(payload) = payload else {
            return self.record(ResourceAnomaly::UnreadableNameData { offset, length });
        };

        let decoded = decode_wide_to_narrow(None, payload)?;
        trace!(offset, name = %decoded, "Resource name");
        self.tree.set_decoded_name(owner, decoded);
        Ok(())
    }

    /// Create a child one level below `parent_depth`, honouring the depth
    /// guard and the node budget. `None` means the branch stops here.
    fn create_child(
        &mut self,
        parent_depth: u8,
        raw: RawNode<'a>,
        offset: usize,
        parent: NodeId,
    ) -> Result<Option<NodeId>> {
        let depth = parent_depth as usize + 1;
        if depth > self.max_depth as usize {
            self.record(ResourceAnomaly::DepthExceeded { offset, depth })?;
            return Ok(None);
        }
        if self.tree.len() >= self.options.max_resource_nodes {
            if !self.budget_exhausted {
                self.budget_exhausted = true;
                self.record(ResourceAnomaly::NodeLimitReached {
                    limit: self.options.max_resource_nodes,
                })?;
            }
            return Ok(None);
        }

        self.tree
            .create_node(depth as u8, raw, offset, Some(parent))
            .map(Some)
    }

    /// File offset of a directory-relative offset
    fn resolve(&self, relative: u32) -> Option<usize> {
        self.base.checked_add(relative as usize)
    }

    /// Is a directory at `target` already an ancestor of `id`?
    fn on_path(&self, id: NodeId, target: usize) -> bool {
        let mut current = self.tree.node(id);
        while let Some(node) = current {
            if node.kind() == NodeKind::Directory && node.offset() == target {
                return true;
            }
            current = node.parent().and_then(|p| self.tree.node(p));
        }
        false
    }

    fn record(&mut self, anomaly: ResourceAnomaly) -> Result<()> {
        warn!(anomaly = %anomaly, "Malformed resource data skipped");
        self.tree.push_anomaly(anomaly)
    }
}
