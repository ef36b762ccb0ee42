//! Common test utilities and helpers.
//!
//! Everything here is synthetic: resource sections are laid out from a
//! tree description and wrapped in a minimal PE image.

#![allow(dead_code)]

pub mod pe;

use std::io::Write;

use pe_resource_tree::{NodeKind, ResourceTree};
use tempfile::NamedTempFile;

pub use pe::{PeImage, RSRC_OFFSET, RSRC_RVA};
pub use rsrc::{dir, layout, leaf, typed, Key, Shape};

/// Creates a temporary file with the given content.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file
}

/// Icons, a named dialog and a manifest, two languages for the icon
pub fn sample_resources() -> Shape {
    typed(vec![
        (
            Key::Id(3),
            vec![(
                Key::Id(1),
                vec![(1033, leaf(0x3000, 0x2E8)), (1031, leaf(0x3300, 0x2E8))],
            )],
        ),
        (
            Key::Id(5),
            vec![(Key::Name("ABOUTBOX"), vec![(1033, leaf(0x3600, 0x120))])],
        ),
        (Key::Id(24), vec![(Key::Id(1), vec![(0, leaf(0x3800, 0x17D))])]),
    ])
}

/// Sample resources wrapped in a PE32 image
pub fn sample_image() -> Vec<u8> {
    PeImage::new(layout(&sample_resources())).build()
}

/// Depth and level rules that must hold for every node of every tree.
pub fn assert_tree_invariants(tree: &ResourceTree<'_>) {
    let root = tree.root().expect("tree has a root");
    assert_eq!(root.depth(), 0);
    assert_eq!(root.directory_level(), 0);
    assert_eq!(root.kind(), NodeKind::Directory);

    let mut seen = 0;
    for node in tree.iter() {
        seen += 1;
        match tree.parent(node.id()) {
            None => assert_eq!(node.id(), root.id()),
            Some(parent) => {
                assert_eq!(node.depth(), parent.depth() + 1);
                let expected = if parent.kind() == NodeKind::Directory {
                    parent.directory_level() + 1
                } else {
                    parent.directory_level()
                };
                assert_eq!(node.directory_level(), expected);
            }
        }
    }
    assert_eq!(seen, tree.len(), "pre-order walk misses or repeats nodes");
}
