use pe_resource_tree::formats::pe::directories::resources::types::{RT_GROUP_ICON, RT_ICON};
use pe_resource_tree::{
    lookup_type_descriptor, NodeKind, ParseOptions, PeParser, ResourceId, ResourceNode,
};

use crate::common::*;

#[test]
fn two_level_icon_tree() {
    let shape = dir(vec![(Key::Id(3), dir(vec![(Key::Id(1033), leaf(0x3000, 0x10))]))]);
    let data = PeImage::new(layout(&shape)).build();
    let parser = PeParser::new(&data).unwrap();
    let view = parser.resources().unwrap();

    let tree = view.tree().unwrap();
    let root = view.root().unwrap();
    assert_tree_invariants(tree);
    assert_eq!(tree.len(), 5);

    let nested = tree
        .find_by_type_and_level(root.id(), NodeKind::Directory, 1)
        .unwrap();
    assert_eq!(tree.parent(nested.id()).unwrap().resource_id(), Some(ResourceId::Id(3)));
    assert_eq!(nested.depth(), 2);

    let language = tree
        .find_by_type_and_level(root.id(), NodeKind::DirectoryEntry, 2)
        .unwrap();
    assert_eq!(language.resource_id(), Some(ResourceId::Id(1033)));

    let icon = lookup_type_descriptor(3).unwrap();
    assert_eq!(icon.file_extension, ".ico");
    assert_eq!(icon.type_code, RT_ICON);
}

#[test]
fn sample_tree_shape() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let view = parser.resources().unwrap();
    let tree = view.tree().unwrap();

    assert_tree_invariants(tree);
    assert_eq!(tree.len(), 22);
    assert!(view.anomalies().is_empty());
    assert_eq!(view.base_offset(), Some(RSRC_OFFSET));

    let root = view.root().unwrap();
    let types: Vec<Option<ResourceId>> = tree.children(root.id()).map(|n| n.resource_id()).collect();
    assert_eq!(
        types,
        vec![
            Some(ResourceId::Id(3)),
            Some(ResourceId::Id(5)),
            Some(ResourceId::Id(24))
        ]
    );
    assert_eq!(tree.find_last_child(root.id()).unwrap().resource_id(), Some(ResourceId::Id(24)));
}

#[test]
fn find_root_is_shared_by_every_node() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let tree = parser.resources().unwrap().tree().unwrap();
    let root = tree.root().unwrap();

    for node in tree.nodes() {
        assert_eq!(tree.find_root(node.id()).unwrap().id(), root.id());
    }
}

#[test]
fn search_everything_is_pre_order() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let tree = parser.resources().unwrap().tree().unwrap();
    let root = tree.root().unwrap();

    let all = tree.search(root.id(), |_| true);
    assert_eq!(all.count(), tree.len());

    // Parent always precedes its children, and a subtree is finished before
    // the next sibling starts.
    let position = |n: &ResourceNode<'_>| all.iter().position(|m| m.id() == n.id()).unwrap();
    for node in all.iter() {
        let here = position(node);
        let mut children = tree.children(node.id()).peekable();
        while let Some(child) = children.next() {
            assert!(position(child) > here);
            if let Some(next) = children.peek() {
                let subtree_end = tree
                    .search(child.id(), |_| true)
                    .iter()
                    .take_while(|m| m.id() != next.id())
                    .count();
                assert_eq!(position(*next), position(child) + subtree_end);
            }
        }
    }
}

#[test]
fn search_returns_nested_matches() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let tree = parser.resources().unwrap().tree().unwrap();
    let root = tree.root().unwrap();

    let dirs = tree.search(root.id(), |n| n.kind() == NodeKind::Directory);
    // root + 3 type directories + 3 name directories
    assert_eq!(dirs.count(), 7);
    let depths: Vec<u8> = dirs.iter().map(|n| n.depth()).collect();
    assert_eq!(depths, vec![0, 2, 4, 2, 4, 2, 4]);

    let none = tree.search(root.id(), |n| n.directory_level() > 3);
    assert!(none.is_empty());
}

#[test]
fn ancestor_lookup_by_level() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let tree = parser.resources().unwrap().tree().unwrap();
    let root = tree.root().unwrap();

    let leaves = tree.search(root.id(), |n| n.kind() == NodeKind::DataDescriptor);
    assert_eq!(leaves.count(), 4);

    let dialog = leaves.items()[2];
    let ty = tree
        .find_ancestor_by_type_and_level(dialog.id(), NodeKind::DirectoryEntry, 1)
        .unwrap();
    let name = tree
        .find_ancestor_by_type_and_level(dialog.id(), NodeKind::DirectoryEntry, 2)
        .unwrap();
    assert_eq!(ty.resource_id(), Some(ResourceId::Id(5)));
    assert_eq!(name.decoded_name(), Some("ABOUTBOX"));

    // Ancestors only: a leaf never finds itself or anything below
    assert!(tree
        .find_ancestor_by_type_and_level(dialog.id(), NodeKind::DataDescriptor, 3)
        .is_none());
}

#[test]
fn named_entry_has_name_child_and_decoded_name() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let tree = parser.resources().unwrap().tree().unwrap();
    let root = tree.root().unwrap();

    let named = tree.search(root.id(), |n| n.decoded_name().is_some());
    assert_eq!(named.count(), 1);
    let entry = named.first().unwrap();
    assert_eq!(entry.kind(), NodeKind::DirectoryEntry);
    assert!(entry.as_entry().unwrap().name_is_string());

    let kinds: Vec<NodeKind> = tree.children(entry.id()).map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::NameString, NodeKind::Directory]);

    let name_node = tree.children(entry.id()).next().unwrap();
    assert_eq!(name_node.as_name_string().unwrap().length(), 8);
    assert_eq!(name_node.directory_level(), entry.directory_level());
}

#[test]
fn entry_summaries() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let entries = parser.resources().unwrap().entries();

    assert_eq!(entries.len(), 4);
    let keys: Vec<_> = entries
        .iter()
        .map(|e| (e.type_id.clone(), e.name_id.clone(), e.language_id.clone()))
        .collect();
    assert_eq!(
        keys,
        vec![
            (Some(ResourceId::Id(3)), Some(ResourceId::Id(1)), Some(ResourceId::Id(1033))),
            (Some(ResourceId::Id(3)), Some(ResourceId::Id(1)), Some(ResourceId::Id(1031))),
            (
                Some(ResourceId::Id(5)),
                Some(ResourceId::Name("ABOUTBOX".into())),
                Some(ResourceId::Id(1033))
            ),
            (Some(ResourceId::Id(24)), Some(ResourceId::Id(1)), Some(ResourceId::Id(0))),
        ]
    );
    assert_eq!(entries[0].data_rva, 0x3000);
    assert_eq!(entries[2].size, 0x120);
    assert_eq!(entries[3].descriptor.unwrap().file_extension, ".xml");

    let json = serde_json::to_value(&entries).unwrap();
    assert_eq!(json[2]["name_id"], "ABOUTBOX");
    assert_eq!(json[1]["descriptor"]["symbolic_name"], "RT_ICON");
}

#[test]
fn unknown_type_has_no_descriptor() {
    let shape = typed(vec![
        (Key::Id(0x4242), vec![(Key::Id(1), vec![(1033, leaf(0x3000, 4))])]),
        (Key::Name("CUSTOM"), vec![(Key::Id(7), vec![(1033, leaf(0x3010, 4))])]),
        (Key::Id(RT_GROUP_ICON as u16), vec![(Key::Id(1), vec![(1033, leaf(0x3020, 4))])]),
    ]);
    let data = PeImage::new(layout(&shape)).build();
    let parser = PeParser::new(&data).unwrap();
    let entries = parser.resources().unwrap().entries();

    assert_eq!(entries.len(), 3);
    assert!(entries[0].descriptor.is_none());
    assert_eq!(entries[1].type_id, Some(ResourceId::Name("CUSTOM".into())));
    assert!(entries[1].descriptor.is_none());
    assert_eq!(entries[2].descriptor.unwrap().collection_label, "groupicons");
}

#[test]
fn pe32plus_image() {
    let data = PeImage::new(layout(&sample_resources())).pe32plus().build();
    let parser = PeParser::new(&data).unwrap();
    assert!(parser.is_64bit());
    assert_eq!(parser.image_base(), 0x1_4000_0000);
    assert_eq!(parser.resources().unwrap().len(), 22);
}

#[test]
fn non_ascii_names_decode() {
    let shape = typed(vec![(
        Key::Name("ICÔNE_ÄÖ"),
        vec![(Key::Name("日本語"), vec![(1041, leaf(0x3000, 8))])],
    )]);
    let data = PeImage::new(layout(&shape)).build();
    let parser = PeParser::with_options(&data, ParseOptions::default()).unwrap();
    let entries = parser.resources().unwrap().entries();
    assert_eq!(entries[0].type_id, Some(ResourceId::Name("ICÔNE_ÄÖ".into())));
    assert_eq!(entries[0].name_id, Some(ResourceId::Name("日本語".into())));
}
