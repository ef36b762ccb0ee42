#![no_main]
use libfuzzer_sys::fuzz_target;
use pe_resource_tree::{NodeKind, PeParser};

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = PeParser::new(data) else {
        return;
    };
    let Ok(view) = parser.resources() else {
        return;
    };
    let _ = view.entries();
    if let (Some(tree), Some(root)) = (view.tree(), view.root()) {
        for node in tree.iter() {
            assert_eq!(tree.find_root(node.id()).map(|r| r.id()), Some(root.id()));
        }
        let _ = tree.find_by_type_and_level(root.id(), NodeKind::DataDescriptor, 3);
    }
});
