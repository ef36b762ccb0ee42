#![no_main]
use libfuzzer_sys::fuzz_target;
use pe_resource_tree::formats::pe::directories::resources::build_resource_tree;
use pe_resource_tree::ParseOptions;

// Raw resource section bytes, no PE wrapper
fuzz_target!(|data: &[u8]| {
    let options = ParseOptions {
        detect_directory_loops: false,
        max_resource_nodes: 4096,
        ..ParseOptions::default()
    };
    if let Ok(tree) = build_resource_tree(data, 0, &options) {
        assert!(tree.len() <= 4096);
        assert!(tree.iter().all(|n| n.depth() <= 32));
    }
});
