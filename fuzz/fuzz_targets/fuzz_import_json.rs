#![no_main]

use dashkit_core::{build_tree, check_invariants, export_to_json, flatten, import_from_json};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16 * 1024 {
        return;
    }

    // Malformed input must be an error, never a panic.
    let Ok(Some(root)) = import_from_json(text) else {
        return;
    };

    // Anything accepted must re-export and re-import to the same tree.
    let json = export_to_json(Some(&root)).expect("accepted tree re-exports");
    let again = import_from_json(&json).expect("own export imports");
    assert_eq!(again.as_ref(), Some(&root), "snapshot round trip changed the tree");

    // With unique ids, flatten/build is lossless.
    if check_invariants(&root).is_clean() {
        assert_eq!(build_tree(flatten(&root)), root, "flatten/build round trip");
    }
});
