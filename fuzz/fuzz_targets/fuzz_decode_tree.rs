#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(tree) = astrahl_model::FaultTree::from_json(&value) {
            // Decoded trees re-encode to something that decodes to the same tree.
            let again = astrahl_model::FaultTree::from_json(&tree.to_json(None)).unwrap();
            assert_eq!(tree, again);
        }
    }
});
