#![no_main]
use astrahl_model::{Wire, WireOrder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(output) = std::str::from_utf8(data) {
        let order = WireOrder::from_wires(["a", "b", "c"].map(Wire::new));
        // Must never panic; any accepted allocation covers every wire.
        if let Ok(allocation) = astrahl_solver::response::parse_allocation(output, &order, 30.0) {
            assert_eq!(allocation.len(), order.len());
        }
    }
});
