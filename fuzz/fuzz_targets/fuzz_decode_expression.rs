#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(expression) = astrahl_model::Expression::from_json(&value) {
            let _ = expression.eval(1.0);
        }
    }
});
