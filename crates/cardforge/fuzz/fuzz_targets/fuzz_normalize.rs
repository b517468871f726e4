//! Fuzz target for schema normalization.
//!
//! Any JSON object must normalize to a v3 document without panicking.

#![no_main]

use cardforge::normalize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    match normalize(&value) {
        Ok(document) => assert_eq!(document.spec, "chara_card_v3"),
        Err(_) => assert!(!value.is_object()),
    }
});
