#![no_main]

use billbook::core::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any JSON object is a row; normalization must never panic.
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(raw) = RawRow::try_from(value) {
            let book = normalize_book(&raw);
            let _ = normalize_book(&RawRow::from_record(&book));
            let _ = normalize_customer(&raw);
            let _ = normalize_batch_line(&raw);
        }
    }
});
