#![no_main]

use billbook::core::*;
use billbook::render::render_invoice_json;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Stored items of any shape: errors are fine, panics are bugs.
    if let Ok(items) = serde_json::from_slice::<serde_json::Value>(data) {
        let lines: Vec<LineItem> = serde_json::from_value(items.clone()).unwrap_or_default();
        let totals = aggregate(&lines).to_value();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let _ = render_invoice_json(
            &Customer::default(),
            &items,
            &totals,
            &Brand::house(),
            ColumnPrefs::default(),
            date,
        );
    }
});
