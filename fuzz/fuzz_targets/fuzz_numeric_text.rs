#![no_main]

use billbook::core::numeric::parse_numeric_str;
use billbook::core::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let value = parse_numeric_str(s).or(rust_decimal::Decimal::ZERO);
        let _ = format_inr(value);
        let _ = format_percent(value);
        let _ = amount_in_words(value);
    }
});
