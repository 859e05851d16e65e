#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic on any input string.
        let _ = baumrechnung::core::parse_german_date(s);
        let _ = baumrechnung::core::is_german_date_format(s);
    }
});
