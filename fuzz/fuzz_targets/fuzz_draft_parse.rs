#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Arbitrary JSON through draft parsing and the schema checks
        // must not panic — error lists are fine, panics are bugs.
        if let Ok(draft) = serde_json::from_str::<baumrechnung::validation::schema::InvoiceDraft>(s)
        {
            if let Ok(invoice) = draft.parse() {
                let _ = baumrechnung::validation::schema::check_invoice(&invoice);
            }
        }
    }
});
