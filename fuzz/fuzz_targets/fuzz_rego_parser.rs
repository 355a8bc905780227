//! Fuzz target for the Rego parser and printer.
//!
//! Goal: parsing **never panics**, and anything that parses prints to a fixed point.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rego_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(module) = regoguard_rego::parse_module("fuzz.rego", text) else {
        return;
    };
    let printed = module.to_string();
    let reparsed = regoguard_rego::parse_module("fuzz.rego", &printed)
        .unwrap_or_else(|e| panic!("printed module does not parse: {e}\n{printed}"));
    assert_eq!(reparsed.to_string(), printed);
});
