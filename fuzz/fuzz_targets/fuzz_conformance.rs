//! Fuzz target for the sandbox checks.
//!
//! Goal: `ensure_conformance` and `require_rules` **never panic**, whatever the package path
//! or source. Accepted output must itself conform.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_conformance
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use regoguard_domain::policy::{DuplicateArity, RequiredRules, SandboxPolicy};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    package: &'a str,
    source: &'a str,
    strict: bool,
}

fuzz_target!(|input: Input<'_>| {
    let sandbox = SandboxPolicy::inventory_only();
    if let Ok(canonical) =
        regoguard_domain::ensure_conformance("Fuzz", input.package, input.source, &sandbox)
    {
        let again =
            regoguard_domain::ensure_conformance("Fuzz", input.package, &canonical, &sandbox);
        assert_eq!(again.as_deref(), Ok(canonical.as_str()));
    }

    let duplicates = if input.strict {
        DuplicateArity::RejectConflicting
    } else {
        DuplicateArity::KeepLast
    };
    let required = RequiredRules::from([("violation".to_string(), 1)]);
    let _ = regoguard_domain::require_rules("Fuzz", input.source, &required, duplicates);
});
