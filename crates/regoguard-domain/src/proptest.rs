//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - package rewriting and re-application
//! - aggregation of independent `data` violations
//! - arity inference for array head keys

use crate::conformance::ensure_conformance;
use crate::error::{ConformanceError, SignatureError};
use crate::policy::{DuplicateArity, RequiredRules, SandboxPolicy};
use crate::signature::require_rules;
use proptest::prelude::*;
use regoguard_rego::{is_keyword, parse_module};

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

fn arb_ident() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,8}")
        .expect("valid regex")
        .prop_filter("keywords are not identifiers", |s| !is_keyword(s))
}

/// Dotted package paths; later segments may need bracket syntax when printed.
fn arb_package_path() -> impl Strategy<Value = String> {
    (
        arb_ident(),
        prop::collection::vec(
            prop_oneof![
                arb_ident(),
                prop::string::string_regex("[a-z]{1,4}-[a-z]{1,4}").expect("valid regex"),
            ],
            0..4,
        ),
    )
        .prop_map(|(first, rest)| {
            std::iter::once(first)
                .chain(rest)
                .collect::<Vec<_>>()
                .join(".")
        })
}

/// A body expression whose only `data` access is to `data.inventory`.
fn arb_allowed_expr() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_ident().prop_map(|f| format!("x := input.review.object.{f}")),
        arb_ident().prop_map(|f| format!("x := data.inventory.{f}[_]")),
        (arb_ident(), 0u32..10).prop_map(|(f, n)| format!("count(input.{f}) > {n}")),
        arb_ident().prop_map(|f| format!("xs := [v | v := data.inventory.cluster[\"{f}\"][_]]")),
    ]
}

/// Field names outside the default allow-set.
fn arb_forbidden_field() -> impl Strategy<Value = String> {
    arb_ident().prop_filter("must not be allowed", |s| s != "inventory")
}

proptest! {
    #[test]
    fn conforming_modules_move_to_the_desired_package(
        original in prop::collection::vec(arb_ident(), 1..4).prop_map(|s| s.join(".")),
        desired in arb_package_path(),
        exprs in prop::collection::vec(arb_allowed_expr(), 1..5),
    ) {
        let body: String = exprs.iter().map(|e| format!("  {e}\n")).collect();
        let src = format!("package {original}\nviolation[{{\"msg\": x}}] {{\n{body}}}\n");
        let sandbox = SandboxPolicy::inventory_only();

        let once = ensure_conformance("Gen", &desired, &src, &sandbox).expect("conforms");
        let module = parse_module("out.rego", &once).expect("output parses");
        let segments: Vec<String> = module.package.segments().into_iter().map(String::from).collect();
        let expected: Vec<String> = desired.split('.').map(String::from).collect();
        prop_assert_eq!(segments, expected);
        prop_assert!(module.imports.is_empty());

        let twice = ensure_conformance("Gen", &desired, &once, &sandbox).expect("conforms again");
        prop_assert_eq!(&twice, &once);

        let required = RequiredRules::from([("violation".to_string(), 1)]);
        prop_assert_eq!(require_rules("Gen", &once, &required, DuplicateArity::KeepLast), Ok(()));
    }

    #[test]
    fn every_independent_violation_is_reported(
        fields in prop::collection::vec(arb_forbidden_field(), 1..6),
    ) {
        let body: String = fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("  v{i} := data.{f}\n"))
            .collect();
        let src = format!("package t\np {{\n{body}}}\n");
        let err = ensure_conformance("Gen", "t", &src, &SandboxPolicy::inventory_only())
            .expect_err("must fail");
        let ConformanceError::DataAccess(violations) = err else {
            return Err(TestCaseError::fail("expected data access violations"));
        };
        prop_assert_eq!(violations.len(), fields.len());
    }

    #[test]
    fn any_import_is_rejected(path in arb_ident(), alias in prop::option::of(arb_ident())) {
        let alias = alias.map(|a| format!(" as {a}")).unwrap_or_default();
        let src = format!("package t\nimport data.{path}{alias}\np {{ true }}\n");
        let result = ensure_conformance("Gen", "t", &src, &SandboxPolicy::inventory_only());
        prop_assert!(
            matches!(result, Err(ConformanceError::ImportsUsed { .. })),
            "expected ImportsUsed, got {:?}",
            result
        );
    }

    #[test]
    fn array_keys_of_variables_have_their_length_as_arity(n in 1usize..6) {
        let vars: Vec<String> = (0..n).map(|i| format!("a{i}")).collect();
        let binds: String = vars.iter().map(|v| format!("  {v} := 1\n")).collect();
        let src = format!("package t\nviolation[[{}]] {{\n{binds}}}\n", vars.join(", "));

        let want_n = RequiredRules::from([("violation".to_string(), n)]);
        prop_assert_eq!(require_rules("Gen", &src, &want_n, DuplicateArity::KeepLast), Ok(()));

        let want_other = RequiredRules::from([("violation".to_string(), n + 1)]);
        let err = require_rules("Gen", &src, &want_other, DuplicateArity::KeepLast)
            .expect_err("arity differs");
        prop_assert!(matches!(err, SignatureError::Rules(_)));
    }
}
