//! Printing is a fixed point: parse(print(m)) prints to the same text.

use proptest::prelude::*;
use regoguard_rego::{MAX_NESTING, Term, parse_module};

const TEMPLATE: &str = r#"package k8srequiredlabels

# Every object must carry the configured labels.
violation[{"msg": msg, "details": {"missing_labels": missing}}] {
    provided := {label | input.review.object.metadata.labels[label]}
    required := {label | label := input.parameters.labels[_].key}
    missing := required - provided
    count(missing) > 0
    msg := sprintf("you must provide labels: %v", [missing])
}

violation[{"msg": msg}] {
    value := input.review.object.metadata.labels[key]
    expected := input.parameters.labels[_]
    expected.key == key
    expected.allowedRegex != ""
    not re_match(expected.allowedRegex, value)
    msg := sprintf("Label <%v: %v> does not satisfy allowed regex: %v", [key, value, expected.allowedRegex])
}

identical(obj, review) {
    obj.metadata.namespace == review.object.metadata.namespace
    obj.metadata.name == review.object.metadata.name
} else = false { true }

namespaces[ns] = count(pods) {
    some ns
    pods := [p | p := data.inventory.namespace[ns]["v1"]["Pod"][_]]
}
"#;

fn reprint(src: &str) -> String {
    parse_module("round_trip.rego", src)
        .unwrap_or_else(|e| panic!("parse failed: {e}\n{src}"))
        .to_string()
}

#[test]
fn printed_template_is_a_fixed_point() {
    let once = reprint(TEMPLATE);
    let twice = reprint(&once);
    assert_eq!(once, twice);
    assert!(!once.contains('#'), "comments are dropped");
    assert!(once.starts_with("package k8srequiredlabels\n\nviolation["));
}

#[test]
fn reparsed_module_equals_original() {
    let original = parse_module("a.rego", TEMPLATE).expect("parse");
    let reparsed = parse_module("b.rego", &original.to_string()).expect("reparse");
    assert_eq!(original, reparsed);
}

#[test]
fn escaped_strings_survive_printing() {
    let src = "package t\np { x := \"tab\\there \\\"quoted\\\" \\u00e9 \\ud83d\\ude00\" }\n";
    let module = parse_module("t.rego", src).expect("parse");
    let reparsed = parse_module("t.rego", &module.to_string()).expect("reparse");
    assert_eq!(module, reparsed);
}

fn field() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,6}".prop_filter("keywords need brackets", |s| {
            !regoguard_rego::is_keyword(s)
        }),
        "[a-z]{1,3}-[a-z]{1,3}",
        Just("with".to_string()),
    ]
}

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        "[ -~]{0,8}".prop_map(|s| serde_json::to_string(&s).unwrap_or_default()),
        Just("null".to_string()),
        Just("true".to_string()),
    ]
}

#[derive(Clone, Copy, Debug)]
enum Wrapper {
    Array,
    Set,
    Object,
    Parens,
    ArrayCompr,
    SetCompr,
    ObjectCompr,
}

fn wrap(inner: String, wrapper: Wrapper, level: usize) -> String {
    match wrapper {
        Wrapper::Array => format!("[{inner}, {level}]"),
        Wrapper::Set => format!("{{{inner}}}"),
        Wrapper::Object => format!("{{\"k{level}\": {inner}}}"),
        Wrapper::Parens => format!("({inner})"),
        Wrapper::ArrayCompr => format!("[v{level} | v{level} := {inner}]"),
        Wrapper::SetCompr => format!("{{v{level} | v{level} := {inner}}}"),
        Wrapper::ObjectCompr => format!("{{k{level}: v{level} | k{level} := 1; v{level} := {inner}}}"),
    }
}

fn wrapper() -> impl Strategy<Value = Wrapper> {
    prop_oneof![
        Just(Wrapper::Array),
        Just(Wrapper::Set),
        Just(Wrapper::Object),
        Just(Wrapper::Parens),
        Just(Wrapper::ArrayCompr),
        Just(Wrapper::SetCompr),
        Just(Wrapper::ObjectCompr),
    ]
}

fn nested(wrappers: &[Wrapper]) -> String {
    wrappers
        .iter()
        .enumerate()
        .fold("input.x".to_string(), |inner, (level, w)| wrap(inner, *w, level))
}

#[test]
fn nesting_just_past_the_limit_is_rejected_not_fatal() {
    let src = format!(
        "package gen\np {{\n x := {}\n}}\n",
        nested(&vec![Wrapper::Set; MAX_NESTING])
    );
    let err = parse_module("gen.rego", &src).expect_err("too deep");
    assert!(err.message.contains("nesting too deep"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn nested_collections_up_to_the_limit_round_trip(
        wrappers in prop::collection::vec(wrapper(), 0..MAX_NESTING),
    ) {
        let src = format!("package gen\np {{\n x := {}\n}}\n", nested(&wrappers));
        let module = parse_module("gen.rego", &src)
            .map_err(|e| TestCaseError::fail(format!("parse failed: {e}")))?;
        let printed = module.to_string();
        let reparsed = parse_module("gen.rego", &printed)
            .map_err(|e| TestCaseError::fail(format!("reparse failed: {e}")))?;
        prop_assert_eq!(&reparsed, &module);
        prop_assert_eq!(reparsed.to_string(), printed);
    }
}

proptest! {
    #[test]
    fn generated_refs_and_literals_round_trip(
        fields in prop::collection::vec(field(), 1..4),
        value in literal(),
        index in 0u8..4,
    ) {
        let path: String = fields
            .iter()
            .map(|f| {
                if regoguard_rego::is_identifier(f) && !regoguard_rego::is_keyword(f) {
                    format!(".{f}")
                } else {
                    format!("[{}]", serde_json::to_string(f).unwrap_or_default())
                }
            })
            .collect();
        let src = format!(
            "package gen\np[x] {{\n x := input{path}[{index}]\n x != {value}\n}}\n"
        );
        let once = reprint(&src);
        prop_assert_eq!(&reprint(&once), &once);

        let module = parse_module("gen.rego", &once).expect("reparse");
        let body = module.rules[0].body.as_ref().expect("body");
        prop_assert_eq!(body.len(), 2);
        prop_assert_eq!(module.rules[0].head.key.clone(), Some(Term::var("x")));
    }
}
