//! Explain registry for checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after policy examples.
    pub examples: ExamplePair,
}

/// Before and after policy examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Source that would trigger a finding.
    pub before: &'static str,
    /// Source that passes the check.
    pub after: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Check IDs
        ids::CHECK_REGO_SYNTAX => Some(explain_syntax()),
        ids::CHECK_REGO_IMPORTS | ids::CODE_IMPORT_USED => Some(explain_imports()),
        ids::CHECK_REGO_DATA_ACCESS => Some(explain_data_access()),
        ids::CHECK_REGO_PACKAGE | ids::CODE_INVALID_PACKAGE_PATH => Some(explain_package()),
        ids::CHECK_REGO_RULES => Some(explain_rules()),
        ids::CHECK_TOOL_RUNTIME | ids::CODE_RUNTIME_ERROR => Some(explain_runtime()),

        // Codes
        ids::CODE_EMPTY_SOURCE => Some(explain_empty_source()),
        ids::CODE_PARSE_ERROR => Some(explain_parse_error()),
        ids::CODE_MISSING_FIELD => Some(explain_missing_field()),
        ids::CODE_COMPUTED_FIELD => Some(explain_computed_field()),
        ids::CODE_INVALID_FIELD => Some(explain_invalid_field()),
        ids::CODE_MISSING_RULE => Some(explain_missing_rule()),
        ids::CODE_ARITY_MISMATCH => Some(explain_arity_mismatch()),
        ids::CODE_INVALID_SIGNATURE => Some(explain_invalid_signature()),
        ids::CODE_CONFLICTING_ARITY => Some(explain_conflicting_arity()),

        _ => None,
    }
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_REGO_SYNTAX,
        ids::CHECK_REGO_IMPORTS,
        ids::CHECK_REGO_DATA_ACCESS,
        ids::CHECK_REGO_PACKAGE,
        ids::CHECK_REGO_RULES,
        ids::CHECK_TOOL_RUNTIME,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_EMPTY_SOURCE,
        ids::CODE_PARSE_ERROR,
        ids::CODE_IMPORT_USED,
        ids::CODE_MISSING_FIELD,
        ids::CODE_COMPUTED_FIELD,
        ids::CODE_INVALID_FIELD,
        ids::CODE_INVALID_PACKAGE_PATH,
        ids::CODE_MISSING_RULE,
        ids::CODE_ARITY_MISMATCH,
        ids::CODE_INVALID_SIGNATURE,
        ids::CODE_CONFLICTING_ARITY,
        ids::CODE_RUNTIME_ERROR,
    ]
}

// --- Check-level explanations ---

fn explain_syntax() -> Explanation {
    Explanation {
        title: "Policy Must Parse",
        description: "\
The submitted source must be a non-empty Rego module that parses.

Only the import-free Rego v0 surface is accepted: rules, comprehensions, refs,
calls, `some`, `not`, `with` and `else`. Newer keywords such as `if`, `contains`,
`in` and `every` require `import future.keywords` or `import rego.v1`, and imports
are not allowed.",
        remediation: "\
Fix the reported position. Run the source through `regoguard conform` locally to
see the canonical form the admission pipeline will store.",
        examples: ExamplePair {
            before: r#"package k8srequiredlabels

violation[{"msg": msg}] if {
    msg := "missing labels"
}"#,
            after: r#"package k8srequiredlabels

violation[{"msg": msg}] {
    msg := "missing labels"
}"#,
        },
    }
}

fn explain_imports() -> Explanation {
    Explanation {
        title: "No Imports",
        description: "\
Policies may not use the `import` keyword.

Imports would let a template pull in rules or data from anywhere in the document
tree, bypassing the sandbox that restricts cross-module lookups to allowed fields
of `data`.",
        remediation: "\
Inline the helper logic into the template and refer to input and allowed data
fields by their full paths.",
        examples: ExamplePair {
            before: r#"package k8sallowedrepos

import data.lib.helpers

violation[{"msg": msg}] {
    not helpers.allowed(input.review.object)
    msg := "repo not allowed"
}"#,
            after: r#"package k8sallowedrepos

allowed(obj) {
    startswith(obj.spec.image, input.parameters.repos[_])
}

violation[{"msg": msg}] {
    not allowed(input.review.object)
    msg := "repo not allowed"
}"#,
        },
    }
}

fn explain_data_access() -> Explanation {
    Explanation {
        title: "Sandboxed Data Access",
        description: "\
Every reference to `data` must name one of the allowed fields with a literal key.

`data` is the root of every module and of any synced cluster state. Reading `data`
as a whole, indexing it with a variable, or naming a field outside the allow-set
would let one template observe another template's rules or unsynced state.",
        remediation: "\
Access the allowed field directly, e.g. `data.inventory`. Index below that field
freely; only the first step after `data` is restricted.",
        examples: ExamplePair {
            before: r#"violation[{"msg": msg}] {
    some field
    x := data[field]
    other := data.templates
    msg := "leaky"
}"#,
            after: r#"violation[{"msg": msg}] {
    ns := data.inventory.cluster["v1"]["Namespace"][_]
    msg := sprintf("namespace %v", [ns.metadata.name])
}"#,
        },
    }
}

fn explain_package() -> Explanation {
    Explanation {
        title: "Canonical Package Path",
        description: "\
Accepted modules are moved to a canonical package chosen by the pipeline.

The desired path is split on `.`; every segment must be non-empty and the first
must be a Rego identifier so the rewritten `package` line parses again.",
        remediation: "\
Pass a dotted path such as `templates.k8srequiredlabels` to `--package`. The
module's own package declaration is replaced and does not need to match.",
        examples: ExamplePair {
            before: "--package '.templates..labels'",
            after: "--package 'templates.k8srequiredlabels'",
        },
    }
}

fn explain_rules() -> Explanation {
    Explanation {
        title: "Required Rules",
        description: "\
Templates must declare the entry-point rules the pipeline queries, with the
expected arity.

A rule's arity is read from its head key: `violation[r]` has arity 1,
`violation[[a, b]]` has arity 2, and rules without a key have arity 0.",
        remediation: "\
Declare each required rule with a single variable or object literal as its key,
or an array of variables and object literals when more slots are required.",
        examples: ExamplePair {
            before: r#"deny[msg] {
    msg := "wrong entry point"
}"#,
            after: r#"violation[{"msg": msg}] {
    msg := "right entry point"
}"#,
        },
    }
}

fn explain_runtime() -> Explanation {
    Explanation {
        title: "Tool Runtime Error",
        description: "\
regoguard could not complete the run: a source file could not be read, the
configuration was invalid, or the report could not be written.",
        remediation: "\
Read the message for the failing path or setting, fix it, and run again. Use
`-vv` to see each pipeline stage.",
        examples: ExamplePair {
            before: "regoguard --rule violation=x check --kind K --package p policies/",
            after: "regoguard --rule violation=1 check --kind K --package p policies/",
        },
    }
}

// --- Code-level explanations ---

fn explain_empty_source() -> Explanation {
    let mut exp = explain_syntax();
    exp.title = "Rego source code is empty";
    exp
}

fn explain_parse_error() -> Explanation {
    let mut exp = explain_syntax();
    exp.title = "Parse error";
    exp
}

fn explain_missing_field() -> Explanation {
    let mut exp = explain_data_access();
    exp.title = "`data` accessed without a field";
    exp.examples = ExamplePair {
        before: "everything := data",
        after: "inventory := data.inventory",
    };
    exp
}

fn explain_computed_field() -> Explanation {
    let mut exp = explain_data_access();
    exp.title = "`data` field is not a literal";
    exp.examples = ExamplePair {
        before: "x := data[field]",
        after: "x := data.inventory[field]",
    };
    exp
}

fn explain_invalid_field() -> Explanation {
    let mut exp = explain_data_access();
    exp.title = "`data` field is not allowed";
    exp.examples = ExamplePair {
        before: "x := data.templates",
        after: "x := data.inventory",
    };
    exp
}

fn explain_missing_rule() -> Explanation {
    let mut exp = explain_rules();
    exp.title = "Missing required rule";
    exp
}

fn explain_arity_mismatch() -> Explanation {
    let mut exp = explain_rules();
    exp.title = "Required rule has the wrong arity";
    exp.examples = ExamplePair {
        before: "violation[[a, b]] { a := 1; b := 2 }",
        after: "violation[r] { r := {\"msg\": \"x\"} }",
    };
    exp
}

fn explain_invalid_signature() -> Explanation {
    let mut exp = explain_rules();
    exp.title = "Invalid rule signature";
    exp.examples = ExamplePair {
        before: "violation[[a, \"literal\"]] { a := 1 }",
        after: "violation[[a, b]] { a := 1; b := \"literal\" }",
    };
    exp
}

fn explain_conflicting_arity() -> Explanation {
    let mut exp = explain_rules();
    exp.title = "Rule declared with conflicting arities";
    exp.description = "\
Under the `strict` profile every definition of a rule name must agree on its
arity. Incremental definitions with different head shapes are rejected.";
    exp
}
