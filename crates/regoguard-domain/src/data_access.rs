//! Walks every reference in a module and collects illegal accesses to `data`.
//!
//! All violations are reported, not just the first. A violating reference is not
//! searched further; everything around it still is.

use crate::error::DataAccessViolation;
use crate::policy::SandboxPolicy;
use regoguard_rego::{Module, Node, Pos, ROOT_DOCUMENT, Ref, Term, Visit, walk_module};

pub fn find_data_violations(module: &Module, sandbox: &SandboxPolicy) -> Vec<DataAccessViolation> {
    let mut found = Vec::new();
    // Position of the innermost rule or expression seen so far; a bare `data` has none of its own.
    let mut enclosing: Option<Pos> = None;
    walk_module(module, &mut |node| match node {
        Node::Rule(rule) => {
            enclosing = Some(rule.pos);
            Visit::Continue
        }
        Node::Expr(expr) => {
            enclosing = Some(expr.pos);
            Visit::Continue
        }
        Node::Ref(r) if r.has_var_head(ROOT_DOCUMENT) => match check_root_ref(r, sandbox) {
            Some(violation) => {
                found.push(violation);
                Visit::SkipChildren
            }
            None => Visit::Continue,
        },
        // A bare `data` is a reference with no field at all.
        Node::Term(Term::Var(v)) if v == ROOT_DOCUMENT => {
            found.push(DataAccessViolation::MissingField {
                reference: ROOT_DOCUMENT.to_string(),
                pos: enclosing,
            });
            Visit::Continue
        }
        _ => Visit::Continue,
    });
    tracing::debug!(violations = found.len(), "data access walk finished");
    found
}

fn check_root_ref(r: &Ref, sandbox: &SandboxPolicy) -> Option<DataAccessViolation> {
    let reference = r.to_string();
    let pos = r.pos;
    let Some(field) = r.terms.get(1) else {
        return Some(DataAccessViolation::MissingField { reference, pos });
    };
    if !field.is_ground() {
        return Some(DataAccessViolation::ComputedField { reference, pos });
    }
    match field {
        Term::String(name) if sandbox.allows(name) => None,
        other => Some(DataAccessViolation::InvalidField {
            field: other.to_string(),
            allowed: sandbox.describe(),
            reference,
            pos,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regoguard_rego::parse_module;

    fn violations(body: &str) -> Vec<DataAccessViolation> {
        let module =
            parse_module("t.rego", &format!("package t\np {{\n{body}\n}}\n")).expect("parse");
        let mut module = module;
        module.package.path = Ref::new(Vec::new());
        find_data_violations(&module, &SandboxPolicy::inventory_only())
    }

    #[test]
    fn allowed_field_passes_and_may_be_indexed_freely() {
        assert!(violations("x := data.inventory.namespace[ns][\"v1\"][kind]").is_empty());
        assert!(violations("x := data[\"inventory\"]").is_empty());
    }

    #[test]
    fn bare_data_is_missing_field() {
        let found = violations("x := data");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0],
            DataAccessViolation::MissingField { reference, .. } if reference == "data"
        ));
    }

    #[test]
    fn bare_data_takes_the_line_of_its_expression() {
        let found = violations("y := 1

  x := count(data)");
        assert_eq!(found[0].pos().map(|p| p.line), Some(5));

        let module =
            parse_module("t.rego", "package t

f(x) = data {
  true
}
").expect("parse");
        let mut module = module;
        module.package.path = Ref::new(Vec::new());
        let found = find_data_violations(&module, &SandboxPolicy::inventory_only());
        assert_eq!(found[0].pos().map(|p| p.line), Some(3));
    }

    #[test]
    fn variable_field_is_computed() {
        let found = violations("some k\nx := data[k]");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0],
            DataAccessViolation::ComputedField { reference, .. } if reference == "data[k]"
        ));
        assert_eq!(found[0].pos().map(|p| p.line), Some(4));
    }

    #[test]
    fn computed_field_expressions_count_as_computed() {
        assert!(matches!(
            violations("x := data[concat(\"\", [\"inv\", \"entory\"])]")[0],
            DataAccessViolation::ComputedField { .. }
        ));
        assert!(matches!(
            violations("x := data[input.field]")[0],
            DataAccessViolation::ComputedField { .. }
        ));
    }

    #[test]
    fn unknown_and_non_string_fields_are_invalid() {
        let found = violations("x := data.templates\ny := data[1]");
        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0].to_string(),
            "Invalid `data` field: \"templates\". Valid fields are: inventory"
        );
        assert_eq!(
            found[1].to_string(),
            "Invalid `data` field: 1. Valid fields are: inventory"
        );
    }

    #[test]
    fn independent_violations_are_all_reported_in_order() {
        let found = violations("x := data.a\ny := data.b");
        let refs: Vec<&str> = found.iter().map(|v| v.reference()).collect();
        assert_eq!(refs, vec!["data.a", "data.b"]);
    }

    #[test]
    fn violating_ref_is_not_searched_further() {
        let found = violations("x := data.bad[data.worse]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference(), "data.bad[data.worse]");
    }

    #[test]
    fn refs_nested_in_allowed_refs_are_still_checked() {
        let found = violations("x := data.inventory[data.secret]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference(), "data.secret");
    }

    #[test]
    fn reaches_heads_calls_with_and_comprehensions() {
        let module = parse_module(
            "t.rego",
            r#"package t
f(x) = data.a { true }
violation[{"msg": data.b}] {
    y := [z | z := data.c[_]]
    count(data.d) > 0
    data.e.fn(1)
    input.x with data.f as 1
    g(data)
}
"#,
        )
        .expect("parse");
        let mut module = module;
        module.package.path = Ref::new(Vec::new());
        let found = find_data_violations(&module, &SandboxPolicy::inventory_only());
        let refs: Vec<&str> = found.iter().map(|v| v.reference()).collect();
        assert_eq!(
            refs,
            vec!["data.a", "data.b", "data.c[_]", "data.d", "data.e.fn", "data.f", "data"]
        );
    }

    #[test]
    fn allow_set_is_configurable() {
        let module = parse_module("t.rego", "package t\np { data.external.x }\n").expect("parse");
        let mut module = module;
        module.package.path = Ref::new(Vec::new());
        assert!(find_data_violations(&module, &SandboxPolicy::new(["external"])).is_empty());
        let found = find_data_violations(&module, &SandboxPolicy::new(["a", "b"]));
        assert_eq!(
            found[0].to_string(),
            "Invalid `data` field: \"external\". Valid fields are: a, b"
        );
    }
}
