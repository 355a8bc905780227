//! Rule arity from the shape of the head key.
//!
//! | head key                                   | arity          |
//! |--------------------------------------------|----------------|
//! | none (complete rules, functions, defaults) | 0              |
//! | variable or object literal                 | 1              |
//! | array of variables and object literals     | its length     |
//! | anything else                              | invalid        |

use crate::error::InvalidSignature;
use regoguard_rego::{Rule, Term};

pub fn infer_arity(rule: &Rule) -> Result<usize, InvalidSignature> {
    let Some(key) = &rule.head.key else {
        return Ok(0);
    };
    match key {
        Term::Var(_) | Term::Object(_) => Ok(1),
        Term::Array(items) => {
            // Multi-slot keys may build the review object inline.
            if items.iter().all(is_slot) {
                Ok(items.len())
            } else {
                Err(InvalidSignature::ArrayElements {
                    rule: rule.head.name.clone(),
                    key: key.to_string(),
                    pos: rule.pos,
                })
            }
        }
        other => Err(InvalidSignature::KeyShape {
            rule: rule.head.name.clone(),
            key: other.to_string(),
            pos: rule.pos,
        }),
    }
}

fn is_slot(term: &Term) -> bool {
    matches!(term, Term::Var(_) | Term::Object(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regoguard_rego::parse_module;

    fn arity_of(rule_src: &str) -> Result<usize, InvalidSignature> {
        let module = parse_module("t.rego", &format!("package t\n{rule_src}\n")).expect("parse");
        infer_arity(&module.rules[0])
    }

    #[test]
    fn keyless_rules_have_arity_zero() {
        assert_eq!(arity_of("allow { true }"), Ok(0));
        assert_eq!(arity_of("default allow = false"), Ok(0));
        assert_eq!(arity_of("f(x, y) = z { z := x + y }"), Ok(0));
        assert_eq!(arity_of("name := \"x\""), Ok(0));
    }

    #[test]
    fn single_variable_or_object_is_arity_one() {
        assert_eq!(arity_of("violation[r] { r := 1 }"), Ok(1));
        assert_eq!(arity_of("violation[{\"msg\": msg}] { msg := \"x\" }"), Ok(1));
    }

    #[test]
    fn arrays_count_their_slots() {
        assert_eq!(arity_of("violation[[a, b]] { a := 1; b := 2 }"), Ok(2));
        assert_eq!(
            arity_of("violation[[a, {\"msg\": m}, c]] { a := 1; m := 2; c := 3 }"),
            Ok(3)
        );
        assert_eq!(arity_of("violation[[]] { true }"), Ok(0));
    }

    #[test]
    fn array_with_literal_is_invalid() {
        let err = arity_of("violation[[a, \"b\"]] { a := 1 }").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid rule signature: only single variables or arrays of variables or objects allowed: [a, \"b\"]"
        );
        assert_eq!(err.rule(), "violation");
        assert_eq!(err.pos().line, 2);
    }

    #[test]
    fn other_key_shapes_are_invalid() {
        let err = arity_of("violation[\"fixed\"] { true }").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid rule signature, only variables or arrays allowed: \"fixed\""
        );
        assert!(matches!(
            arity_of("violation[input.x] { true }"),
            Err(InvalidSignature::KeyShape { .. })
        ));
    }
}
