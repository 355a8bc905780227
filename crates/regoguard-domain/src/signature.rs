use crate::arity::infer_arity;
use crate::error::{RuleViolation, SignatureError, Violations};
use crate::policy::{DuplicateArity, RequiredRules};
use regoguard_rego::{Module, Pos, parse_module};
use std::collections::BTreeMap;

/// Declared arity of a rule and where its deciding definition starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeclaredArity {
    pub arity: usize,
    pub pos: Pos,
}

/// Index every rule of the module by name.
///
/// The first rule whose arity cannot be inferred aborts the index.
pub fn rule_arities(
    module: &Module,
    duplicates: DuplicateArity,
) -> Result<BTreeMap<String, DeclaredArity>, SignatureError> {
    let mut arities: BTreeMap<String, DeclaredArity> = BTreeMap::new();
    for rule in &module.rules {
        let declared = DeclaredArity {
            arity: infer_arity(rule)?,
            pos: rule.pos,
        };
        if let Some(previous) = arities.insert(rule.head.name.clone(), declared)
            && duplicates == DuplicateArity::RejectConflicting
            && previous.arity != declared.arity
        {
            return Err(SignatureError::ConflictingArity {
                name: rule.head.name.clone(),
                first: previous.arity,
                second: declared.arity,
                pos: rule.pos,
            });
        }
    }
    Ok(arities)
}

/// Check that every required rule is declared with the required arity.
///
/// Missing rules and arity mismatches are collected across all requirements, in rule
/// name order.
pub fn require_rules(
    label: &str,
    source: &str,
    required: &RequiredRules,
    duplicates: DuplicateArity,
) -> Result<(), SignatureError> {
    let module = parse_module(label, source)?;
    let arities = rule_arities(&module, duplicates)?;
    tracing::debug!(label, rules = arities.len(), "indexed rule arities");

    let mut problems = Vec::new();
    for (name, &want) in required {
        match arities.get(name) {
            None => problems.push(RuleViolation::Missing { name: name.clone() }),
            Some(declared) if declared.arity != want => {
                problems.push(RuleViolation::ArityMismatch {
                    name: name.clone(),
                    got: declared.arity,
                    want,
                    pos: declared.pos,
                });
            }
            Some(_) => {}
        }
    }

    match Violations::from_vec(problems) {
        Some(violations) => Err(SignatureError::Rules(violations)),
        None => Ok(()),
    }
}
