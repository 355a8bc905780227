//! Typed domain errors flattened into report findings.

use crate::error::{
    ConformanceError, DataAccessViolation, InvalidSignature, RuleViolation, SignatureError,
};
use regoguard_rego::{Pos, SyntaxError};
use regoguard_types::{Finding, Location, SourcePath, ids};
use serde_json::{Value, json};

pub fn from_conformance(path: &SourcePath, err: &ConformanceError) -> Vec<Finding> {
    match err {
        ConformanceError::EmptySource => vec![finding(
            ids::CHECK_REGO_SYNTAX,
            ids::CODE_EMPTY_SOURCE,
            err.to_string(),
            location(path, None),
            "Submit a module with a package declaration and at least one rule.",
            Value::Null,
        )],
        ConformanceError::Parse(syntax) => vec![parse_finding(path, syntax)],
        ConformanceError::ImportsUsed { pos } => vec![finding(
            ids::CHECK_REGO_IMPORTS,
            ids::CODE_IMPORT_USED,
            err.to_string(),
            location(path, Some(*pos)),
            "Remove the import and inline the logic it provided.",
            Value::Null,
        )],
        ConformanceError::DataAccess(violations) => violations
            .iter()
            .map(|v| data_access_finding(path, v))
            .collect(),
        ConformanceError::InvalidPackagePath { path: desired, .. } => vec![finding(
            ids::CHECK_REGO_PACKAGE,
            ids::CODE_INVALID_PACKAGE_PATH,
            err.to_string(),
            location(path, None),
            "Pass a dotted package path whose first segment is an identifier.",
            json!({ "package": desired }),
        )],
    }
}

pub fn from_signature(path: &SourcePath, err: &SignatureError) -> Vec<Finding> {
    match err {
        SignatureError::Parse(syntax) => vec![parse_finding(path, syntax)],
        SignatureError::InvalidSignature(invalid) => vec![invalid_signature_finding(path, invalid)],
        SignatureError::ConflictingArity {
            name,
            first,
            second,
            pos,
        } => vec![finding(
            ids::CHECK_REGO_RULES,
            ids::CODE_CONFLICTING_ARITY,
            err.to_string(),
            location(path, Some(*pos)),
            "Give every definition of the rule the same head shape.",
            json!({ "rule": name, "arities": [first, second] }),
        )],
        SignatureError::Rules(violations) => violations
            .iter()
            .map(|v| rule_finding(path, v))
            .collect(),
    }
}

fn parse_finding(path: &SourcePath, syntax: &SyntaxError) -> Finding {
    finding(
        ids::CHECK_REGO_SYNTAX,
        ids::CODE_PARSE_ERROR,
        syntax.to_string(),
        location(path, Some(syntax.pos)),
        "Fix the syntax error at the reported position.",
        json!({ "detail": syntax.message }),
    )
}

fn data_access_finding(path: &SourcePath, violation: &DataAccessViolation) -> Finding {
    let (help, data) = match violation {
        DataAccessViolation::MissingField { reference, .. } => (
            "Read a specific allowed field of `data`, such as `data.inventory`.",
            json!({ "reference": reference }),
        ),
        DataAccessViolation::ComputedField { reference, .. } => (
            "Name the field of `data` with a literal; index below it with variables instead.",
            json!({ "reference": reference }),
        ),
        DataAccessViolation::InvalidField {
            reference, field, ..
        } => (
            "Only the allowed fields of `data` may be read.",
            json!({ "reference": reference, "field": field }),
        ),
    };
    finding(
        ids::CHECK_REGO_DATA_ACCESS,
        violation.code(),
        violation.to_string(),
        location(path, violation.pos()),
        help,
        data,
    )
}

fn invalid_signature_finding(path: &SourcePath, invalid: &InvalidSignature) -> Finding {
    finding(
        ids::CHECK_REGO_RULES,
        ids::CODE_INVALID_SIGNATURE,
        invalid.to_string(),
        location(path, Some(invalid.pos())),
        "Use a variable, an object literal, or an array of those as the rule key.",
        json!({ "rule": invalid.rule() }),
    )
}

fn rule_finding(path: &SourcePath, violation: &RuleViolation) -> Finding {
    match violation {
        RuleViolation::Missing { name } => finding(
            ids::CHECK_REGO_RULES,
            violation.code(),
            violation.to_string(),
            location(path, None),
            "Declare the rule the pipeline queries.",
            json!({ "rule": name }),
        ),
        RuleViolation::ArityMismatch {
            name,
            got,
            want,
            pos,
        } => finding(
            ids::CHECK_REGO_RULES,
            violation.code(),
            violation.to_string(),
            location(path, Some(*pos)),
            "Change the rule key so it binds the required number of values.",
            json!({ "rule": name, "got": got, "want": want }),
        ),
    }
}

fn location(path: &SourcePath, pos: Option<Pos>) -> Location {
    Location {
        path: path.clone(),
        line: pos.map(|p| p.line),
        col: pos.map(|p| p.col),
    }
}

fn finding(
    check_id: &str,
    code: &str,
    message: String,
    location: Location,
    help: &str,
    data: Value,
) -> Finding {
    Finding {
        check_id: check_id.to_string(),
        code: code.to_string(),
        message,
        location: Some(location),
        help: Some(help.to_string()),
        fingerprint: None,
        data,
    }
}
