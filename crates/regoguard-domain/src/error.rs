use regoguard_rego::{Pos, SyntaxError};
use regoguard_types::ids;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// A non-empty, ordered list of independently discovered problems.
///
/// Renders as the newline-joined messages of its entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Violations<T>(Vec<T>);

impl<T> Violations<T> {
    /// `None` when `items` is empty.
    pub fn from_vec(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<'a, T> IntoIterator for &'a Violations<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Display> Display for Violations<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug + Display> std::error::Error for Violations<T> {}

/// An illegal reference to the root document.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DataAccessViolation {
    #[error("All references to `data` must access a field of `data`: {reference}")]
    MissingField { reference: String, pos: Option<Pos> },

    #[error(
        "Fields of `data` must be accessed with a literal value (e.g. `data.inventory`, not `data[var]`): {reference}"
    )]
    ComputedField { reference: String, pos: Option<Pos> },

    #[error("Invalid `data` field: {field}. Valid fields are: {allowed}")]
    InvalidField {
        reference: String,
        /// The offending field as written, e.g. `"templates"` or `1`.
        field: String,
        allowed: String,
        pos: Option<Pos>,
    },
}

impl DataAccessViolation {
    pub fn code(&self) -> &'static str {
        match self {
            DataAccessViolation::MissingField { .. } => ids::CODE_MISSING_FIELD,
            DataAccessViolation::ComputedField { .. } => ids::CODE_COMPUTED_FIELD,
            DataAccessViolation::InvalidField { .. } => ids::CODE_INVALID_FIELD,
        }
    }

    pub fn pos(&self) -> Option<Pos> {
        match self {
            DataAccessViolation::MissingField { pos, .. }
            | DataAccessViolation::ComputedField { pos, .. }
            | DataAccessViolation::InvalidField { pos, .. } => *pos,
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            DataAccessViolation::MissingField { reference, .. }
            | DataAccessViolation::ComputedField { reference, .. }
            | DataAccessViolation::InvalidField { reference, .. } => reference,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConformanceError {
    #[error("Rego source code is empty")]
    EmptySource,

    #[error(transparent)]
    Parse(#[from] SyntaxError),

    #[error("Use of the `import` keyword is not allowed")]
    ImportsUsed { pos: Pos },

    #[error(transparent)]
    DataAccess(Violations<DataAccessViolation>),

    #[error("Invalid package path `{path}`: {reason}")]
    InvalidPackagePath { path: String, reason: &'static str },
}

impl ConformanceError {
    pub fn check_id(&self) -> &'static str {
        match self {
            ConformanceError::EmptySource | ConformanceError::Parse(_) => ids::CHECK_REGO_SYNTAX,
            ConformanceError::ImportsUsed { .. } => ids::CHECK_REGO_IMPORTS,
            ConformanceError::DataAccess(_) => ids::CHECK_REGO_DATA_ACCESS,
            ConformanceError::InvalidPackagePath { .. } => ids::CHECK_REGO_PACKAGE,
        }
    }
}

/// A rule head whose key has no inferable arity.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidSignature {
    #[error(
        "Invalid rule signature: only single variables or arrays of variables or objects allowed: {key}"
    )]
    ArrayElements { rule: String, key: String, pos: Pos },

    #[error("Invalid rule signature, only variables or arrays allowed: {key}")]
    KeyShape { rule: String, key: String, pos: Pos },
}

impl InvalidSignature {
    pub fn rule(&self) -> &str {
        match self {
            InvalidSignature::ArrayElements { rule, .. } | InvalidSignature::KeyShape { rule, .. } => {
                rule
            }
        }
    }

    pub fn pos(&self) -> Pos {
        match self {
            InvalidSignature::ArrayElements { pos, .. } | InvalidSignature::KeyShape { pos, .. } => {
                *pos
            }
        }
    }
}

/// A required rule that is absent or declared with the wrong arity.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("Missing required rule: {name}")]
    Missing { name: String },

    #[error("Rule {name} has arity {got}, want {want}")]
    ArityMismatch {
        name: String,
        got: usize,
        want: usize,
        pos: Pos,
    },
}

impl RuleViolation {
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::Missing { .. } => ids::CODE_MISSING_RULE,
            RuleViolation::ArityMismatch { .. } => ids::CODE_ARITY_MISMATCH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SignatureError {
    #[error(transparent)]
    Parse(#[from] SyntaxError),

    #[error(transparent)]
    InvalidSignature(#[from] InvalidSignature),

    #[error("Rule {name} is declared with arity {first} and with arity {second}")]
    ConflictingArity {
        name: String,
        first: usize,
        second: usize,
        pos: Pos,
    },

    #[error(transparent)]
    Rules(Violations<RuleViolation>),
}
