//! Pure sandbox evaluation (no IO).
//!
//! Input: policy source text plus the caller's sandbox settings.
//! Output: canonical source, or typed errors that map onto report findings.

#![forbid(unsafe_code)]

pub mod arity;
pub mod conformance;
pub mod data_access;
pub mod error;
pub mod model;
pub mod package;
pub mod policy;
pub mod report;
pub mod signature;

mod engine;
mod findings;
mod fingerprint;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use arity::infer_arity;
pub use conformance::ensure_conformance;
pub use engine::{check_source, summarize};
pub use error::{
    ConformanceError, DataAccessViolation, InvalidSignature, RuleViolation, SignatureError,
    Violations,
};
pub use signature::require_rules;
