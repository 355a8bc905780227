//! Stable DTOs and IDs used across the regoguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted report
//! - stable string IDs and codes
//! - canonical source path handling
//! - explain registry for remediation guidance
//! - the policy response model handed back to callers

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod path;
pub mod receipt;
pub mod response;

pub use explain::{ExamplePair, Explanation, lookup_explanation};
pub use path::SourcePath;
pub use receipt::{
    Finding, Location, RegoguardData, RegoguardReport, ReportEnvelope, SCHEMA_REPORT_V1, ToolMeta,
    Verdict,
};
pub use response::{PolicyResult, Response, Responses};
