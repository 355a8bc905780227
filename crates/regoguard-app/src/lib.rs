//! Use case orchestration for regoguard.
//!
//! This crate provides the application layer: use cases that coordinate settings, discovery,
//! the domain checks, and rendering. It is intentionally thin and delegates heavy lifting to
//! the appropriate layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod conform;
mod discover;
mod explain;
mod render;
mod report;

pub use check::{CheckInput, CheckOutput, run_check, verdict_exit_code};
pub use conform::{ConformInput, ConformOutput, run_conform};
pub use discover::discover_sources;
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use render::{render_markdown, serialize_report, write_report, write_text};
pub use report::{build_responses, runtime_error_report};
