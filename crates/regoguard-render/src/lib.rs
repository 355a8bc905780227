//! Rendering of reports for PR comments and CI job summaries.

#![forbid(unsafe_code)]

mod markdown;

pub use markdown::render_markdown;
