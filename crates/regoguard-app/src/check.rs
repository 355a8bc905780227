//! The `check` use case: scan policy sources and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use rayon::prelude::*;
use regoguard_domain::model::{PolicySource, Target};
use regoguard_domain::report::DomainReport;
use regoguard_settings::{Overrides, RegoguardConfigV1, ResolvedConfig};
use regoguard_types::{
    RegoguardReport, ReportEnvelope, Responses, SCHEMA_REPORT_V1, SourcePath, ToolMeta, Verdict,
};
use time::OffsetDateTime;

use crate::discover::discover_sources;
use crate::report::build_responses;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// A `.rego` file or a directory to scan.
    pub root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Template kind and canonical package every source is admitted under.
    pub target: Target,
    /// Keep each source and its canonical form in the responses.
    pub trace: bool,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report.
    pub report: RegoguardReport,
    /// Per-source results, keyed by source path.
    pub responses: Responses,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: resolve config, discover sources, check each, produce report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    let resolved = load_config(input.config_text, input.overrides.clone())?;
    let effective = &resolved.effective;

    let paths = discover_sources(input.root).context("discover policy sources")?;
    let sources: Vec<PolicySource> = paths
        .iter()
        .filter_map(|path| match std::fs::read_to_string(path) {
            Ok(text) => Some(PolicySource {
                path: SourcePath::relative_to(path, input.root),
                text,
            }),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "skipping unreadable policy source");
                None
            }
        })
        .collect();

    let outcomes: Vec<_> = sources
        .par_iter()
        .map(|source| regoguard_domain::check_source(source, &input.target, effective))
        .collect();
    let responses = build_responses(&sources, &outcomes, input.trace);

    let DomainReport {
        verdict,
        findings,
        data,
    } = regoguard_domain::summarize(outcomes, &input.target, effective);

    tracing::info!(
        files = data.files_scanned,
        conforming = data.files_conforming,
        findings = data.findings_total,
        "check finished"
    );

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "regoguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict,
        findings,
        data,
    };

    Ok(CheckOutput {
        report,
        responses,
        resolved_config: resolved,
    })
}

/// Parse and resolve config text (empty is allowed, defaults apply).
pub(crate) fn load_config(
    config_text: &str,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        RegoguardConfigV1::default()
    } else {
        regoguard_settings::parse_config_toml(config_text).context("parse config")?
    };
    let resolved = regoguard_settings::resolve_config(cfg, overrides).context("resolve config")?;
    tracing::debug!(profile = %resolved.effective.profile, "resolved config");
    Ok(resolved)
}

/// Map verdict to exit code: 0 = pass, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Fail => 2,
    }
}
