use crate::conformance::ensure_conformance;
use crate::error::ConformanceError;
use crate::findings::{from_conformance, from_signature};
use crate::fingerprint::fingerprint_for_finding;
use crate::model::{PolicySource, Target};
use crate::policy::EffectiveConfig;
use crate::report::{DomainReport, SourceOutcome};
use crate::signature::require_rules;
use regoguard_types::{Finding, RegoguardData, Verdict};

/// Run the sandbox checks and, when the source parses, the rule requirements.
pub fn check_source(source: &PolicySource, target: &Target, cfg: &EffectiveConfig) -> SourceOutcome {
    let mut findings = Vec::new();

    let conformance =
        ensure_conformance(&target.kind, &target.package, &source.text, &cfg.sandbox);
    let parsed = !matches!(
        conformance,
        Err(ConformanceError::EmptySource | ConformanceError::Parse(_))
    );
    let canonical = match conformance {
        Ok(canonical) => Some(canonical),
        Err(err) => {
            findings.extend(from_conformance(&source.path, &err));
            None
        }
    };

    if parsed
        && !cfg.required_rules.is_empty()
        && let Err(err) = require_rules(
            &target.kind,
            &source.text,
            &cfg.required_rules,
            cfg.duplicates,
        )
    {
        findings.extend(from_signature(&source.path, &err));
    }

    for f in &mut findings {
        let path = f.location.as_ref().map(|l| l.path.as_str()).unwrap_or("");
        f.fingerprint = Some(fingerprint_for_finding(&f.check_id, &f.code, path, &f.message));
    }

    tracing::debug!(
        path = %source.path,
        findings = findings.len(),
        conforming = canonical.is_some(),
        "checked policy source"
    );
    SourceOutcome {
        path: source.path.clone(),
        findings,
        canonical,
    }
}

/// Merge per-source outcomes into one deterministic report.
pub fn summarize(
    outcomes: Vec<SourceOutcome>,
    target: &Target,
    cfg: &EffectiveConfig,
) -> DomainReport {
    let files_scanned = outcomes.len() as u32;
    let files_conforming = outcomes.iter().filter(|o| o.conforms()).count() as u32;

    let mut findings: Vec<Finding> = outcomes.into_iter().flat_map(|o| o.findings).collect();

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    let total = findings.len() as u32;
    let verdict = if findings.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    let mut emitted = findings;
    let mut truncated_reason: Option<String> = None;
    if emitted.len() > cfg.max_findings {
        emitted.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let data = RegoguardData {
        profile: cfg.profile.clone(),
        package: target.package.clone(),
        kind: target.kind.clone(),
        files_scanned,
        files_conforming,
        allowed_fields: cfg.sandbox.allowed_fields().map(str::to_string).collect(),
        required_rules: cfg.required_rules.clone(),
        findings_total: total,
        findings_emitted: emitted.len() as u32,
        truncated_reason,
    };

    DomainReport {
        verdict,
        findings: emitted,
        data,
    }
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) location.path (missing last)
    // 2) location.line (missing last)
    // 3) check_id
    // 4) code
    // 5) message
    let (ap, al) = match &a.location {
        Some(l) => (l.path.as_str(), l.line.unwrap_or(u32::MAX)),
        None => ("~", u32::MAX),
    };
    let (bp, bl) = match &b.location {
        Some(l) => (l.path.as_str(), l.line.unwrap_or(u32::MAX)),
        None => ("~", u32::MAX),
    };

    ap.cmp(bp)
        .then(al.cmp(&bl))
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}
