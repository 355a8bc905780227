use regoguard_domain::model::PolicySource;
use regoguard_domain::report::SourceOutcome;
use regoguard_types::{
    Finding, PolicyResult, RegoguardData, RegoguardReport, ReportEnvelope, Response, Responses,
    SCHEMA_REPORT_V1, ToolMeta, Verdict, ids,
};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Report emitted when the tool itself fails: one `tool.runtime` finding, verdict fail.
pub fn runtime_error_report(message: &str) -> RegoguardReport {
    let now = OffsetDateTime::now_utc();
    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "regoguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at: now,
        finished_at: now,
        verdict: Verdict::Fail,
        findings: vec![Finding {
            check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
            location: None,
            help: Some("Fix the tool error and re-run regoguard.".to_string()),
            fingerprint: None,
            data: JsonValue::Null,
        }],
        data: RegoguardData {
            profile: "unknown".to_string(),
            findings_total: 1,
            findings_emitted: 1,
            ..RegoguardData::default()
        },
    }
}

/// One response per source, targeted at its path.
///
/// With `trace` set, each response keeps the submitted text as its input and the canonical
/// source (or the rejection messages) as its trace.
pub fn build_responses(
    sources: &[PolicySource],
    outcomes: &[SourceOutcome],
    trace: bool,
) -> Responses {
    let mut responses = Responses::new();
    for (source, outcome) in sources.iter().zip(outcomes) {
        let mut response = Response::new(outcome.path.as_str());
        response.results = outcome.findings.iter().map(policy_result).collect();
        if trace {
            response.input = Some(source.text.clone());
            response.trace = Some(match &outcome.canonical {
                Some(canonical) => canonical.clone(),
                None => outcome
                    .findings
                    .iter()
                    .map(|f| f.message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            });
        }
        responses.insert(response);
    }
    responses
}

fn policy_result(finding: &Finding) -> PolicyResult {
    let mut metadata = BTreeMap::new();
    metadata.insert("check_id".to_string(), JsonValue::from(finding.check_id.clone()));
    metadata.insert("code".to_string(), JsonValue::from(finding.code.clone()));
    if let Some(line) = finding.location.as_ref().and_then(|l| l.line) {
        metadata.insert("line".to_string(), JsonValue::from(line));
    }
    if !finding.data.is_null() {
        metadata.insert("details".to_string(), finding.data.clone());
    }
    PolicyResult {
        msg: finding.message.clone(),
        metadata,
        ..PolicyResult::default()
    }
}
