use crate::SourcePath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Stable schema identifier for regoguard reports.
pub const SCHEMA_REPORT_V1: &str = "regoguard.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub path: SourcePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub check_id: String,
    pub code: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Stable identifier intended for dedup and trending: a hash of
    /// `check_id + code + path + message`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Check-specific structured payload.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: JsonValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Regoguard-specific summary payload for the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct RegoguardData {
    pub profile: String,
    /// Canonical package path every conforming file was rewritten to.
    pub package: String,
    pub kind: String,

    pub files_scanned: u32,
    pub files_conforming: u32,

    pub allowed_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_rules: BTreeMap<String, usize>,

    pub findings_total: u32,
    pub findings_emitted: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_reason: Option<String>,
}

/// A generic report envelope.
///
/// The outer shape stays stable while the tool-specific summary lives in `data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = RegoguardData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
    pub data: TData,
}

pub type RegoguardReport = ReportEnvelope<RegoguardData>;

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn report_serializes_with_rfc3339_timestamps_and_skips_empty_fields() {
        let report = RegoguardReport {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: ToolMeta {
                name: "regoguard".into(),
                version: "0.1.0".into(),
            },
            started_at: datetime!(2026-01-02 03:04:05 UTC),
            finished_at: datetime!(2026-01-02 03:04:06 UTC),
            verdict: Verdict::Fail,
            findings: vec![Finding {
                check_id: "rego.imports".into(),
                code: "import_used".into(),
                message: "Use of the `import` keyword is not allowed".into(),
                location: Some(Location {
                    path: SourcePath::new("a.rego"),
                    line: None,
                    col: None,
                }),
                help: None,
                fingerprint: None,
                data: JsonValue::Null,
            }],
            data: RegoguardData::default(),
        };

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["started_at"], "2026-01-02T03:04:05Z");
        assert_eq!(json["verdict"], "fail");
        let finding = &json["findings"][0];
        assert!(finding.get("help").is_none());
        assert!(finding.get("data").is_none());
        assert!(finding["location"].get("line").is_none());
        assert!(json["data"].get("required_rules").is_none());

        let back: RegoguardReport = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, report);
    }
}
