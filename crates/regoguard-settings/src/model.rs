use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_CONFIG_V1: &str = "regoguard.config.v1";

/// `regoguard.toml` schema v1.
///
/// This is a *user-facing* config model: every key is optional and falls back to the profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RegoguardConfigV1 {
    /// Optional schema string for tooling (`regoguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `gatekeeper` (default), `strict` or `sandbox-only`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Fields of `data` policies may read. Replaces the profile's list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_fields: Option<Vec<String>>,

    /// `keep-last` or `reject-conflicting`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_rules: Option<String>,

    /// How many findings to emit before truncating the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings: Option<u32>,

    /// Rule name -> required arity, merged over the profile's rules.
    #[serde(default)]
    pub required_rules: BTreeMap<String, u32>,
}
