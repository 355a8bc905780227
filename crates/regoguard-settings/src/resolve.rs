use crate::{model::RegoguardConfigV1, presets};
use anyhow::Context;
use regoguard_domain::policy::{DuplicateArity, EffectiveConfig, SandboxPolicy};
use regoguard_rego::{is_identifier, is_keyword};

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    /// Replaces the configured allow-set when non-empty.
    pub allowed_fields: Vec<String>,
    /// `(name, arity)` pairs merged over the configured rules.
    pub required_rules: Vec<(String, usize)>,
    pub max_findings: Option<u32>,
    /// Drop every rule requirement.
    pub no_require: bool,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: RegoguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != crate::SCHEMA_CONFIG_V1
    {
        anyhow::bail!(
            "unsupported config schema: {schema} (expected {})",
            crate::SCHEMA_CONFIG_V1
        );
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "gatekeeper".to_string());

    let mut effective = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected {})",
            presets::PROFILES.join("|")
        )
    })?;

    // allow-set
    let fields = if overrides.allowed_fields.is_empty() {
        cfg.allowed_fields.clone()
    } else {
        Some(overrides.allowed_fields.clone())
    };
    if let Some(fields) = fields {
        for field in &fields {
            validate_field(field)?;
        }
        effective.sandbox = SandboxPolicy::new(fields);
    }

    if let Some(mode) = cfg.duplicate_rules.as_deref() {
        effective.duplicates = parse_duplicates(mode)?;
    }

    // max findings
    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        effective.max_findings = mf as usize;
    }

    // required rules: file over profile, command line over file
    let from_file = cfg
        .required_rules
        .iter()
        .map(|(name, arity)| (name.clone(), *arity as usize));
    for (name, arity) in from_file.chain(overrides.required_rules.iter().cloned()) {
        validate_rule_name(&name)?;
        effective.required_rules.insert(name, arity);
    }
    if overrides.no_require {
        effective.required_rules.clear();
    }

    Ok(ResolvedConfig { effective })
}

/// Parse a `name=arity` rule requirement.
pub fn parse_rule_spec(spec: &str) -> anyhow::Result<(String, usize)> {
    let (name, arity) = spec
        .split_once('=')
        .with_context(|| format!("invalid rule requirement: {spec} (expected NAME=ARITY)"))?;
    let name = name.trim();
    validate_rule_name(name)?;
    let arity = arity
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid arity for rule {name}: {arity}"))?;
    Ok((name.to_string(), arity))
}

fn validate_rule_name(name: &str) -> anyhow::Result<()> {
    if !is_identifier(name) || is_keyword(name) {
        anyhow::bail!("invalid rule name: {name:?} (expected a Rego identifier)");
    }
    Ok(())
}

fn validate_field(field: &str) -> anyhow::Result<()> {
    if field.is_empty() {
        anyhow::bail!("allowed_fields entries must not be empty");
    }
    Ok(())
}

fn parse_duplicates(v: &str) -> anyhow::Result<DuplicateArity> {
    match v {
        "keep-last" => Ok(DuplicateArity::KeepLast),
        "reject-conflicting" => Ok(DuplicateArity::RejectConflicting),
        other => anyhow::bail!(
            "unknown duplicate_rules: {other} (expected keep-last|reject-conflicting)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;
    use regoguard_domain::policy::RequiredRules;

    fn resolve(toml: &str, overrides: Overrides) -> anyhow::Result<EffectiveConfig> {
        Ok(resolve_config(parse_config_toml(toml)?, overrides)?.effective)
    }

    #[test]
    fn defaults_to_gatekeeper() {
        let cfg = resolve("", Overrides::default()).expect("resolve");
        assert_eq!(cfg.profile, "gatekeeper");
        assert!(cfg.sandbox.allows("inventory"));
        assert_eq!(
            cfg.required_rules,
            RequiredRules::from([("violation".to_string(), 1)])
        );
        assert_eq!(cfg.duplicates, DuplicateArity::KeepLast);
        assert_eq!(cfg.max_findings, 200);
    }

    #[test]
    fn profiles_differ_in_rules_and_duplicates() {
        let strict = resolve("profile = \"strict\"", Overrides::default()).expect("strict");
        assert_eq!(strict.duplicates, DuplicateArity::RejectConflicting);
        let sandbox = resolve("profile = \"sandbox-only\"", Overrides::default()).expect("sandbox");
        assert!(sandbox.required_rules.is_empty());
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let err = resolve("profile = \"lenient\"", Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("unknown profile: lenient"));
    }

    #[test]
    fn file_settings_apply_over_profile() {
        let cfg = resolve(
            r#"
schema = "regoguard.config.v1"
allowed_fields = ["inventory", "external"]
duplicate_rules = "reject-conflicting"
max_findings = 10

[required_rules]
audit = 0
"#,
            Overrides::default(),
        )
        .expect("resolve");
        assert!(cfg.sandbox.allows("external"));
        assert_eq!(cfg.duplicates, DuplicateArity::RejectConflicting);
        assert_eq!(cfg.max_findings, 10);
        assert_eq!(cfg.required_rules.get("audit"), Some(&0));
        assert_eq!(cfg.required_rules.get("violation"), Some(&1));
    }

    #[test]
    fn overrides_win_over_file() {
        let cfg = resolve(
            "allowed_fields = [\"external\"]\nmax_findings = 10\n[required_rules]\nviolation = 2\n",
            Overrides {
                profile: Some("strict".into()),
                allowed_fields: vec!["inventory".into()],
                required_rules: vec![("violation".into(), 3)],
                max_findings: Some(5),
                no_require: false,
            },
        )
        .expect("resolve");
        assert_eq!(cfg.profile, "strict");
        assert!(cfg.sandbox.allows("inventory"));
        assert!(!cfg.sandbox.allows("external"));
        assert_eq!(cfg.required_rules.get("violation"), Some(&3));
        assert_eq!(cfg.max_findings, 5);
    }

    #[test]
    fn no_require_clears_rules() {
        let cfg = resolve(
            "[required_rules]\naudit = 0\n",
            Overrides {
                no_require: true,
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert!(cfg.required_rules.is_empty());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(resolve("duplicate_rules = \"first\"", Overrides::default()).is_err());
        assert!(resolve("allowed_fields = [\"\"]", Overrides::default()).is_err());
        assert!(resolve("[required_rules]\n\"not-a-name\" = 1\n", Overrides::default()).is_err());
        assert!(resolve("schema = \"other.v9\"", Overrides::default()).is_err());
        assert!(resolve("unknown_key = 1", Overrides::default()).is_err());
    }

    #[test]
    fn rule_specs_parse() {
        assert_eq!(
            parse_rule_spec("violation=1").expect("valid"),
            ("violation".to_string(), 1)
        );
        assert_eq!(
            parse_rule_spec(" audit = 0 ").expect("valid"),
            ("audit".to_string(), 0)
        );
        assert!(parse_rule_spec("violation").is_err());
        assert!(parse_rule_spec("violation=x").is_err());
        assert!(parse_rule_spec("with=1").is_err());
    }
}
