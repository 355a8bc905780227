use regoguard_domain::policy::{DuplicateArity, EffectiveConfig, RequiredRules, SandboxPolicy};

pub const PROFILES: &[&str] = &["gatekeeper", "strict", "sandbox-only"];

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into repo config.
pub fn preset(profile: &str) -> Option<EffectiveConfig> {
    match profile {
        "gatekeeper" => Some(gatekeeper_profile()),
        "strict" => Some(strict_profile()),
        "sandbox-only" => Some(sandbox_only_profile()),
        _ => None,
    }
}

fn gatekeeper_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "gatekeeper".to_string(),
        sandbox: SandboxPolicy::inventory_only(),
        required_rules: RequiredRules::from([("violation".to_string(), 1)]),
        duplicates: DuplicateArity::KeepLast,
        max_findings: 200,
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        duplicates: DuplicateArity::RejectConflicting,
        ..gatekeeper_profile()
    }
}

fn sandbox_only_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "sandbox-only".to_string(),
        required_rules: RequiredRules::new(),
        ..gatekeeper_profile()
    }
}
