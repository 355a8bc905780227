use crate::model::{PolicySource, Target};
use crate::policy::{DuplicateArity, EffectiveConfig, RequiredRules, SandboxPolicy};
use regoguard_types::SourcePath;

pub fn source(path: &str, text: &str) -> PolicySource {
    PolicySource {
        path: SourcePath::new(path),
        text: text.to_string(),
    }
}

pub fn target() -> Target {
    Target {
        kind: "K8sTest".to_string(),
        package: "templates.k8stest".to_string(),
    }
}

pub fn config() -> EffectiveConfig {
    EffectiveConfig {
        profile: "test".to_string(),
        sandbox: SandboxPolicy::inventory_only(),
        required_rules: RequiredRules::from([("violation".to_string(), 1)]),
        duplicates: DuplicateArity::KeepLast,
        max_findings: 200,
    }
}
