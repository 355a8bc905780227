//! The `conform` use case: admit a single policy under the target package.

use anyhow::Context;
use camino::Utf8Path;
use regoguard_domain::model::Target;
use regoguard_settings::Overrides;

use crate::check::load_config;

#[derive(Clone, Debug)]
pub struct ConformInput<'a> {
    pub path: &'a Utf8Path,
    pub config_text: &'a str,
    pub overrides: Overrides,
    pub target: Target,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConformOutput {
    /// Canonical source, rewritten to the target package.
    Conformed(String),
    /// Every violation of the first failing stage, one per line.
    Rejected(String),
}

/// Sandbox checks first, then rule requirements; the first failing stage rejects the source.
pub fn run_conform(input: ConformInput<'_>) -> anyhow::Result<ConformOutput> {
    let resolved = load_config(input.config_text, input.overrides)?;
    let cfg = &resolved.effective;
    let source = std::fs::read_to_string(input.path)
        .with_context(|| format!("read policy source: {}", input.path))?;

    let canonical = match regoguard_domain::ensure_conformance(
        &input.target.kind,
        &input.target.package,
        &source,
        &cfg.sandbox,
    ) {
        Ok(canonical) => canonical,
        Err(err) => {
            tracing::info!(path = %input.path, check = err.check_id(), "policy rejected");
            return Ok(ConformOutput::Rejected(err.to_string()));
        }
    };

    if !cfg.required_rules.is_empty()
        && let Err(err) = regoguard_domain::require_rules(
            &input.target.kind,
            &source,
            &cfg.required_rules,
            cfg.duplicates,
        )
    {
        tracing::info!(path = %input.path, "policy rejected by rule requirements");
        return Ok(ConformOutput::Rejected(err.to_string()));
    }

    Ok(ConformOutput::Conformed(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn run(text: &str, config_text: &str) -> ConformOutput {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let path = root.join("template.rego");
        std::fs::write(&path, text).expect("write source");
        run_conform(ConformInput {
            path: &path,
            config_text,
            overrides: Overrides::default(),
            target: Target {
                kind: "K8sAllowedRepos".to_string(),
                package: "templates.k8sallowedrepos".to_string(),
            },
        })
        .expect("run_conform")
    }

    #[test]
    fn conforming_source_is_rewritten() {
        let out = run(
            "package repos\nviolation[{\"msg\": msg}] { msg := data.inventory.x }\n",
            "",
        );
        assert_eq!(
            out,
            ConformOutput::Conformed(
                "package templates.k8sallowedrepos\n\nviolation[{\"msg\": msg}] {\n\tmsg := data.inventory.x\n}\n"
                    .to_string()
            )
        );
    }

    #[test]
    fn every_data_violation_is_listed() {
        let out = run(
            "package repos\nviolation[{\"msg\": msg}] { data.a; data[x]; msg := data.b }\n",
            "",
        );
        let ConformOutput::Rejected(message) = out else {
            panic!("expected rejection");
        };
        assert_eq!(message.lines().count(), 3);
        assert!(message.contains("Invalid `data` field: \"a\""));
    }

    #[test]
    fn missing_required_rule_rejects() {
        let out = run("package repos\ndeny[msg] { msg := \"x\" }\n", "");
        let ConformOutput::Rejected(message) = out else {
            panic!("expected rejection");
        };
        assert!(message.contains("violation"));
    }

    #[test]
    fn sandbox_only_profile_skips_rule_requirements() {
        let out = run(
            "package repos\ndeny[msg] { msg := \"x\" }\n",
            "profile = \"sandbox-only\"\n",
        );
        assert!(matches!(out, ConformOutput::Conformed(_)));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = run_conform(ConformInput {
            path: Utf8Path::new("/definitely/not/here.rego"),
            config_text: "",
            overrides: Overrides::default(),
            target: Target {
                kind: "K".to_string(),
                package: "p".to_string(),
            },
        })
        .unwrap_err();
        assert!(err.to_string().contains("read policy source"));
    }
}
