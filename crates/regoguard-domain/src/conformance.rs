use crate::data_access::find_data_violations;
use crate::error::{ConformanceError, Violations};
use crate::package::{package_ref, rewrite_package};
use crate::policy::SandboxPolicy;
use regoguard_rego::{Ref, parse_module};

/// Check that `source` stays inside the sandbox and move it to `desired_path`.
///
/// `kind` names the source in parse diagnostics. On success the returned text is the
/// canonical printing of the module with its package replaced by `data.<desired_path>`.
///
/// # Errors
///
/// Empty source, syntax errors and imports fail immediately. Illegal accesses to `data`
/// are collected and returned together.
pub fn ensure_conformance(
    kind: &str,
    desired_path: &str,
    source: &str,
    sandbox: &SandboxPolicy,
) -> Result<String, ConformanceError> {
    if source.trim().is_empty() {
        return Err(ConformanceError::EmptySource);
    }
    let mut module = parse_module(kind, source)?;
    tracing::debug!(kind, rules = module.rules.len(), "parsed module");

    if let Some(import) = module.imports.first() {
        return Err(ConformanceError::ImportsUsed { pos: import.pos });
    }

    // The declared package is itself a `data` ref; it is replaced anyway.
    module.package.path = Ref::new(Vec::new());
    if let Some(violations) = Violations::from_vec(find_data_violations(&module, sandbox)) {
        return Err(ConformanceError::DataAccess(violations));
    }

    let path = package_ref(desired_path)?;
    tracing::debug!(kind, package = %path, "rewriting package");
    Ok(rewrite_package(&mut module, path))
}
