use std::collections::{BTreeMap, BTreeSet};

/// Fields of `data` every policy may read. Anything else under `data` is off limits.
pub const DEFAULT_ALLOWED_FIELD: &str = "inventory";

/// Rule name to required arity.
pub type RequiredRules = BTreeMap<String, usize>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SandboxPolicy {
    allowed_fields: BTreeSet<String>,
}

impl SandboxPolicy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inventory_only() -> Self {
        Self::new([DEFAULT_ALLOWED_FIELD])
    }

    pub fn allows(&self, field: &str) -> bool {
        self.allowed_fields.contains(field)
    }

    /// Allowed fields in sorted order.
    pub fn allowed_fields(&self) -> impl Iterator<Item = &str> {
        self.allowed_fields.iter().map(String::as_str)
    }

    pub fn describe(&self) -> String {
        self.allowed_fields().collect::<Vec<_>>().join(", ")
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self::inventory_only()
    }
}

/// How rules declared more than once contribute to the arity index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateArity {
    /// The last definition in the module wins.
    #[default]
    KeepLast,
    /// Definitions disagreeing on arity are an error.
    RejectConflicting,
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    pub sandbox: SandboxPolicy,
    pub required_rules: RequiredRules,
    pub duplicates: DuplicateArity,
    pub max_findings: usize,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            profile: "gatekeeper".to_string(),
            sandbox: SandboxPolicy::inventory_only(),
            required_rules: RequiredRules::from([("violation".to_string(), 1)]),
            duplicates: DuplicateArity::KeepLast,
            max_findings: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_only_allows_inventory() {
        let sandbox = SandboxPolicy::inventory_only();
        assert!(sandbox.allows("inventory"));
        assert!(!sandbox.allows("templates"));
        assert_eq!(sandbox.describe(), "inventory");
    }

    #[test]
    fn describe_is_sorted() {
        let sandbox = SandboxPolicy::new(["zeta", "alpha", "inventory"]);
        assert_eq!(sandbox.describe(), "alpha, inventory, zeta");
    }
}
