use regoguard_types::{Finding, RegoguardData, SourcePath, Verdict};

/// Result of checking one policy source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceOutcome {
    pub path: SourcePath,
    pub findings: Vec<Finding>,
    /// Canonical source, present when the sandbox checks passed.
    pub canonical: Option<String>,
}

impl SourceOutcome {
    pub fn conforms(&self) -> bool {
        self.findings.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
    pub data: RegoguardData,
}
