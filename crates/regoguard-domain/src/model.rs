use regoguard_types::SourcePath;

/// One policy file as read by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicySource {
    pub path: SourcePath,
    pub text: String,
}

/// Where accepted policies are being admitted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// Template kind, used to name sources in parse diagnostics.
    pub kind: String,
    /// Canonical package path, dotted.
    pub package: String,
}
