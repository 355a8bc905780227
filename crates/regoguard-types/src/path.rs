use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical root-relative path of a policy source, used in findings and reports.
///
/// - always forward slashes (`/`)
/// - no leading `./`
/// - never empty (`.` stands for the scan root itself)
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SourcePath(String);

impl Default for SourcePath {
    fn default() -> Self {
        SourcePath::new(".")
    }
}

impl SourcePath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while v.starts_with("./") {
            v = v.trim_start_matches("./").to_string();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path relative to `root`, or the path unchanged when it lies elsewhere.
    pub fn relative_to(path: &Utf8Path, root: &Utf8Path) -> Self {
        match path.strip_prefix(root) {
            Ok(rel) if rel.as_str().is_empty() => {
                SourcePath::new(path.file_name().unwrap_or(path.as_str()))
            }
            Ok(rel) => SourcePath::from(rel),
            Err(_) => SourcePath::from(path),
        }
    }
}

impl std::fmt::Display for SourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Utf8Path> for SourcePath {
    fn from(value: &Utf8Path) -> Self {
        SourcePath::new(value.as_str())
    }
}

impl From<Utf8PathBuf> for SourcePath {
    fn from(value: Utf8PathBuf) -> Self {
        SourcePath::new(value.as_str())
    }
}
