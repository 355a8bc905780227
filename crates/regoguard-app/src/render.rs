//! Report serialization and rendering helpers shared by the CLI.

use anyhow::Context;
use camino::Utf8Path;
use regoguard_types::RegoguardReport;

pub fn render_markdown(report: &RegoguardReport) -> String {
    regoguard_render::render_markdown(report)
}

pub fn serialize_report(report: &RegoguardReport) -> anyhow::Result<Vec<u8>> {
    let mut data = serde_json::to_vec_pretty(report).context("serialize report")?;
    data.push(b'\n');
    Ok(data)
}

/// Write the JSON report, creating parent directories as needed.
pub fn write_report(path: &Utf8Path, report: &RegoguardReport) -> anyhow::Result<()> {
    let data = serialize_report(report)?;
    write_bytes(path, &data).with_context(|| format!("write report: {path}"))
}

pub fn write_text(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    write_bytes(path, text.as_bytes()).with_context(|| format!("write text: {path}"))
}

fn write_bytes(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::runtime_error_report;
    use camino::Utf8PathBuf;

    #[test]
    fn write_report_creates_parent_directories() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let out = root.join("artifacts/regoguard/report.json");

        let report = runtime_error_report("boom");
        write_report(&out, &report).expect("write report");

        let text = std::fs::read_to_string(&out).expect("read back");
        assert!(text.ends_with("}\n"));
        let back: RegoguardReport = serde_json::from_str(&text).expect("parse back");
        assert_eq!(back, report);
    }

    #[test]
    fn markdown_mentions_runtime_error() {
        let md = render_markdown(&runtime_error_report("config exploded"));
        assert!(md.contains("**FAIL**"));
        assert!(md.contains("config exploded"));
    }
}
