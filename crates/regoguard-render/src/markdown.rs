use regoguard_types::{RegoguardReport, Verdict};
use std::fmt::Write as _;

pub fn render_markdown(report: &RegoguardReport) -> String {
    let mut out = String::new();
    let data = &report.data;

    out.push_str("# Regoguard report\n\n");
    let verdict = match report.verdict {
        Verdict::Pass => "PASS",
        Verdict::Fail => "FAIL",
    };
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "- Verdict: **{}**\n- Kind: `{}`\n- Package: `{}`\n- Profile: `{}`\n\
         - Files: {} conforming / {} scanned\n\
         - Findings: {} (emitted) / {} (total)\n\n",
        verdict,
        data.kind,
        data.package,
        data.profile,
        data.files_conforming,
        data.files_scanned,
        data.findings_emitted,
        data.findings_total
    );

    if let Some(r) = &data.truncated_reason {
        let _ = write!(out, "> Note: {r}\n\n");
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    for f in &report.findings {
        let _ = write!(out, "- `{}` / `{}`: {}", f.check_id, f.code, f.message);
        if let Some(loc) = &f.location {
            match loc.line {
                Some(line) => {
                    let _ = write!(out, " (`{}`:{})", loc.path, line);
                }
                None => {
                    let _ = write!(out, " (`{}`)", loc.path);
                }
            }
        }
        out.push('\n');

        if let Some(help) = &f.help {
            let _ = writeln!(out, "  - help: {help}");
        }
    }

    out
}
