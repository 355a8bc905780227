//! Developer tasks (schema generation, golden normalization, explain coverage).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use regoguard_types::explain;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root: the parent of the xtask directory.
fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "regoguard.report.v1.json",
            generate: || schema_for!(regoguard_types::RegoguardReport),
        },
        SchemaSpec {
            filename: "regoguard.config.v1.json",
            generate: || schema_for!(regoguard_settings::RegoguardConfigV1),
        },
    ]
}

/// Pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json).with_context(|| format!("write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Fail when a checked-in schema is missing or differs from the generated one.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut stale = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        let expected = serialize_schema(&(spec.generate)())?;
        match fs::read_to_string(&path) {
            Ok(actual) if actual == expected => {}
            Ok(_) => stale.push(format!("{} (out of date)", spec.filename)),
            Err(_) => stale.push(format!("{} (missing)", spec.filename)),
        }
    }

    if stale.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &stale {
        eprintln!("  - {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("schema validation failed")
}

fn explain_coverage() -> anyhow::Result<()> {
    let check_ids = explain::all_check_ids();
    let codes = explain::all_codes();

    let mut errors = Vec::new();
    for id in check_ids.iter().chain(codes) {
        match explain::lookup_explanation(id) {
            Some(exp) => {
                for (field, text) in [
                    ("title", exp.title),
                    ("description", exp.description),
                    ("remediation", exp.remediation),
                    ("example", exp.examples.after),
                ] {
                    if text.trim().is_empty() {
                        errors.push(format!("'{id}' has empty {field}"));
                    }
                }
            }
            None => errors.push(format!("'{id}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!(
            "{} check IDs and {} codes have explanations",
            check_ids.len(),
            codes.len()
        );
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!("explain coverage failed with {} errors", errors.len())
}

fn normalize_report(path: &str) -> anyhow::Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse {path}"))?;
    let normalized = regoguard_test_util::normalize_nondeterministic(value);
    println!(
        "{}",
        serde_json::to_string_pretty(&normalized).context("serialize report")?
    );
    Ok(())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help                    Show this message");
    eprintln!("  emit-schemas            Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas        Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids        Print known schema IDs");
    eprintln!("  explain-coverage        Validate all check IDs and codes have explanations");
    eprintln!("  normalize-report FILE   Print a report with nondeterministic fields replaced");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "explain-coverage" => explain_coverage(),
        "normalize-report" => match args.get(2) {
            Some(path) => normalize_report(path),
            None => bail!("normalize-report needs a report path"),
        },
        "print-schema-ids" => {
            println!("{}", regoguard_types::SCHEMA_REPORT_V1);
            println!("{}", regoguard_settings::SCHEMA_CONFIG_V1);
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
