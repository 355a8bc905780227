//! CLI entry point for regoguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `regoguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Args, Parser, Subcommand};
use regoguard_app::{
    CheckInput, ConformInput, ConformOutput, ExplainOutput, format_explanation, format_not_found,
    render_markdown, run_check, run_conform, run_explain, runtime_error_report, verdict_exit_code,
    write_report, write_text,
};
use regoguard_domain::model::Target;
use regoguard_settings::{Overrides, parse_rule_spec};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "regoguard.toml";

#[derive(Parser, Debug)]
#[command(
    name = "regoguard",
    version,
    about = "Sandbox conformance checks for Rego policy templates"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to regoguard config TOML (defaults to ./regoguard.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Override profile (gatekeeper|strict|sandbox-only).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Field of `data` policies may read; repeat to allow several. Replaces the configured set.
    #[arg(long = "allow-field", value_name = "FIELD", global = true)]
    allow_fields: Vec<String>,

    /// Require a rule with the given arity, e.g. `violation=1`; repeatable.
    #[arg(long = "rule", value_name = "NAME=ARITY", global = true)]
    rules: Vec<String>,

    /// Override maximum findings to emit.
    #[arg(long, global = true)]
    max_findings: Option<u32>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug, Clone)]
struct TargetArgs {
    /// Template kind, used to name the source in diagnostics.
    #[arg(long)]
    kind: String,

    /// Canonical package path accepted policies are moved to (e.g. `templates.k8srequiredlabels`).
    #[arg(long)]
    package: String,
}

impl From<TargetArgs> for Target {
    fn from(args: TargetArgs) -> Self {
        Target {
            kind: args.kind,
            package: args.package,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a policy file or directory and write the JSON report.
    Check {
        #[command(flatten)]
        target: TargetArgs,

        /// Skip rule requirements; only run the sandbox checks.
        #[arg(long)]
        no_require: bool,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/regoguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/regoguard/comment.md")]
        markdown_out: Utf8PathBuf,

        /// Print every source, its outcome and its results to stderr.
        #[arg(long)]
        trace: bool,

        /// A `.rego` file or a directory scanned recursively.
        #[arg(default_value = ".")]
        path: Utf8PathBuf,
    },

    /// Check one policy and print it rewritten to the canonical package.
    Conform {
        #[command(flatten)]
        target: TargetArgs,

        /// Write the canonical source here instead of stdout.
        #[arg(long)]
        out: Option<Utf8PathBuf>,

        file: Utf8PathBuf,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "rego.data_access") or code (e.g., "invalid_field") to explain.
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "regoguard starting");

    match &cli.cmd {
        Commands::Check {
            target,
            no_require,
            report_out,
            write_markdown,
            markdown_out,
            trace,
            path,
        } => cmd_check(
            &cli,
            CheckArgs {
                target: target.clone().into(),
                no_require: *no_require,
                report_out,
                markdown_out: write_markdown.then_some(markdown_out.as_path()),
                trace: *trace,
                path,
            },
        ),
        Commands::Conform { target, out, file } => {
            cmd_conform(&cli, target.clone().into(), out.as_deref(), file)
        }
        Commands::Explain { identifier } => cmd_explain(identifier),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

struct CheckArgs<'a> {
    target: Target,
    no_require: bool,
    report_out: &'a Utf8Path,
    markdown_out: Option<&'a Utf8Path>,
    trace: bool,
    path: &'a Utf8Path,
}

fn cmd_check(cli: &Cli, args: CheckArgs<'_>) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let config_text = load_config_text(cli.config.as_deref())?;
        let mut overrides = overrides(cli)?;
        overrides.no_require = args.no_require;

        let output = run_check(CheckInput {
            root: args.path,
            config_text: &config_text,
            overrides,
            target: args.target.clone(),
            trace: args.trace,
        })?;

        write_report(args.report_out, &output.report).context("write report json")?;
        if let Some(markdown_out) = args.markdown_out {
            write_text(markdown_out, &render_markdown(&output.report))
                .context("write markdown")?;
        }
        if args.trace {
            eprint!("{}", output.responses.trace_dump());
        }

        Ok(verdict_exit_code(output.report.verdict))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            if let Err(write_err) = write_report(args.report_out, &report) {
                tracing::warn!(error = %write_err, "could not write runtime error report");
            }
            eprintln!("regoguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_conform(
    cli: &Cli,
    target: Target,
    out: Option<&Utf8Path>,
    file: &Utf8Path,
) -> anyhow::Result<()> {
    let config_text = load_config_text(cli.config.as_deref())?;
    let output = run_conform(ConformInput {
        path: file,
        config_text: &config_text,
        overrides: overrides(cli)?,
        target,
    })?;

    match output {
        ConformOutput::Conformed(canonical) => {
            match out {
                Some(path) => write_text(path, &canonical).context("write canonical source")?,
                None => print!("{canonical}"),
            }
            Ok(())
        }
        ConformOutput::Rejected(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    }
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config_text(explicit: Option<&Utf8Path>) -> anyhow::Result<String> {
    match explicit {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))
        }
        None => {
            let path = Utf8Path::new(DEFAULT_CONFIG);
            if path.is_file() {
                std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))
            } else {
                Ok(String::new())
            }
        }
    }
}

fn overrides(cli: &Cli) -> anyhow::Result<Overrides> {
    let required_rules = cli
        .rules
        .iter()
        .map(|spec| parse_rule_spec(spec))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Overrides {
        profile: cli.profile.clone(),
        allowed_fields: cli.allow_fields.clone(),
        required_rules,
        max_findings: cli.max_findings,
        no_require: false,
    })
}
