//! CLI entry point for complyguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `complyguard-app` crate.

mod logging;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use complyguard_app::{
    CheckInput, ExplainOutput, format_explanation, format_not_found, format_rulesets, run_check,
    run_explain, run_rulesets, runtime_error_report, verdict_exit_code, write_report,
};
use complyguard_settings::Overrides;
use tracing::{debug, error};

const DEFAULT_CONFIG: &str = "complyguard.toml";

#[derive(Parser, Debug)]
#[command(
    name = "complyguard",
    version,
    about = "Compliance checks for third-party components"
)]
struct Cli {
    /// Path to complyguard config TOML (default: ./complyguard.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Override profile (strict|standard|lenient).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Lowest severity that fails the run (info|warn|fail).
    #[arg(long, global = true)]
    fail_on: Option<String>,

    /// Override maximum findings to emit.
    #[arg(long, global = true)]
    max_findings: Option<u32>,

    /// Log level for complyguard targets; `COMPLYGUARD_LOG` takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an inventory against the configured policy and write the report.
    Check {
        /// Inventory JSON document, or a directory of them.
        #[arg(long)]
        inventory: Utf8PathBuf,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/complyguard/report.json")]
        report_out: Utf8PathBuf,
    },

    /// Explain a rule id with remediation guidance.
    Explain {
        /// The rule id (e.g. "license.forbidden").
        rule_id: String,
    },

    /// List rulesets, their versions, rules and configured severities.
    Rulesets,

    /// Print the JSON schema of the configuration file.
    Schema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_level.as_deref());

    match &cli.cmd {
        Commands::Check {
            inventory,
            report_out,
        } => cmd_check(&cli, inventory, report_out),
        Commands::Explain { rule_id } => cmd_explain(rule_id),
        Commands::Rulesets => cmd_rulesets(&cli),
        Commands::Schema => cmd_schema(),
    }
}

fn overrides(cli: &Cli) -> Overrides {
    Overrides {
        profile: cli.profile.clone(),
        fail_on: cli.fail_on.clone(),
        max_findings: cli.max_findings,
    }
}

/// Config text from `--config`, or the default file when it exists.
///
/// An explicit path that cannot be read is an error; a missing default file
/// means defaults apply.
fn read_config(cli: &Cli) -> anyhow::Result<String> {
    match &cli.config {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read config {path}"))
        }
        None => {
            let path = Utf8Path::new(DEFAULT_CONFIG);
            if path.is_file() {
                std::fs::read_to_string(path).with_context(|| format!("read config {path}"))
            } else {
                debug!("no {DEFAULT_CONFIG} found; using defaults");
                Ok(String::new())
            }
        }
    }
}

fn cmd_check(cli: &Cli, inventory: &Utf8Path, report_out: &Utf8Path) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let config_text = read_config(cli)?;
        let output = run_check(CheckInput {
            inventory_path: inventory,
            config_text: &config_text,
            overrides: overrides(cli),
        })?;

        write_report(report_out, &output.report).context("write report json")?;
        if let Some(summary) = &output.fail_summary {
            eprintln!("{summary}");
        }
        Ok(verdict_exit_code(output.report.verdict.status))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            error!("{err:#}");
            let profile = cli.profile.as_deref().unwrap_or("unknown");
            let report = runtime_error_report(profile, &format!("{err:#}"));
            if let Err(write_err) = write_report(report_out, &report) {
                eprintln!("complyguard: could not write error report: {write_err:#}");
            }
            eprintln!("complyguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_explain(rule_id: &str) -> anyhow::Result<()> {
    match run_explain(rule_id) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_rule_ids,
        } => {
            eprint!("{}", format_not_found(&identifier, available_rule_ids));
            std::process::exit(1);
        }
    }
}

fn cmd_rulesets(cli: &Cli) -> anyhow::Result<()> {
    let config_text = read_config(cli)?;
    let output = run_rulesets(&config_text, overrides(cli))?;
    print!("{}", format_rulesets(&output.rulesets, &output.selected));
    Ok(())
}

fn cmd_schema() -> anyhow::Result<()> {
    let schema = complyguard_settings::config_schema();
    let text = serde_json::to_string_pretty(&schema).context("serialize config schema")?;
    println!("{text}");
    Ok(())
}
