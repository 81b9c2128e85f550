//! Minimal CLI: check | rules | export
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::dryrun::{self, DryRunResolution, DryRunStrategy};
use crate::loader;
use crate::registry::RuleRegistry;
use crate::report;
use crate::validator::{RuleSelection, RunReport, Validator};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// lint declared type models (descriptor JSON) against structural rules
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// lint descriptor files and print the findings
    Check(CheckSettings),
    /// list registered rules, one per line
    Rules,
    /// lint and write the JSON report artifact
    Export(ExportSettings),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct RunSettings {
    /// run only these rules (default: every registered rule)
    #[arg(long, value_name = "NAME", num_args = 1..)]
    rules: Vec<String>,

    /// evaluate (type, rule) pairs on a thread pool
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckSettings {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    run_settings: RunSettings,

    /// output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// disable ANSI colors in text output
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

#[derive(clap::Parser, Debug)]
struct ExportSettings {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    run_settings: RunSettings,

    /// output .json report file
    #[arg(short, long)]
    out: PathBuf,

    /// dry-run strategy: none writes, client prints what would be written.
    /// Bare `--dry-run` and boolean values are accepted but deprecated
    #[arg(long, value_name = "STRATEGY", require_equals = true)]
    dry_run: Option<Option<String>>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                // 1) load + lint
                let report = lint(&target.input_settings, &target.run_settings)?;

                // 2) render
                let rendered = match target.format {
                    OutputFormat::Text => report::render_text(&report, !target.no_color),
                    OutputFormat::Json => report::render_json(&report)?,
                };
                println!("{rendered}");

                // 3) findings flip the exit code so CI can gate on it
                Ok(exit_for(&report))
            }
            Command::Rules => {
                let registry = RuleRegistry::builtin();
                for name in registry.names() {
                    println!("{name}");
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Export(target) => {
                // 1) resolve the strategy up front so config errors beat I/O
                let resolution = target.resolve_dry_run()?;
                if let Some(deprecation) = resolution.deprecation {
                    tracing::warn!("{}", deprecation.message());
                }
                if resolution.strategy.is_server() {
                    anyhow::bail!(
                        "export has no server side; use --dry-run=client or --dry-run=none"
                    );
                }

                // 2) lint and render the artifact
                let report = lint(&target.input_settings, &target.run_settings)?;
                let rendered = report::render_json(&report)?;

                // 3) write, or print what the write would have been
                if resolution.strategy.is_client() {
                    println!("{rendered}");
                } else {
                    if let Some(parent) = target.out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&target.out, &rendered)?;
                    tracing::info!(path = %target.out.display(), "report written");
                }
                Ok(exit_for(&report))
            }
        }
    }
}

impl ExportSettings {
    // A flag that was never given means "really write"; only a given flag
    // (with or without a value) goes through strategy resolution.
    fn resolve_dry_run(&self) -> Result<DryRunResolution, dryrun::DryRunError> {
        match &self.dry_run {
            None => Ok(DryRunResolution {
                strategy: DryRunStrategy::None,
                deprecation: None,
            }),
            Some(raw) => dryrun::resolve(raw.as_deref()),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn lint(input: &InputSettings, run: &RunSettings) -> anyhow::Result<RunReport> {
    let types = loader::load_from_patterns(&input.input, input.jq_expr.as_deref())?;
    tracing::debug!(types = types.len(), "descriptor types loaded");
    let registry = RuleRegistry::builtin();
    let validator = Validator::new(&registry);
    let selection = if run.rules.is_empty() {
        RuleSelection::All
    } else {
        RuleSelection::Named(run.rules.clone())
    };
    let report = if run.parallel {
        validator.run_parallel(&types, &selection)?
    } else {
        validator.run(&types, &selection)?
    };
    Ok(report)
}

fn exit_for(report: &RunReport) -> ExitCode {
    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CommandLineInterface {
        CommandLineInterface::try_parse_from(argv).unwrap()
    }

    #[test]
    fn bare_dry_run_flag_parses_as_valueless() {
        let cli = parse(&["declint", "export", "-i", "x.json", "--out", "r.json", "--dry-run"]);
        match cli.cmd {
            Command::Export(settings) => assert_eq!(settings.dry_run, Some(None)),
            other => panic!("expected export, got: {other:?}"),
        }
    }

    #[test]
    fn dry_run_value_is_carried_through() {
        let cli = parse(&[
            "declint", "export", "-i", "x.json", "--out", "r.json", "--dry-run=client",
        ]);
        match cli.cmd {
            Command::Export(settings) => {
                assert_eq!(settings.dry_run, Some(Some("client".to_owned())));
                let resolution = settings.resolve_dry_run().unwrap();
                assert_eq!(resolution.strategy, DryRunStrategy::Client);
                assert_eq!(resolution.deprecation, None);
            }
            other => panic!("expected export, got: {other:?}"),
        }
    }

    #[test]
    fn absent_dry_run_flag_means_really_write() {
        let cli = parse(&["declint", "export", "-i", "x.json", "--out", "r.json"]);
        match cli.cmd {
            Command::Export(settings) => {
                assert_eq!(settings.dry_run, None);
                let resolution = settings.resolve_dry_run().unwrap();
                assert!(resolution.strategy.is_none());
                assert_eq!(resolution.deprecation, None);
            }
            other => panic!("expected export, got: {other:?}"),
        }
    }

    #[test]
    fn check_collects_rule_names_and_format() {
        let cli = parse(&[
            "declint", "check", "-i", "a.json", "b.json", "--rules", "list_type_missing",
            "--format", "json",
        ]);
        match cli.cmd {
            Command::Check(settings) => {
                assert_eq!(settings.input_settings.input, vec!["a.json", "b.json"]);
                assert_eq!(settings.run_settings.rules, vec!["list_type_missing"]);
                assert_eq!(settings.format, OutputFormat::Json);
                assert!(!settings.run_settings.parallel);
            }
            other => panic!("expected check, got: {other:?}"),
        }
    }
}
