//! CLI command definitions and handlers

use crate::config::{self, AssessmentConfig};
use crate::engine::AssessmentEngine;
use crate::gate::{should_fail, worst_severity};
use crate::hooks;
use crate::models::{AssessmentReport, ExecutionMode, Severity};
use crate::runners::builtin_registry;
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Assayer - priority-scheduled code assessment
#[derive(Parser, Debug)]
#[command(name = "assayer")]
#[command(
    version,
    about = "Orchestrates format, lint, security and schema checks into one severity-gated assessment",
    after_help = "\
Examples:
  assayer .                            Assess current directory
  assayer assess . --format json       JSON report for scripting
  assayer assess . --fail-on medium    Exit 1 on medium+ findings (CI mode)
  assayer assess . --category lint --category schema
  assayer hook pre-commit              Run the pre-commit subset
  assayer validate .                   Schema checks only
  assayer categories                   List registered runners"
)]
pub struct Cli {
    /// Path to the codebase to assess (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an assessment (the default when no subcommand is given)
    Assess {
        /// Execution mode: no-op, check, fix
        #[arg(long, short = 'm', default_value = "check", value_parser = ["no-op", "check", "fix"])]
        mode: String,

        /// Exit with code 1 if findings at this severity or higher exist
        #[arg(long, value_parser = ["info", "low", "medium", "high", "critical"])]
        fail_on: Option<String>,

        /// Restrict the run to these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Priority string, e.g. "security=1,format=2" (lower runs earlier)
        #[arg(long)]
        priority: Option<String>,

        /// Number of parallel workers (1-64; default: derived from --workers-percent)
        #[arg(long, value_parser = parse_workers)]
        workers: Option<usize>,

        /// Percentage of available processors to use when --workers is unset
        #[arg(long)]
        workers_percent: Option<u32>,

        /// Overall deadline for the run, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Exclude paths containing these substrings (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Run the category subset and threshold for a git hook
    Hook {
        /// Hook identifier: pre-commit, pre-push
        hook: String,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Validate schema files only (fail on high)
    Validate {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// List registered runner categories and their availability
    Categories,
}

/// Dispatch a parsed CLI invocation; returns the process exit code
pub fn run(cli: Cli) -> Result<i32> {
    let path = cli.path.clone();
    match cli.command {
        None => {
            let mut config = AssessmentConfig::default();
            config
                .apply_defaults(&config::load_project_defaults(&path))?;
            assess_and_report(&path, config, "text")
        }
        Some(Commands::Assess {
            mode,
            fail_on,
            categories,
            priority,
            workers,
            workers_percent,
            timeout_secs,
            exclude,
            format,
        }) => {
            let mut config = AssessmentConfig::default();
            config.apply_defaults(&config::load_project_defaults(&path))?;

            config.mode = mode.parse::<ExecutionMode>()?;
            if let Some(fail_on) = fail_on {
                config.fail_on = fail_on.parse::<Severity>()?;
            }
            if !categories.is_empty() {
                config.categories = Some(categories);
            }
            if let Some(priority) = priority {
                config.priority = priority;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if let Some(percent) = workers_percent {
                config.workers_percent = percent;
            }
            if let Some(secs) = timeout_secs {
                config.timeout = Duration::from_secs(secs);
            }
            if !exclude.is_empty() {
                config.exclude = exclude;
            }

            assess_and_report(&path, config, &format)
        }
        Some(Commands::Hook { hook, format }) => {
            let config = hooks::config_for_hook(&hook)?;
            assess_and_report(&path, config, &format)
        }
        Some(Commands::Validate { format }) => {
            let config = AssessmentConfig::default()
                .with_categories(vec!["schema".to_string()])
                .with_fail_on(Severity::High);
            assess_and_report(&path, config, &format)
        }
        Some(Commands::Categories) => {
            list_categories(&path);
            Ok(0)
        }
    }
}

fn assess_and_report(path: &PathBuf, config: AssessmentConfig, format: &str) -> Result<i32> {
    let registry = Arc::new(builtin_registry(path));
    let engine = AssessmentEngine::new(registry);
    let report = engine.run_assessment(path, &config)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_summary(&report),
    }

    Ok(if should_fail(&report, config.fail_on) {
        1
    } else {
        0
    })
}

fn list_categories(path: &PathBuf) {
    let registry = builtin_registry(path);
    for runner in registry.all() {
        if runner.is_available() {
            println!("{}", runner.category());
        } else {
            println!(
                "{} {}",
                runner.category(),
                style("(unavailable)").dim()
            );
        }
    }
}

fn print_summary(report: &AssessmentReport) {
    let score = report.summary.health_score;
    let score_styled = if score >= 90.0 {
        style(format!("{:.1}", score)).green()
    } else if score >= 70.0 {
        style(format!("{:.1}", score)).yellow()
    } else {
        style(format!("{:.1}", score)).red()
    };
    println!(
        "Health: {}  ({} issues, {} critical)",
        score_styled, report.summary.total_issues, report.summary.critical_issues
    );

    for (category, result) in &report.categories {
        let marker = if result.skipped {
            style("-".to_string()).dim()
        } else if !result.success {
            style("x".to_string()).red()
        } else if result.issues.is_empty() {
            style("ok".to_string()).green()
        } else {
            style(format!("{}", result.issues.len())).yellow()
        };
        let detail = result
            .error
            .as_deref()
            .map(|e| format!("  ({})", e))
            .unwrap_or_default();
        println!("  {:<12} {}{}", category, marker, detail);
    }

    if let Some(worst) = worst_severity(report) {
        println!("Worst severity: {}", worst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workers_bounds() {
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("eight").is_err());
        assert_eq!(parse_workers("8").expect("valid"), 8);
    }

    #[test]
    fn test_assess_flags() {
        let cli = Cli::parse_from([
            "assayer",
            "assess",
            ".",
            "--fail-on",
            "medium",
            "--category",
            "lint",
            "--workers",
            "2",
        ]);
        match cli.command {
            Some(Commands::Assess {
                fail_on,
                categories,
                workers,
                ..
            }) => {
                assert_eq!(fail_on.as_deref(), Some("medium"));
                assert_eq!(categories, vec!["lint"]);
                assert_eq!(workers, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
