//! Formatting runner
//!
//! Wraps `cargo fmt` for Rust targets. In check mode it reports every file
//! with pending diffs as a medium issue; in fix mode it rewrites the files
//! and reports nothing on success.

use crate::config::AssessmentConfig;
use crate::models::{AssessmentResult, ExecutionMode, Issue, Severity};
use crate::runners::external::{run_tool, tool_available};
use crate::runners::{RunContext, Runner};
use anyhow::{anyhow, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

static DIFF_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches rustfmt check output: "Diff in <path> at line <n>:"
fn diff_pattern() -> &'static Regex {
    DIFF_PATTERN.get_or_init(|| {
        Regex::new(r"^Diff in (.+?)(?: at line (\d+))?:").expect("valid regex")
    })
}

pub struct FormatRunner {
    root: PathBuf,
}

impl FormatRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Runner for FormatRunner {
    fn category(&self) -> &'static str {
        "format"
    }

    fn assess(
        &self,
        _ctx: &RunContext,
        target: &Path,
        config: &AssessmentConfig,
    ) -> Result<AssessmentResult> {
        if config.mode == ExecutionMode::NoOp {
            return Ok(AssessmentResult::success(self.category(), vec![]));
        }

        let args: &[&str] = match config.mode {
            ExecutionMode::Fix => &["fmt"],
            _ => &["fmt", "--", "--check"],
        };
        let output = run_tool("cargo", args, target)?;

        let mut issues = Vec::new();
        for line in output.stdout.lines() {
            if let Some(caps) = diff_pattern().captures(line) {
                let file = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let mut issue = Issue::new(
                    self.category(),
                    Severity::Medium,
                    file,
                    "file is not formatted",
                )
                .with_rule("rustfmt");
                if let Some(line_no) = caps.get(2).and_then(|m| m.as_str().parse().ok()) {
                    issue = issue.with_line(line_no);
                }
                issues.push(issue);
            }
        }

        // Non-zero exit with no parsed diffs means the tool itself broke
        if !output.succeeded() && issues.is_empty() {
            let detail = if output.stderr.trim().is_empty() {
                format!("cargo fmt exited with {:?}", output.status)
            } else {
                output.stderr.trim().to_string()
            };
            return Err(anyhow!("{}", detail));
        }

        debug!("format: {} files need formatting", issues.len());
        Ok(AssessmentResult::success(self.category(), issues))
    }

    fn estimated_time(&self, _target: &Path) -> Duration {
        Duration::from_secs(10)
    }

    fn is_available(&self) -> bool {
        self.root.join("Cargo.toml").is_file() && tool_available("cargo", "--version")
    }
}
