//! Lint runner
//!
//! Wraps `cargo clippy --message-format=json` and maps compiler diagnostic
//! levels to severities. Not parallel-safe: cargo takes an exclusive lock on
//! the target directory, so sharing a phase with another cargo invocation
//! just serializes behind the lock anyway.

use crate::config::AssessmentConfig;
use crate::models::{AssessmentResult, ExecutionMode, Issue, Severity};
use crate::runners::external::{run_tool, tool_available};
use crate::runners::{RunContext, Runner};
use anyhow::{anyhow, Result};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Cap parsed diagnostics so a pathological crate cannot flood the report
const MAX_ISSUES: usize = 200;

pub struct LintRunner {
    root: PathBuf,
}

impl LintRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn map_level(level: &str) -> Option<Severity> {
        match level {
            "error" => Some(Severity::High),
            "warning" => Some(Severity::Medium),
            "note" | "help" => Some(Severity::Low),
            _ => None,
        }
    }

    fn issue_from_message(&self, message: &JsonValue) -> Option<Issue> {
        let level = message.get("level")?.as_str()?;
        let severity = Self::map_level(level)?;
        let text = message.get("message")?.as_str()?;

        let span = message
            .get("spans")?
            .as_array()?
            .iter()
            .find(|span| span.get("is_primary").and_then(JsonValue::as_bool) == Some(true))?;
        let file = span.get("file_name")?.as_str()?;
        let line = span.get("line_start").and_then(JsonValue::as_u64);

        let mut issue = Issue::new(self.category(), severity, file, text);
        if let Some(line) = line {
            issue = issue.with_line(line as u32);
        }
        if let Some(code) = message
            .pointer("/code/code")
            .and_then(JsonValue::as_str)
        {
            issue = issue.with_rule(code);
        }
        Some(issue)
    }
}

impl Runner for LintRunner {
    fn category(&self) -> &'static str {
        "lint"
    }

    fn assess(
        &self,
        ctx: &RunContext,
        target: &Path,
        config: &AssessmentConfig,
    ) -> Result<AssessmentResult> {
        if config.mode == ExecutionMode::NoOp {
            return Ok(AssessmentResult::success(self.category(), vec![]));
        }

        let args: &[&str] = match config.mode {
            ExecutionMode::Fix => &[
                "clippy",
                "--fix",
                "--allow-dirty",
                "--quiet",
                "--message-format=json",
            ],
            _ => &["clippy", "--quiet", "--message-format=json"],
        };
        let output = run_tool("cargo", args, target)?;

        let mut issues = Vec::new();
        for line in output.stdout.lines() {
            if issues.len() >= MAX_ISSUES || ctx.cancel.is_cancelled() {
                break;
            }
            let Ok(value) = serde_json::from_str::<JsonValue>(line) else {
                continue;
            };
            if value.get("reason").and_then(JsonValue::as_str) != Some("compiler-message") {
                continue;
            }
            if let Some(issue) = value
                .get("message")
                .and_then(|message| self.issue_from_message(message))
            {
                issues.push(issue);
            }
        }

        // clippy exits non-zero when it emits errors; that is a finding,
        // not a tool fault. A fault is non-zero with nothing parsed.
        if !output.succeeded() && issues.is_empty() {
            let detail = output.stderr.trim();
            if !detail.is_empty() {
                return Err(anyhow!("cargo clippy failed: {}", detail));
            }
        }

        debug!("lint: {} diagnostics", issues.len());
        Ok(AssessmentResult::success(self.category(), issues))
    }

    fn can_run_in_parallel(&self) -> bool {
        false
    }

    fn estimated_time(&self, _target: &Path) -> Duration {
        Duration::from_secs(30)
    }

    fn is_available(&self) -> bool {
        self.root.join("Cargo.toml").is_file() && tool_available("cargo", "--version")
    }
}
