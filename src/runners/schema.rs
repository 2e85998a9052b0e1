//! Schema validation runner
//!
//! Validates that every JSON and TOML file under the target parses. Pure
//! Rust, no external tools, so it is always available and safe to run in
//! any parallel phase.

use crate::config::AssessmentConfig;
use crate::models::{AssessmentResult, ExecutionMode, Issue, Severity};
use crate::runners::{RunContext, Runner};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub struct SchemaRunner;

impl SchemaRunner {
    pub fn new() -> Self {
        Self
    }

    fn validate_file(&self, path: &Path) -> Option<Issue> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        let content = std::fs::read_to_string(path).ok()?;

        let (error, rule) = match ext {
            "json" => (
                serde_json::from_str::<serde_json::Value>(&content)
                    .err()
                    .map(|e| e.to_string()),
                "schema/json",
            ),
            "toml" => (
                toml::from_str::<toml::Value>(&content)
                    .err()
                    .map(|e| e.to_string()),
                "schema/toml",
            ),
            _ => return None,
        };

        error.map(|message| {
            Issue::new(
                self.category(),
                Severity::High,
                path,
                format!("invalid {} syntax: {}", ext, message),
            )
            .with_rule(rule)
        })
    }
}

impl Default for SchemaRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for SchemaRunner {
    fn category(&self) -> &'static str {
        "schema"
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

        let mut issues = Vec::new();
        let walker = ignore::WalkBuilder::new(target)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker.filter_map(|e| e.ok()) {
            if ctx.cancel.is_cancelled() {
                debug!("schema: cancelled mid-walk, returning partial results");
                break;
            }
            let path = entry.path();
            if !path.is_file() || is_excluded(path, &config.exclude) {
                continue;
            }
            if let Some(issue) = self.validate_file(path) {
                issues.push(issue);
            }
        }

        debug!("schema: {} invalid files", issues.len());
        Ok(AssessmentResult::success(self.category(), issues))
    }

    fn estimated_time(&self, _target: &Path) -> Duration {
        Duration::from_secs(2)
    }
}

/// Cheap substring exclusion over the configured patterns
fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    if exclude.is_empty() {
        return false;
    }
    let path = path.to_string_lossy();
    exclude.iter().any(|pattern| path.contains(pattern.as_str()))
}
