//! Security scan runner
//!
//! Lightweight pattern scan for hardcoded credentials and debug leftovers
//! in source files. Not a replacement for a real SAST tool; it catches the
//! embarrassing cases cheaply and without external dependencies.

use crate::config::AssessmentConfig;
use crate::models::{AssessmentResult, ExecutionMode, Issue, Severity};
use crate::runners::{RunContext, Runner};
use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Cap findings so a generated tree cannot flood the report
const MAX_ISSUES: usize = 100;

static CREDENTIAL_PATTERN: OnceLock<Regex> = OnceLock::new();
static DEBUG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn credential_pattern() -> &'static Regex {
    CREDENTIAL_PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)\b(password|passwd|secret|api_key|apikey|auth_token|access_token|private_key)\b\s*[:=]\s*["'][^"']{4,}["']"#,
        )
        .expect("valid regex")
    })
}

fn debug_pattern() -> &'static Regex {
    DEBUG_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\bdbg!\(|console\.(log|debug)\(|debugger;?|pdb\.set_trace\(\))")
            .expect("valid regex")
    })
}

/// Lines that look like credentials but almost never are
fn is_false_positive(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("example")
        || lower.contains("placeholder")
        || lower.contains("changeme")
        || lower.contains("your_")
        || lower.contains("xxx")
        || lower.contains("_path")
        || lower.contains("_file")
}

fn is_source_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(
        ext,
        "rs" | "py" | "js" | "ts" | "go" | "java" | "rb" | "php" | "cs" | "toml" | "yaml" | "yml"
            | "env"
    )
}

pub struct SecurityRunner;

impl SecurityRunner {
    pub fn new() -> Self {
        Self
    }

    fn scan_file(&self, path: &Path, issues: &mut Vec<Issue>) {
        let Ok(content) = std::fs::read_to_string(path) else {
            return;
        };

        for (index, line) in content.lines().enumerate() {
            if issues.len() >= MAX_ISSUES {
                return;
            }
            let line_no = (index + 1) as u32;
            if credential_pattern().is_match(line) && !is_false_positive(line) {
                issues.push(
                    Issue::new(
                        self.category(),
                        Severity::Critical,
                        path,
                        "possible hardcoded credential",
                    )
                    .with_line(line_no)
                    .with_rule("security/hardcoded-credential"),
                );
            } else if debug_pattern().is_match(line) {
                issues.push(
                    Issue::new(
                        self.category(),
                        Severity::Low,
                        path,
                        "debug statement left in source",
                    )
                    .with_line(line_no)
                    .with_rule("security/debug-leftover"),
                );
            }
        }
    }
}

impl Default for SecurityRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for SecurityRunner {
    fn category(&self) -> &'static str {
        "security"
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
            if ctx.cancel.is_cancelled() || issues.len() >= MAX_ISSUES {
                break;
            }
            let path = entry.path();
            if path.is_file() && is_source_file(path) {
                self.scan_file(path, &mut issues);
            }
        }

        debug!("security: {} findings", issues.len());
        Ok(AssessmentResult::success(self.category(), issues))
    }

    fn estimated_time(&self, _target: &Path) -> Duration {
        Duration::from_secs(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cancel::CancelToken;

    fn run_on(dir: &Path) -> AssessmentResult {
        SecurityRunner::new()
            .assess(
                &RunContext::new(CancelToken::unbounded()),
                dir,
                &AssessmentConfig::default(),
            )
            .expect("security run")
    }

    #[test]
    fn test_hardcoded_credential_is_critical() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("settings.py"),
            "password = \"hunter2-prod\"\n",
        )
        .expect("write");

        let result = run_on(dir.path());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert_eq!(result.issues[0].line, Some(1));
    }

    #[test]
    fn test_placeholder_credential_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("settings.py"),
            "password = \"your_password_here_example\"\n",
        )
        .expect("write");

        let result = run_on(dir.path());
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_debug_leftover_is_low() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("app.js"), "console.log(user);\n").expect("write");

        let result = run_on(dir.path());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Low);
        assert_eq!(
            result.issues[0].rule.as_deref(),
            Some("security/debug-leftover")
        );
    }

    #[test]
    fn test_non_source_files_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("notes.txt"), "password = \"hunter2-prod\"\n")
            .expect("write");

        let result = run_on(dir.path());
        assert!(result.issues.is_empty());
    }
}
