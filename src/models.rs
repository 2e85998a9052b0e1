//! Core data models for Assayer
//!
//! These models are shared by the orchestration engine, the runners, and the
//! CLI: issue findings, per-runner results, and the final assessment report.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Severity levels for issues
///
/// The derived `Ord` is the total order used by the severity gate and the
/// health scorer: `info < low < medium < high < critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(anyhow!(
                "Unknown severity '{}'. Valid severities: info, low, medium, high, critical",
                s
            )),
        }
    }
}

/// Execution mode forwarded to every runner
///
/// The engine is mode-agnostic; each runner decides for itself whether
/// `fix` means rewriting files or falling back to check behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Resolve the plan but ask runners to inspect nothing
    NoOp,
    /// Report issues without touching files (default)
    #[default]
    Check,
    /// Allow runners to rewrite files where they support it
    Fix,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::NoOp => write!(f, "no-op"),
            ExecutionMode::Check => write!(f, "check"),
            ExecutionMode::Fix => write!(f, "fix"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no-op" | "noop" => Ok(ExecutionMode::NoOp),
            "check" => Ok(ExecutionMode::Check),
            "fix" => Ok(ExecutionMode::Fix),
            _ => Err(anyhow!(
                "Unknown mode '{}'. Valid modes: no-op, check, fix",
                s
            )),
        }
    }
}

/// A single finding produced by a runner
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Issue {
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    /// Category of the runner that produced this issue
    #[serde(default)]
    pub category: String,
    /// Tool-specific rule identifier, when the runner has one
    #[serde(default)]
    pub rule: Option<String>,
}

impl Issue {
    pub fn new(
        category: impl Into<String>,
        severity: Severity,
        file: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line: None,
            severity,
            message: message.into(),
            category: category.into(),
            rule: None,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }
}

/// Outcome of one runner invocation
///
/// Produced once per runner per assessment. The phase executor owns these
/// until they are merged into the report's category map.
#[derive(Debug, Clone)]
pub struct AssessmentResult {
    /// Category of the runner that produced this result
    pub category: String,
    /// Whether the runner completed without a fault
    pub success: bool,
    /// Set when the deadline expired before the runner could start
    pub skipped: bool,
    /// Execution time in milliseconds (stamped by the executor)
    pub duration_ms: u64,
    /// Issues produced by the runner
    pub issues: Vec<Issue>,
    /// Error message if the runner failed
    pub error: Option<String>,
}

impl AssessmentResult {
    /// Create a successful result
    pub fn success(category: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self {
            category: category.into(),
            success: true,
            skipped: false,
            duration_ms: 0,
            issues,
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(category: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            success: false,
            skipped: false,
            duration_ms: 0,
            issues: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Create a result for a runner that was abandoned before it started
    pub fn not_run(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            success: false,
            skipped: true,
            duration_ms: 0,
            issues: Vec::new(),
            error: Some("not run: assessment deadline exceeded".to_string()),
        }
    }
}

/// Per-category view of an assessment result, as stored in the report
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<AssessmentResult> for CategoryResult {
    fn from(result: AssessmentResult) -> Self {
        Self {
            success: result.success,
            skipped: result.skipped,
            duration_ms: result.duration_ms,
            issues: result.issues,
            error: result.error,
        }
    }
}

/// Run metadata attached to every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool: String,
    pub version: String,
    pub target: PathBuf,
    pub total_duration_ms: u64,
    /// Categories that actually executed, in plan order (skipped ones excluded)
    pub commands_run: Vec<String>,
}

/// Aggregated statistics for the run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportSummary {
    /// Bounded health score in [0, 100]; 100 means no issues
    pub health_score: f64,
    pub critical_issues: usize,
    pub total_issues: usize,
    /// Planner's wall-clock estimate for the whole run, in milliseconds
    pub estimated_duration_ms: u64,
    /// Number of phases the planner marked as parallel
    pub parallel_groups: usize,
    pub categories_with_issues: usize,
}

/// One step of the execution plan as recorded in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowPhase {
    /// Member categories in plan order
    pub categories: Vec<String>,
    pub parallel: bool,
    pub estimated_duration_ms: u64,
}

/// Ordered description of the plan the executor followed
///
/// Phase order here reflects the plan, never the completion order of
/// parallel runners.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkflowInfo {
    pub phases: Vec<WorkflowPhase>,
    pub parallel_groups: usize,
    pub total_estimated_duration_ms: u64,
}

/// Final artifact of one assessment run
///
/// Serialization contract: the top-level keys `metadata`, `summary` and
/// `categories` (an object keyed by category name) are depended on by
/// external tooling and must always be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub categories: BTreeMap<String, CategoryResult>,
    pub workflow: WorkflowInfo,
}

impl AssessmentReport {
    /// Iterate over every issue across all categories
    pub fn all_issues(&self) -> impl Iterator<Item = &Issue> {
        self.categories.values().flat_map(|c| c.issues.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_severity_roundtrip() {
        for name in ["info", "low", "medium", "high", "critical"] {
            let severity: Severity = name.parse().expect("parse severity");
            assert_eq!(severity.to_string(), name);
        }
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::High).expect("serialize");
        assert_eq!(json, "\"high\"");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(
            "no-op".parse::<ExecutionMode>().expect("parse"),
            ExecutionMode::NoOp
        );
        assert_eq!(
            "fix".parse::<ExecutionMode>().expect("parse"),
            ExecutionMode::Fix
        );
        assert!("repair".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn test_result_constructors() {
        let ok = AssessmentResult::success("format", vec![]);
        assert!(ok.success && !ok.skipped && ok.error.is_none());

        let failed = AssessmentResult::failure("lint", "tool exited 2");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("tool exited 2"));

        let skipped = AssessmentResult::not_run("security");
        assert!(skipped.skipped && !skipped.success);
    }
}
