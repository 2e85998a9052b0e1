//! Severity gate
//!
//! Pure pass/fail decision over a finished report. Kept separate from report
//! generation so the interactive CLI, pre-commit hook, and pre-push hook can
//! apply different thresholds to the same report without re-running the
//! assessment.

use crate::models::{AssessmentReport, Severity};

/// Whether the report contains any issue at or above `threshold`
///
/// Uses the fixed total order `info < low < medium < high < critical`.
/// Side-effect free; calling it twice with the same inputs always yields
/// the same answer.
pub fn should_fail(report: &AssessmentReport, threshold: Severity) -> bool {
    report
        .all_issues()
        .any(|issue| issue.severity >= threshold)
}

/// Highest severity present in the report, if it has any issues
pub fn worst_severity(report: &AssessmentReport) -> Option<Severity> {
    report.all_issues().map(|issue| issue.severity).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CategoryResult, Issue, ReportMetadata, ReportSummary, WorkflowInfo,
    };
    use std::collections::BTreeMap;

    fn report_with(severities: &[Severity]) -> AssessmentReport {
        let issues: Vec<Issue> = severities
            .iter()
            .map(|&s| Issue::new("lint", s, "src/lib.rs", "issue"))
            .collect();
        let mut categories = BTreeMap::new();
        categories.insert(
            "lint".to_string(),
            CategoryResult {
                success: true,
                skipped: false,
                duration_ms: 5,
                issues,
                error: None,
            },
        );
        AssessmentReport {
            metadata: ReportMetadata {
                generated_at: chrono::Utc::now(),
                tool: "assayer".to_string(),
                version: "0.0.0".to_string(),
                target: ".".into(),
                total_duration_ms: 5,
                commands_run: vec!["lint".to_string()],
            },
            summary: ReportSummary::default(),
            categories,
            workflow: WorkflowInfo::default(),
        }
    }

    #[test]
    fn test_fails_at_and_above_threshold() {
        let report = report_with(&[Severity::High]);
        assert!(should_fail(&report, Severity::Low));
        assert!(should_fail(&report, Severity::High));
        assert!(!should_fail(&report, Severity::Critical));
    }

    #[test]
    fn test_clean_report_never_fails() {
        let report = report_with(&[]);
        assert!(!should_fail(&report, Severity::Info));
    }

    #[test]
    fn test_idempotent() {
        let report = report_with(&[Severity::Medium, Severity::Low]);
        let first = should_fail(&report, Severity::Medium);
        let second = should_fail(&report, Severity::Medium);
        assert_eq!(first, second);
    }

    #[test]
    fn test_worst_severity() {
        let report = report_with(&[Severity::Low, Severity::Critical, Severity::Medium]);
        assert_eq!(worst_severity(&report), Some(Severity::Critical));
        assert_eq!(worst_severity(&report_with(&[])), None);
    }
}
