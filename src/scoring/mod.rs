//! Health scoring
//!
//! Condenses a run's issues into one bounded score so dashboards and hooks
//! can track a codebase with a single number.
//!
//! # Scoring Formula
//!
//! ```text
//! Health = clamp(100 - Σ penalty(issue), 0, 100)
//!
//! Penalties per issue:
//!   Critical: 8.0
//!   High:     4.0
//!   Medium:   1.0
//!   Low:      0.2
//!   Info:     0.05
//! ```
//!
//! The formula is monotonic: adding an issue, or raising the severity of an
//! existing one, can only lower the score. A run with zero issues always
//! scores 100.

use crate::models::{Issue, Severity};

const MAX_SCORE: f64 = 100.0;
const MIN_SCORE: f64 = 0.0;

/// Penalty contributed by one issue of the given severity
pub fn severity_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 8.0,
        Severity::High => 4.0,
        Severity::Medium => 1.0,
        Severity::Low => 0.2,
        Severity::Info => 0.05,
    }
}

/// Compute the bounded health score for a set of issues
pub fn health_score<'a, I>(issues: I) -> f64
where
    I: IntoIterator<Item = &'a Issue>,
{
    let penalty: f64 = issues
        .into_iter()
        .map(|issue| severity_penalty(issue.severity))
        .sum();
    (MAX_SCORE - penalty).clamp(MIN_SCORE, MAX_SCORE)
}
