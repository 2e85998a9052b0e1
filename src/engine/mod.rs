//! Assessment orchestration engine
//!
//! The control plane of an assessment run:
//!
//! 1. Resolve candidate runners from the registry
//! 2. Resolve the concurrency intent into a worker bound
//! 3. Build a priority-ordered phase plan
//! 4. Execute each phase under the run-wide deadline
//! 5. Aggregate results into the report
//!
//! A top-level `Err` means the engine itself could not run (bad target,
//! empty explicit selection, expired deadline on entry). Per-runner faults
//! never surface here; they live inside the report as failed categories.

pub mod cancel;
pub mod concurrency;
pub mod executor;
pub mod planner;

use crate::config::AssessmentConfig;
use crate::models::{
    AssessmentReport, AssessmentResult, CategoryResult, ReportMetadata, ReportSummary, Severity,
    WorkflowInfo, WorkflowPhase,
};
use crate::registry::RunnerRegistry;
use crate::runners::{RunContext, Runner};
use crate::scoring;
use anyhow::{bail, Result};
use cancel::CancelToken;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Orchestrates one assessment run over a registry of runners
pub struct AssessmentEngine {
    registry: Arc<RunnerRegistry>,
}

impl AssessmentEngine {
    pub fn new(registry: Arc<RunnerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RunnerRegistry> {
        &self.registry
    }

    /// Run a full assessment of `target`
    ///
    /// Zero candidates without an explicit selection is a successful empty
    /// run, not an error: "nothing to assess" is not a failure.
    pub fn run_assessment(
        &self,
        target: &Path,
        config: &AssessmentConfig,
    ) -> Result<AssessmentReport> {
        let started = Instant::now();

        if !target.exists() {
            bail!("target path does not exist: {}", target.display());
        }
        if config.timeout.is_zero() {
            bail!("assessment deadline already expired on entry (timeout is zero)");
        }

        let candidates = self.candidate_runners(config)?;
        let workers = concurrency::resolve_worker_count(config.workers, config.workers_percent);
        let plan = planner::build_plan(candidates, &config.priority, target)?;
        info!(
            "Assessing {} with {} phases on up to {} workers ({} mode)",
            target.display(),
            plan.len(),
            workers,
            config.mode
        );

        let ctx = RunContext::new(CancelToken::with_timeout(config.timeout));
        let mut results: Vec<AssessmentResult> = Vec::new();
        for (index, phase) in plan.iter().enumerate() {
            // Phase N+1 never starts before phase N's workers returned;
            // execute_phase blocks until the phase is drained.
            if ctx.cancel.is_cancelled() {
                warn!("Deadline exceeded; abandoning remaining phases");
            }
            info!(
                "Phase {}/{}: [{}]{}",
                index + 1,
                plan.len(),
                phase.categories().join(", "),
                if phase.is_parallel() { " (parallel)" } else { "" }
            );
            results.extend(executor::execute_phase(phase, workers, &ctx, target, config));
        }

        Ok(build_report(target, &plan, results, started.elapsed()))
    }

    /// Resolve candidate runners: selected categories (or all registered),
    /// restricted to available ones
    ///
    /// An explicit non-empty selection that resolves to zero runners is a
    /// configuration error; silently running nothing would hide a typo.
    fn candidate_runners(&self, config: &AssessmentConfig) -> Result<Vec<Arc<dyn Runner>>> {
        match config.categories.as_deref() {
            Some(selection) if !selection.is_empty() => {
                let mut runners = Vec::new();
                for category in selection {
                    match self.registry.get(category) {
                        Some(runner) if runner.is_available() => runners.push(runner),
                        Some(_) => {
                            warn!("Category '{}' is unavailable; excluding it", category)
                        }
                        None => warn!("Category '{}' has no registered runner", category),
                    }
                }
                if runners.is_empty() {
                    bail!(
                        "no available runner for any selected category: {}",
                        selection.join(", ")
                    );
                }
                Ok(runners)
            }
            _ => Ok(self
                .registry
                .all()
                .into_iter()
                .filter(|runner| runner.is_available())
                .collect()),
        }
    }
}

/// Merge per-runner results into the final report
fn build_report(
    target: &Path,
    plan: &[planner::PlannedPhase],
    results: Vec<AssessmentResult>,
    total_duration: Duration,
) -> AssessmentReport {
    // Results arrive in plan order; commands_run keeps that order
    let mut commands_run = Vec::new();
    let mut categories: BTreeMap<String, CategoryResult> = BTreeMap::new();
    for result in results {
        if !result.skipped {
            commands_run.push(result.category.clone());
        }
        categories.insert(result.category.clone(), CategoryResult::from(result));
    }

    let total_issues = categories.values().map(|c| c.issues.len()).sum();
    let critical_issues = categories
        .values()
        .flat_map(|c| c.issues.iter())
        .filter(|issue| issue.severity == Severity::Critical)
        .count();
    let categories_with_issues = categories
        .values()
        .filter(|c| !c.issues.is_empty())
        .count();

    let workflow = workflow_from_plan(plan);
    let health_score = scoring::health_score(categories.values().flat_map(|c| c.issues.iter()));

    let summary = ReportSummary {
        health_score,
        critical_issues,
        total_issues,
        estimated_duration_ms: workflow.total_estimated_duration_ms,
        parallel_groups: workflow.parallel_groups,
        categories_with_issues,
    };

    let metadata = ReportMetadata {
        generated_at: chrono::Utc::now(),
        tool: "assayer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: target.to_path_buf(),
        total_duration_ms: total_duration.as_millis() as u64,
        commands_run,
    };

    AssessmentReport {
        metadata,
        summary,
        categories,
        workflow,
    }
}

/// Describe the plan for the report's workflow section
fn workflow_from_plan(plan: &[planner::PlannedPhase]) -> WorkflowInfo {
    let phases: Vec<WorkflowPhase> = plan
        .iter()
        .map(|phase| WorkflowPhase {
            categories: phase.categories(),
            parallel: phase.is_parallel(),
            estimated_duration_ms: phase.estimated.as_millis() as u64,
        })
        .collect();
    let parallel_groups = phases.iter().filter(|p| p.parallel).count();
    let total_estimated_duration_ms = phases.iter().map(|p| p.estimated_duration_ms).sum();

    WorkflowInfo {
        phases,
        parallel_groups,
        total_estimated_duration_ms,
    }
}
