//! Execution planning
//!
//! Turns the candidate runner set into a deterministic, ordered list of
//! phases. Runners are sorted by `(priority weight, category name)`, then
//! adjacent parallel-safe runners are greedily grouped into parallel phases;
//! everything else runs as its own sequential phase. Phase order is the only
//! ordering contract the executor and the report rely on.

use crate::runners::Runner;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Whether a phase runs its members one at a time or concurrently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Sequential,
    Parallel,
}

/// One step of the execution plan
pub struct PlannedPhase {
    pub kind: PhaseKind,
    /// Members in plan order; exactly one for sequential phases
    pub runners: Vec<Arc<dyn Runner>>,
    /// Wall-clock estimate: the member's own estimate for a sequential
    /// phase, the maximum member estimate for a parallel phase
    pub estimated: Duration,
}

impl PlannedPhase {
    pub fn is_parallel(&self) -> bool {
        self.kind == PhaseKind::Parallel
    }

    /// Member categories in plan order
    pub fn categories(&self) -> Vec<String> {
        self.runners
            .iter()
            .map(|r| r.category().to_string())
            .collect()
    }
}

/// Parse a priority string of the form `category=weight[,category=weight]*`
///
/// Lower weights run earlier. Empty entries are tolerated (so trailing
/// commas are fine); anything else malformed is a configuration error.
pub fn parse_priority(priority: &str) -> Result<HashMap<String, i64>> {
    let mut weights = HashMap::new();
    for entry in priority.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (category, weight) = entry.split_once('=').ok_or_else(|| {
            anyhow!(
                "invalid priority entry '{}': expected category=weight",
                entry
            )
        })?;
        let weight: i64 = weight
            .trim()
            .parse()
            .with_context(|| format!("invalid priority weight in '{}'", entry))?;
        // Last occurrence of a category wins, matching registry semantics
        weights.insert(category.trim().to_string(), weight);
    }
    Ok(weights)
}

/// Build the ordered phase list for the candidate runners
///
/// Categories absent from the priority string sort after every explicitly
/// weighted one; ties break by category name, so the plan is reproducible
/// across runs.
pub fn build_plan(
    mut candidates: Vec<Arc<dyn Runner>>,
    priority: &str,
    target: &Path,
) -> Result<Vec<PlannedPhase>> {
    let weights = parse_priority(priority)?;
    let default_weight = weights
        .values()
        .copied()
        .max()
        .map_or(0, |max| max.saturating_add(1));

    candidates.sort_by(|a, b| {
        let wa = weights.get(a.category()).copied().unwrap_or(default_weight);
        let wb = weights.get(b.category()).copied().unwrap_or(default_weight);
        wa.cmp(&wb).then_with(|| a.category().cmp(b.category()))
    });

    let mut phases = Vec::new();
    let mut parallel_run: Vec<Arc<dyn Runner>> = Vec::new();

    for runner in candidates {
        if runner.can_run_in_parallel() {
            parallel_run.push(runner);
        } else {
            flush_parallel_run(&mut phases, &mut parallel_run, target);
            let estimated = runner.estimated_time(target);
            phases.push(PlannedPhase {
                kind: PhaseKind::Sequential,
                runners: vec![runner],
                estimated,
            });
        }
    }
    flush_parallel_run(&mut phases, &mut parallel_run, target);

    debug!(
        "Planned {} phases ({} parallel)",
        phases.len(),
        phases.iter().filter(|p| p.is_parallel()).count()
    );
    Ok(phases)
}

/// Close out a run of adjacent parallel-safe runners
///
/// A single-member run becomes a sequential phase; grouping only pays off
/// with at least two members.
fn flush_parallel_run(
    phases: &mut Vec<PlannedPhase>,
    run: &mut Vec<Arc<dyn Runner>>,
    target: &Path,
) {
    match run.len() {
        0 => {}
        1 => {
            let runner = run.remove(0);
            let estimated = runner.estimated_time(target);
            phases.push(PlannedPhase {
                kind: PhaseKind::Sequential,
                runners: vec![runner],
                estimated,
            });
        }
        _ => {
            let members = std::mem::take(run);
            let estimated = members
                .iter()
                .map(|r| r.estimated_time(target))
                .max()
                .unwrap_or(Duration::ZERO);
            phases.push(PlannedPhase {
                kind: PhaseKind::Parallel,
                runners: members,
                estimated,
            });
        }
    }
}
