//! Phase execution
//!
//! Runs one planned phase to completion. Sequential phases invoke their
//! single runner inline; parallel phases feed a fixed pool of worker threads
//! from a shared channel, bounded by the resolved concurrency. Every runner
//! invocation is wrapped in a panic boundary so one broken tool cannot take
//! down the phase, and the cancellation token is polled before each start so
//! an expired deadline abandons not-yet-started runners instead of killing
//! in-flight ones.
//!
//! Results come back in plan order regardless of which parallel member
//! finished first.

use crate::config::AssessmentConfig;
use crate::engine::planner::PlannedPhase;
use crate::models::AssessmentResult;
use crate::runners::{RunContext, Runner};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, error, warn};

/// Execute one phase, producing one result per member runner
pub fn execute_phase(
    phase: &PlannedPhase,
    workers: usize,
    ctx: &RunContext,
    target: &Path,
    config: &AssessmentConfig,
) -> Vec<AssessmentResult> {
    if phase.is_parallel() {
        execute_parallel(phase, workers, ctx, target, config)
    } else {
        phase
            .runners
            .iter()
            .map(|runner| {
                if ctx.cancel.is_cancelled() {
                    AssessmentResult::not_run(runner.category())
                } else {
                    run_guarded(runner, ctx, target, config)
                }
            })
            .collect()
    }
}

fn execute_parallel(
    phase: &PlannedPhase,
    workers: usize,
    ctx: &RunContext,
    target: &Path,
    config: &AssessmentConfig,
) -> Vec<AssessmentResult> {
    let member_count = phase.runners.len();
    let worker_count = workers.clamp(1, member_count);
    debug!(
        "Executing parallel phase: {} runners on {} workers",
        member_count, worker_count
    );

    // Work queue: each worker pulls one runner at a time
    let (tx, rx) = crossbeam_channel::unbounded::<(usize, Arc<dyn Runner>)>();
    for (index, runner) in phase.runners.iter().enumerate() {
        let _ = tx.send((index, Arc::clone(runner)));
    }
    drop(tx);

    // The only shared mutable state of the phase; one mutex is plenty since
    // runner invocations dominate cost, not synchronization.
    let results: Mutex<Vec<(usize, AssessmentResult)>> =
        Mutex::new(Vec::with_capacity(member_count));

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let rx = rx.clone();
            let results = &results;
            scope.spawn(move || {
                while let Ok((index, runner)) = rx.recv() {
                    let result = if ctx.cancel.is_cancelled() {
                        AssessmentResult::not_run(runner.category())
                    } else {
                        run_guarded(&runner, ctx, target, config)
                    };
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, result));
                }
            });
        }
    });

    let mut collected = results
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    // Restore plan order; completion order must not leak into the report
    collected.sort_by_key(|(index, _)| *index);
    collected.into_iter().map(|(_, result)| result).collect()
}

/// Invoke one runner behind a panic boundary, with timing
///
/// Any fault — returned error or panic — becomes a failed result for this
/// runner only.
pub fn run_guarded(
    runner: &Arc<dyn Runner>,
    ctx: &RunContext,
    target: &Path,
    config: &AssessmentConfig,
) -> AssessmentResult {
    let category = runner.category();
    let start = Instant::now();
    debug!("Running {} runner", category);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        runner.assess(ctx, target, config)
    }));
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(mut result)) => {
            debug!(
                "Runner {} produced {} issues in {}ms",
                category,
                result.issues.len(),
                duration_ms
            );
            result.duration_ms = duration_ms;
            result
        }
        Ok(Err(e)) => {
            warn!("Runner {} failed: {}", category, e);
            let mut result = AssessmentResult::failure(category, e.to_string());
            result.duration_ms = duration_ms;
            result
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!("Runner {} panicked: {}", category, panic_msg);
            let mut result = AssessmentResult::failure(category, format!("Panic: {}", panic_msg));
            result.duration_ms = duration_ms;
            result
        }
    }
}
