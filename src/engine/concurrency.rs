//! Concurrency resolution
//!
//! Turns user-supplied concurrency intent (absolute count or percentage of
//! available processors) into the worker bound for parallel phases.
//! Sequential phases always use exactly one worker regardless of this value.

use tracing::debug;

/// Fallback when the processor count cannot be queried
const FALLBACK_CPUS: usize = 4;

/// Resolve the parallel-phase worker bound
///
/// An explicit `workers` count > 0 is used verbatim. Otherwise `percent`
/// (clamped to 1..=100) of the available logical processors is taken,
/// rounding down, with a floor of one worker.
pub fn resolve_worker_count(workers: usize, percent: u32) -> usize {
    if workers > 0 {
        return workers;
    }

    let cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(FALLBACK_CPUS);
    let percent = percent.clamp(1, 100) as usize;
    let resolved = (cpus * percent / 100).max(1);
    debug!(
        "Resolved concurrency: {} workers ({}% of {} processors)",
        resolved, percent, cpus
    );
    resolved
}
