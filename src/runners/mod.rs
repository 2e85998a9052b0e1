//! Category runners
//!
//! A runner is the pluggable implementation of one analysis category. The
//! engine only ever talks to the five-method `Runner` contract below; what a
//! runner does behind it (shelling out to an external tool, walking files,
//! parsing manifests) is its own business.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   AssessmentEngine                      │
//! │  - Resolves candidates from the registry                │
//! │  - Plans priority-ordered phases                        │
//! │  - Executes phases under a worker bound + deadline      │
//! │  - Aggregates results into the report                   │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Runner trait                        │
//! │  - category(): registry/report key                      │
//! │  - assess(ctx, target, config): produce a result        │
//! │  - can_run_in_parallel(): phase-grouping hint           │
//! │  - estimated_time(target): planning estimate            │
//! │  - is_available(): required tooling present             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Built-in runners
//!
//! - `schema` - validates JSON/TOML files parse (pure Rust)
//! - `format` - `cargo fmt --check` via subprocess
//! - `lint` - `cargo clippy` via subprocess, not parallel-safe
//! - `security` - pattern scan for credentials and debug leftovers

mod external;
mod format;
mod lint;
mod schema;
mod security;

pub use external::{run_tool, tool_available, ToolOutput};
pub use format::FormatRunner;
pub use lint::LintRunner;
pub use schema::SchemaRunner;
pub use security::SecurityRunner;

use crate::config::AssessmentConfig;
use crate::engine::cancel::CancelToken;
use crate::models::AssessmentResult;
use crate::registry::RunnerRegistry;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Execution context handed to every runner invocation
///
/// Long-running runners should poll `cancel` between units of work and
/// return early with whatever they have produced so far.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub cancel: CancelToken,
}

impl RunContext {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

/// Capability contract for one analysis category
pub trait Runner: Send + Sync {
    /// Category identifier; registry key and report map key
    fn category(&self) -> &'static str;

    /// Run the assessment and produce a result
    ///
    /// Errors become a failed result for this category only; they never
    /// abort sibling runners or the run.
    fn assess(
        &self,
        ctx: &RunContext,
        target: &Path,
        config: &AssessmentConfig,
    ) -> Result<AssessmentResult>;

    /// Whether this runner may share a parallel phase with others
    ///
    /// Runners that grab exclusive resources (a build lock, the working
    /// tree in fix mode) should return false.
    fn can_run_in_parallel(&self) -> bool {
        true
    }

    /// Rough wall-clock estimate used for planning, not enforcement
    fn estimated_time(&self, _target: &Path) -> Duration {
        Duration::from_secs(5)
    }

    /// Whether the runner's required tooling is present
    fn is_available(&self) -> bool {
        true
    }
}

/// Build a registry with every built-in runner for `target`
///
/// All runners are registered regardless of availability; the planner
/// filters on `is_available()` when candidates are resolved.
pub fn builtin_registry(target: &Path) -> RunnerRegistry {
    let registry = RunnerRegistry::new();
    let format = FormatRunner::new(target);
    let lint = LintRunner::new(target);
    let schema = SchemaRunner::new();
    let security = SecurityRunner::new();

    registry.register(format.category(), Arc::new(format));
    registry.register(lint.category(), Arc::new(lint));
    registry.register(schema.category(), Arc::new(schema));
    registry.register(security.category(), Arc::new(security));
    registry
}
