//! Assayer - priority-scheduled code assessment
//!
//! Assayer orchestrates pluggable analysis runners (formatting, linting,
//! security scanning, schema validation) over a codebase. Runners are
//! planned into priority-ordered phases, executed under a concurrency bound
//! and a run-wide deadline with per-runner fault isolation, then aggregated
//! into a severity-gated report.
//!
//! # Example
//!
//! ```no_run
//! use assayer::config::AssessmentConfig;
//! use assayer::engine::AssessmentEngine;
//! use assayer::gate::should_fail;
//! use assayer::models::Severity;
//! use assayer::runners::builtin_registry;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let target = Path::new(".");
//! let engine = AssessmentEngine::new(Arc::new(builtin_registry(target)));
//! let report = engine.run_assessment(target, &AssessmentConfig::default())?;
//! if should_fail(&report, Severity::High) {
//!     std::process::exit(1);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod gate;
pub mod hooks;
pub mod models;
pub mod registry;
pub mod runners;
pub mod scoring;

pub use engine::AssessmentEngine;
pub use gate::should_fail;
pub use models::{AssessmentReport, AssessmentResult, Issue, Severity};
pub use registry::{RegistrySnapshot, RunnerRegistry};
pub use runners::{builtin_registry, RunContext, Runner};
