//! Per-run and per-project configuration
//!
//! `AssessmentConfig` is the immutable per-run configuration handed to the
//! engine and forwarded to every runner. Project defaults are loaded from an
//! optional `assayer.toml` at the target root:
//!
//! ```toml
//! # assayer.toml
//!
//! [defaults]
//! fail_on = "high"
//! workers = 4
//! priority = "security=1,lint=2"
//! categories = ["format", "lint"]
//! timeout_secs = 120
//! exclude = ["generated/", "vendor/"]
//! ```
//!
//! A malformed config file is reported with a warning and ignored; CLI flags
//! always win over file defaults.

use crate::models::{ExecutionMode, Severity};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Config file name looked up in the target root
pub const PROJECT_CONFIG_FILE: &str = "assayer.toml";

/// Default overall deadline for one assessment run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Immutable per-run configuration
///
/// Constructed once per invocation and never mutated during a run.
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    /// Forwarded to runners; the engine itself never mutates files
    pub mode: ExecutionMode,
    pub verbose: bool,
    /// Overall deadline for the whole run
    pub timeout: Duration,
    /// File patterns passed through to runners untouched
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Priority string of the form `category=weight[,category=weight]*`
    pub priority: String,
    /// Severity at or above which the gate fails the run
    pub fail_on: Severity,
    /// Explicit worker count; 0 means derive from `workers_percent`
    pub workers: usize,
    /// Percentage of available processors, used when `workers` is 0
    pub workers_percent: u32,
    /// Explicit subset of categories to run; `None` means all available
    pub categories: Option<Vec<String>>,
    /// Category-specific pass-through options, keyed by category
    pub category_options: HashMap<String, serde_json::Value>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Check,
            verbose: false,
            timeout: DEFAULT_TIMEOUT,
            include: Vec::new(),
            exclude: Vec::new(),
            priority: "security=1".to_string(),
            fail_on: Severity::High,
            workers: 0,
            workers_percent: 100,
            categories: None,
            category_options: HashMap::new(),
        }
    }
}

impl AssessmentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_fail_on(mut self, severity: Severity) -> Self {
        self.fail_on = severity;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Get a typed pass-through option for a category
    pub fn category_option<T: serde::de::DeserializeOwned>(&self, category: &str) -> Option<T> {
        self.category_options
            .get(category)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Fill in values from project defaults, keeping anything already set
    /// away from its built-in default untouched by the caller's choice.
    ///
    /// Severity and mode names in the file are validated here so a typo is a
    /// configuration error surfaced before any execution begins.
    pub fn apply_defaults(&mut self, defaults: &ProjectDefaults) -> Result<()> {
        if let Some(fail_on) = &defaults.fail_on {
            self.fail_on = fail_on
                .parse()
                .with_context(|| format!("invalid fail_on in {}", PROJECT_CONFIG_FILE))?;
        }
        if let Some(mode) = &defaults.mode {
            self.mode = mode
                .parse()
                .with_context(|| format!("invalid mode in {}", PROJECT_CONFIG_FILE))?;
        }
        if let Some(workers) = defaults.workers {
            self.workers = workers;
        }
        if let Some(percent) = defaults.workers_percent {
            self.workers_percent = percent;
        }
        if let Some(priority) = &defaults.priority {
            self.priority = priority.clone();
        }
        if let Some(categories) = &defaults.categories {
            self.categories = Some(categories.clone());
        }
        if let Some(secs) = defaults.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(exclude) = &defaults.exclude {
            self.exclude = exclude.clone();
        }
        Ok(())
    }
}

/// `[defaults]` table of `assayer.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDefaults {
    pub fail_on: Option<String>,
    pub mode: Option<String>,
    pub workers: Option<usize>,
    pub workers_percent: Option<u32>,
    pub priority: Option<String>,
    pub categories: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    defaults: ProjectDefaults,
}

/// Load project defaults from `assayer.toml` in the target root
///
/// Missing file yields empty defaults. A file that fails to parse is
/// reported with a warning and treated as absent rather than aborting the
/// run over a config typo.
pub fn load_project_defaults(root: &Path) -> ProjectDefaults {
    let path = root.join(PROJECT_CONFIG_FILE);
    if !path.is_file() {
        return ProjectDefaults::default();
    }

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return ProjectDefaults::default();
        }
    };

    match toml::from_str::<ProjectFile>(&raw) {
        Ok(file) => {
            debug!("Loaded project defaults from {}", path.display());
            file.defaults
        }
        Err(e) => {
            warn!("Ignoring malformed {}: {}", path.display(), e);
            ProjectDefaults::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AssessmentConfig::default();
        assert_eq!(config.mode, ExecutionMode::Check);
        assert_eq!(config.fail_on, Severity::High);
        assert_eq!(config.workers, 0);
        assert_eq!(config.workers_percent, 100);
        assert!(config.categories.is_none());
    }

    #[test]
    fn test_apply_defaults_overrides() {
        let defaults = ProjectDefaults {
            fail_on: Some("medium".to_string()),
            workers: Some(2),
            priority: Some("lint=1".to_string()),
            timeout_secs: Some(60),
            ..Default::default()
        };

        let mut config = AssessmentConfig::default();
        config.apply_defaults(&defaults).expect("apply defaults");

        assert_eq!(config.fail_on, Severity::Medium);
        assert_eq!(config.workers, 2);
        assert_eq!(config.priority, "lint=1");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_apply_defaults_bad_severity_is_error() {
        let defaults = ProjectDefaults {
            fail_on: Some("catastrophic".to_string()),
            ..Default::default()
        };
        let mut config = AssessmentConfig::default();
        assert!(config.apply_defaults(&defaults).is_err());
    }

    #[test]
    fn test_load_project_defaults_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let defaults = load_project_defaults(dir.path());
        assert!(defaults.fail_on.is_none());
    }

    #[test]
    fn test_load_project_defaults_from_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "[defaults]\nfail_on = \"low\"\nworkers = 3\ncategories = [\"schema\"]\n",
        )
        .expect("write config");

        let defaults = load_project_defaults(dir.path());
        assert_eq!(defaults.fail_on.as_deref(), Some("low"));
        assert_eq!(defaults.workers, Some(3));
        assert_eq!(defaults.categories, Some(vec!["schema".to_string()]));
    }

    #[test]
    fn test_load_project_defaults_malformed_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "not [valid toml")
            .expect("write config");

        let defaults = load_project_defaults(dir.path());
        assert!(defaults.workers.is_none());
    }
}
