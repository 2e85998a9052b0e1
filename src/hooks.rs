//! Hook-mode translation layer
//!
//! Maps a git hook identifier to the category subset and fail-on threshold
//! that hook should enforce, expressed as a regular `AssessmentConfig`
//! before delegating to the engine. The engine itself knows nothing about
//! hooks.

use crate::config::AssessmentConfig;
use crate::models::Severity;
use anyhow::{bail, Result};
use std::time::Duration;

/// Build the assessment configuration for a hook identifier
///
/// - `pre-commit`: fast local checks (format, lint, schema), fail on high
/// - `pre-push`: everything, security first, fail on medium
pub fn config_for_hook(hook: &str) -> Result<AssessmentConfig> {
    let mut config = AssessmentConfig::default();
    match hook {
        "pre-commit" => {
            config.categories = Some(vec![
                "format".to_string(),
                "lint".to_string(),
                "schema".to_string(),
            ]);
            config.priority = "lint=1,format=2,schema=3".to_string();
            config.fail_on = Severity::High;
            config.timeout = Duration::from_secs(120);
        }
        "pre-push" => {
            config.priority = "security=1,lint=2,format=3,schema=4".to_string();
            config.fail_on = Severity::Medium;
            config.timeout = Duration::from_secs(300);
        }
        other => bail!(
            "unknown hook '{}'. Supported hooks: pre-commit, pre-push",
            other
        ),
    }
    Ok(config)
}
