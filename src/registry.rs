//! Runner registry
//!
//! Maps a category identifier to the runner implementation responsible for
//! it. The registry is an explicit, injectable object owned by whoever
//! constructs the engine; tests build their own registries (or snapshot and
//! restore a shared one) instead of mutating process globals.
//!
//! Registration happens at startup and in test setup, never on the hot path,
//! so a plain mutex-guarded map is all the synchronization needed.

use crate::runners::Runner;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Opaque copy of a registry's entries, used to restore it later.
///
/// Handles are cheap: entries are `Arc`s, so a snapshot shares the runner
/// instances with the live registry.
#[derive(Clone, Default)]
pub struct RegistrySnapshot {
    entries: HashMap<String, Arc<dyn Runner>>,
}

/// Category → runner table
#[derive(Default)]
pub struct RunnerRegistry {
    runners: Mutex<HashMap<String, Arc<dyn Runner>>>,
}

impl RunnerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runner for a category; the last registration wins
    pub fn register(&self, category: impl Into<String>, runner: Arc<dyn Runner>) {
        let category = category.into();
        debug!("Registering runner for category: {}", category);
        self.lock().insert(category, runner);
    }

    /// Look up the runner for a category
    ///
    /// Returns `None` for unregistered categories; the engine treats that
    /// as "category unavailable" and excludes it from the plan.
    pub fn get(&self, category: &str) -> Option<Arc<dyn Runner>> {
        self.lock().get(category).cloned()
    }

    /// All registered runners, sorted by category name for a stable order
    pub fn all(&self) -> Vec<Arc<dyn Runner>> {
        let guard = self.lock();
        let mut entries: Vec<_> = guard.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, r)| Arc::clone(r)).collect()
    }

    /// All registered category names, sorted
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Capture the current entry set
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            entries: self.lock().clone(),
        }
    }

    /// Replace the entry set with a previously captured snapshot
    ///
    /// After this call the registry holds exactly the snapshot's entries,
    /// sharing the same runner instances.
    pub fn restore(&self, snapshot: RegistrySnapshot) {
        *self.lock() = snapshot.entries;
    }

    /// Clear all entries; intended for test setup/teardown
    pub fn reset_for_testing(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<dyn Runner>>> {
        // A panicked registration can't leave the map half-written, so a
        // poisoned lock is still safe to reuse.
        self.runners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssessmentConfig;
    use crate::models::AssessmentResult;
    use crate::runners::RunContext;
    use anyhow::Result;
    use std::path::Path;

    struct NullRunner {
        category: &'static str,
    }

    impl Runner for NullRunner {
        fn category(&self) -> &'static str {
            self.category
        }

        fn assess(
            &self,
            _ctx: &RunContext,
            _target: &Path,
            _config: &AssessmentConfig,
        ) -> Result<AssessmentResult> {
            Ok(AssessmentResult::success(self.category, vec![]))
        }
    }

    fn runner(category: &'static str) -> Arc<dyn Runner> {
        Arc::new(NullRunner { category })
    }

    #[test]
    fn test_register_and_get() {
        let registry = RunnerRegistry::new();
        registry.register("format", runner("format"));

        assert!(registry.get("format").is_some());
        assert!(registry.get("lint").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = RunnerRegistry::new();
        let first = runner("format");
        let second = runner("format");

        registry.register("format", Arc::clone(&first));
        registry.register("format", Arc::clone(&second));

        let current = registry.get("format").expect("registered");
        assert!(Arc::ptr_eq(&current, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_categories_sorted() {
        let registry = RunnerRegistry::new();
        registry.register("schema", runner("schema"));
        registry.register("format", runner("format"));
        registry.register("lint", runner("lint"));

        assert_eq!(registry.categories(), vec!["format", "lint", "schema"]);
    }

    #[test]
    fn test_snapshot_restore_identity() {
        let registry = RunnerRegistry::new();
        let format = runner("format");
        let schema = runner("schema");
        registry.register("format", Arc::clone(&format));
        registry.register("schema", Arc::clone(&schema));

        let snapshot = registry.snapshot();

        registry.reset_for_testing();
        assert!(registry.is_empty());
        registry.register("lint", runner("lint"));

        registry.reset_for_testing();
        registry.restore(snapshot);

        assert_eq!(registry.categories(), vec!["format", "schema"]);
        let restored = registry.get("format").expect("restored");
        assert!(Arc::ptr_eq(&restored, &format));
        let restored = registry.get("schema").expect("restored");
        assert!(Arc::ptr_eq(&restored, &schema));
    }
}
