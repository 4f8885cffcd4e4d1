//! Process-wide model module cache
//!
//! Model modules are loaded once per process and reused across analysis
//! runs. The cache is an explicit ownership object so independent module
//! groups (parallel test runs, concurrent analyses) can share or isolate
//! model sets as they choose; [`ModelModuleCache::global`] is merely the
//! conventional shared instance.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::features::ir::domain::CanonicalModule;

#[derive(Debug, Default)]
pub struct ModelModuleCache {
    modules: RwLock<FxHashMap<String, Arc<CanonicalModule>>>,
}

static GLOBAL: Lazy<ModelModuleCache> = Lazy::new(ModelModuleCache::new);

impl ModelModuleCache {
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(FxHashMap::default()),
        }
    }

    /// The conventional process-wide instance
    pub fn global() -> &'static ModelModuleCache {
        &GLOBAL
    }

    /// Insert a model module under its own name, returning the shared handle
    pub fn insert(&self, module: CanonicalModule) -> Arc<CanonicalModule> {
        let handle = Arc::new(module);
        self.modules
            .write()
            .insert(handle.name.clone(), Arc::clone(&handle));
        debug!(module = %handle.name, "model module cached");
        handle
    }

    pub fn get(&self, name: &str) -> Option<Arc<CanonicalModule>> {
        self.modules.read().get(name).cloned()
    }

    /// Fetch a cached model module or build and cache it
    pub fn get_or_insert_with(
        &self,
        name: &str,
        build: impl FnOnce() -> CanonicalModule,
    ) -> Arc<CanonicalModule> {
        if let Some(cached) = self.get(name) {
            return cached;
        }
        let mut modules = self.modules.write();
        // A racing writer may have beaten us between the read and the write
        if let Some(cached) = modules.get(name) {
            return Arc::clone(cached);
        }
        let handle = Arc::new(build());
        modules.insert(name.to_string(), Arc::clone(&handle));
        debug!(module = %name, "model module cached");
        handle
    }

    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.modules.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str) -> CanonicalModule {
        CanonicalModule {
            name: name.to_string(),
            functions: vec![],
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ModelModuleCache::new();
        cache.insert(module("models.core"));
        assert!(cache.get("models.core").is_some());
        assert!(cache.get("models.other").is_none());
    }

    #[test]
    fn test_get_or_insert_builds_once() {
        let cache = ModelModuleCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            cache.get_or_insert_with("models.core", || {
                builds += 1;
                module("models.core")
            });
        }
        assert_eq!(builds, 1);
    }

    #[test]
    fn test_independent_caches_do_not_share() {
        let a = ModelModuleCache::new();
        let b = ModelModuleCache::new();
        a.insert(module("models.core"));
        assert!(b.get("models.core").is_none());
    }
}
