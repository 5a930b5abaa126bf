//! Thread-safe resolver handle.
//!
//! Mutations (`register`, `alias`, `reset`) take the write lock; resolution
//! and load planning take the read lock, so readers never observe a class
//! mid-merge. The loader is called after the lock is released.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::loader::{LoadPlan, LoadRequest, ScriptLoader};
use super::manifest::Manifest;
use super::registry::IdentityRegistry;
use crate::error::ModuleError;

/// A cloneable resolver sharing one registry and one loader across threads.
pub struct SharedResolver<L> {
    registry: Arc<RwLock<IdentityRegistry>>,
    loader: Arc<L>,
}

impl<L> Clone for SharedResolver<L> {
    fn clone(&self) -> Self {
        SharedResolver {
            registry: Arc::clone(&self.registry),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<L> SharedResolver<L> {
    pub fn new(loader: L) -> Self {
        SharedResolver {
            registry: Arc::new(RwLock::new(IdentityRegistry::new())),
            loader: Arc::new(loader),
        }
    }

    // Registry operations never leave a node half-written, so a poisoned
    // lock still guards a consistent registry.
    fn read(&self) -> RwLockReadGuard<'_, IdentityRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IdentityRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register<'a>(&self, name: &str, path: impl Into<Option<&'a str>>) {
        self.write().register(name, path.into());
    }

    pub fn alias(&self, a: &str, b: &str) -> Result<(), ModuleError> {
        self.write().union(a, b)
    }

    /// Apply a manifest under a single write lock.
    pub fn apply(&self, manifest: &Manifest) -> Result<(), ModuleError> {
        manifest.apply_to(&mut self.write())
    }

    pub fn resolve(&self, name: &str) -> Option<String> {
        self.read()
            .lookup(name)
            .map(|registration| registration.canonical().to_string())
    }

    pub fn path_of(&self, name: &str) -> Option<String> {
        self.read()
            .lookup(name)
            .and_then(|registration| registration.path().map(str::to_string))
    }

    pub fn members(&self, name: &str) -> Vec<String> {
        self.read()
            .members(name)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn plan(&self, request: impl Into<LoadRequest>) -> Result<LoadPlan, ModuleError> {
        LoadPlan::build(&self.read(), &request.into())
    }

    pub fn reset(&self) {
        self.write().reset();
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: ScriptLoader> SharedResolver<L> {
    /// Resolve and load under a read snapshot, dispatching after the lock
    /// is released.
    pub fn load(&self, request: impl Into<LoadRequest>) -> Result<(), ModuleError> {
        let plan = self.plan(request)?;
        debug!(paths = plan.len(), "dispatching module load");
        self.loader.load(plan.paths());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::RecordingLoader;
    use pretty_assertions::assert_eq;
    use std::sync::{OnceLock, Weak};
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let axel = SharedResolver::new(RecordingLoader::new());
        let other = axel.clone();

        axel.register("o", "f.js");
        other.alias("q", "o").unwrap();

        assert_eq!(axel.resolve("q"), Some("o".to_string()));
        assert_eq!(other.path_of("q"), Some("f.js".to_string()));
        assert_eq!(axel.members("o"), vec!["o".to_string(), "q".to_string()]);
    }

    #[test]
    fn test_concurrent_aliasing() {
        let axel = SharedResolver::new(RecordingLoader::new());
        axel.register("root", "root.js");

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let axel = axel.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let name = format!("w{}-{}", worker, i);
                        axel.alias(&name, "root").unwrap();
                        assert_eq!(axel.resolve(&name).as_deref(), Some("root"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(axel.members("root").len(), 401);
        axel.load(["w0-0", "w7-49", "root"]).unwrap();
        assert_eq!(axel.loader().calls(), vec![vec!["root.js".to_string()]]);
    }

    struct RegisterOnLoad {
        target: OnceLock<Weak<RwLock<IdentityRegistry>>>,
    }

    impl ScriptLoader for RegisterOnLoad {
        fn load(&self, paths: &[String]) {
            let Some(registry) = self.target.get().and_then(Weak::upgrade) else {
                return;
            };
            let mut registry = registry.write().unwrap();
            for path in paths {
                registry.register(&format!("loaded:{}", path), Some(path.as_str()));
            }
        }
    }

    #[test]
    fn test_loader_may_reenter() {
        let axel = SharedResolver::new(RegisterOnLoad {
            target: OnceLock::new(),
        });
        let handle = Arc::downgrade(&axel.registry);
        assert!(axel.loader().target.set(handle).is_ok());

        axel.register("b", "b.js");
        axel.load("b").unwrap();

        assert_eq!(axel.resolve("loaded:b.js"), Some("loaded:b.js".to_string()));
        assert_eq!(axel.path_of("loaded:b.js"), Some("b.js".to_string()));
        assert_eq!(Arc::strong_count(&axel.registry), 1);
    }

    #[test]
    fn test_apply_and_reset() {
        let axel = SharedResolver::new(RecordingLoader::new());
        let manifest = Manifest::new().module("o", Some("f.js")).alias("$", "o");
        axel.apply(&manifest).unwrap();
        assert_eq!(axel.resolve("$"), Some("o".to_string()));

        axel.reset();
        assert_eq!(axel.resolve("$"), None);
        assert!(axel.load("$").is_err());
        assert!(axel.loader().calls().is_empty());
    }
}
