//! Module name resolution and load orchestration.

use tracing::debug;

use super::loader::{LoadPlan, LoadRequest, ScriptLoader};
use super::manifest::Manifest;
use super::registry::{IdentityRegistry, Registration};
use crate::error::ModuleError;

/// Resolves module names through an identity registry and hands resolved
/// paths to an injected script loader.
pub struct ModuleResolver<L> {
    /// Classes of equivalent names and their registrations
    registry: IdentityRegistry,
    /// External loader receiving deduplicated path lists
    loader: L,
}

impl<L> ModuleResolver<L> {
    /// Create an empty resolver around a loader.
    pub fn new(loader: L) -> Self {
        ModuleResolver {
            registry: IdentityRegistry::new(),
            loader,
        }
    }

    /// Create a resolver pre-populated from a manifest.
    pub fn from_manifest(manifest: &Manifest, loader: L) -> Result<Self, ModuleError> {
        let mut resolver = Self::new(loader);
        manifest.apply(&mut resolver)?;
        Ok(resolver)
    }

    /// Register a module name, with a path or lazily (`None`).
    ///
    /// Never fails: registering a name whose class is already registered
    /// only fills in a missing path.
    pub fn register<'a>(&mut self, name: &str, path: impl Into<Option<&'a str>>) {
        self.registry.register(name, path.into());
    }

    /// Register a name without a path yet.
    pub fn register_lazy(&mut self, name: &str) {
        self.registry.register(name, None);
    }

    /// Declare `a` and `b` as names of the same module.
    ///
    /// Argument order is irrelevant. On error no merge has happened.
    pub fn alias(&mut self, a: &str, b: &str) -> Result<(), ModuleError> {
        self.registry.union(a, b)
    }

    /// The canonical name `name` denotes, or `None` if its class has no
    /// registration.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.registry.lookup(name).map(Registration::canonical)
    }

    /// The load path `name` resolves to, if registered with one.
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.registry.lookup(name).and_then(Registration::path)
    }

    /// Every name known to denote the same module as `name`.
    pub fn members(&self, name: &str) -> Vec<&str> {
        self.registry.members(name)
    }

    /// Compute what `load` would dispatch, without dispatching.
    pub fn plan(&self, request: impl Into<LoadRequest>) -> Result<LoadPlan, ModuleError> {
        LoadPlan::build(&self.registry, &request.into())
    }

    /// Discard all names, aliases and registrations. The loader is kept.
    pub fn reset(&mut self) {
        self.registry.reset();
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut IdentityRegistry {
        &mut self.registry
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: ScriptLoader> ModuleResolver<L> {
    /// Resolve one or more names and load their paths.
    ///
    /// Either every name resolves to a registered path and the loader is
    /// called exactly once with the deduplicated list, or nothing is loaded.
    pub fn load(&self, request: impl Into<LoadRequest>) -> Result<(), ModuleError> {
        let plan = self.plan(request)?;
        debug!(paths = plan.len(), "dispatching module load");
        self.loader.load(plan.paths());
        Ok(())
    }
}
