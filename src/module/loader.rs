//! Script loading: the external loader capability and load planning.
//!
//! This module provides:
//! - The [`ScriptLoader`] seam the embedding application implements
//! - Request normalization (one name or many)
//! - Resolution of requested names to a deduplicated, ordered path list

use std::sync::{Arc, Mutex, PoisonError};

use ahash::RandomState;
use indexmap::IndexSet;
use tracing::warn;

use super::registry::IdentityRegistry;
use crate::error::ModuleError;

/// Performs the actual fetch/execute of script paths.
///
/// Called exactly once per successful load with the ordered, deduplicated
/// path list. Completion and failure reporting belong to the implementor.
pub trait ScriptLoader {
    fn load(&self, paths: &[String]);
}

impl<F> ScriptLoader for F
where
    F: Fn(&[String]),
{
    fn load(&self, paths: &[String]) {
        self(paths)
    }
}

/// A loader that only records what it was asked to load.
///
/// Clones share the same record, so a handle kept outside a resolver sees
/// every dispatch made through it.
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dispatch so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All paths dispatched so far, flattened in dispatch order.
    pub fn loaded(&self) -> Vec<String> {
        self.calls().into_iter().flatten().collect()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ScriptLoader for RecordingLoader {
    fn load(&self, paths: &[String]) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(paths.to_vec());
    }
}

/// The names a caller asked to load, in caller order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadRequest {
    names: Vec<String>,
}

impl LoadRequest {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<&str> for LoadRequest {
    fn from(name: &str) -> Self {
        LoadRequest {
            names: vec![name.to_string()],
        }
    }
}

impl From<String> for LoadRequest {
    fn from(name: String) -> Self {
        LoadRequest { names: vec![name] }
    }
}

impl From<Vec<String>> for LoadRequest {
    fn from(names: Vec<String>) -> Self {
        LoadRequest { names }
    }
}

impl From<Vec<&str>> for LoadRequest {
    fn from(names: Vec<&str>) -> Self {
        names.as_slice().into()
    }
}

impl From<&[&str]> for LoadRequest {
    fn from(names: &[&str]) -> Self {
        LoadRequest {
            names: names.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl From<&[String]> for LoadRequest {
    fn from(names: &[String]) -> Self {
        LoadRequest {
            names: names.to_vec(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for LoadRequest {
    fn from(names: [&str; N]) -> Self {
        names.as_slice().into()
    }
}

/// The ordered, deduplicated paths a load request resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    paths: Vec<String>,
}

impl LoadPlan {
    /// Resolve every requested name and collect its path.
    ///
    /// Fails on the first name whose class has no registration or no path;
    /// the error names the name as requested, not its canonical form. Paths
    /// keep the position of their first occurrence.
    pub fn build(
        registry: &IdentityRegistry,
        request: &LoadRequest,
    ) -> Result<Self, ModuleError> {
        let mut paths: IndexSet<&str, RandomState> = IndexSet::default();

        for name in request.names() {
            let path = registry
                .lookup(name)
                .and_then(|registration| registration.path())
                .ok_or_else(|| {
                    warn!(name = %name, "abandoned load of unregistered module");
                    ModuleError::not_registered(name.as_str())
                })?;
            paths.insert(path);
        }

        Ok(LoadPlan {
            paths: paths.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
