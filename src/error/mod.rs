//! Error types for registry mutation, loading, and manifest handling.

use thiserror::Error;

/// Errors raised by `alias` and `load`.
///
/// Resolution misses are not errors: `resolve` returns `None` for names
/// that currently denote no registered module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// Two classes that each carry a registration were asked to merge.
    #[error("Cannot alias '{incoming}' to '{existing}': both modules are already registered")]
    AlreadyRegistered { existing: String, incoming: String },

    /// A requested name resolves to no registration, or to one without a path.
    #[error("Module '{0}' is not registered")]
    NotRegistered(String),
}

impl ModuleError {
    pub fn already_registered(existing: impl Into<String>, incoming: impl Into<String>) -> Self {
        Self::AlreadyRegistered {
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }

    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered(name.into())
    }

    /// The name the error is about: the incoming canonical name for a
    /// rejected merge, the original requested name for a failed load.
    pub fn name(&self) -> &str {
        match self {
            Self::AlreadyRegistered { incoming, .. } => incoming,
            Self::NotRegistered(name) => name,
        }
    }
}

/// Errors raised while reading or applying a module manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Module(#[from] ModuleError),
}

/// A unified error type for callers mixing manifests with direct registry calls.
#[derive(Debug, Error)]
pub enum AxelError {
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}
