//! Module system for Axel.
//!
//! This module provides:
//! - Identity classes over module names (alias unification)
//! - Canonical name resolution
//! - Deduplicated script loading through an injected loader
//! - Manifest (axel.json) parsing
//! - A thread-safe shared resolver

mod loader;
pub mod manifest;
mod registry;
mod resolver;
mod shared;

pub use loader::{LoadPlan, LoadRequest, RecordingLoader, ScriptLoader};
pub use manifest::{Manifest, MANIFEST_FILE};
pub use registry::{IdentityRegistry, Registration};
pub use resolver::ModuleResolver;
pub use shared::SharedResolver;
