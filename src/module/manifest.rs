//! Module manifest (axel.json) parsing.
//!
//! A manifest declares registrations and aliases up front:
//!
//! ```json
//! {
//!   "modules": { "jquery": "vendor/jquery.js", "lazy": null },
//!   "aliases": [["$", "jquery"]]
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::registry::IdentityRegistry;
use super::resolver::ModuleResolver;
use crate::error::{ManifestError, ModuleError};

/// File name looked up by [`Manifest::find`].
pub const MANIFEST_FILE: &str = "axel.json";

/// Declared registrations and aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Module name -> load path, in declaration order (`null` for lazy)
    #[serde(default, deserialize_with = "first_declaration_wins")]
    pub modules: IndexMap<String, Option<String>>,
    /// Pairs of names denoting the same module
    #[serde(default)]
    pub aliases: Vec<(String, String)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest JSON.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        let manifest = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            modules = manifest.modules.len(),
            aliases = manifest.aliases.len(),
            "loaded module manifest"
        );
        Ok(manifest)
    }

    /// Find the axel.json in the given directory or parent directories.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let manifest_file = current.join(MANIFEST_FILE);
            if manifest_file.is_file() {
                return Some(manifest_file);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Declare a module (builder style).
    ///
    /// Redeclaring a module only fills a path that was still missing.
    pub fn module(mut self, name: &str, path: Option<&str>) -> Self {
        declare(&mut self.modules, name.to_string(), path.map(str::to_string));
        self
    }

    /// Declare an alias (builder style).
    pub fn alias(mut self, a: &str, b: &str) -> Self {
        self.aliases.push((a.to_string(), b.to_string()));
        self
    }

    /// Apply registrations in order, then aliases in order.
    ///
    /// Stops at the first rejected alias; everything applied before it stays.
    pub fn apply<L>(&self, resolver: &mut ModuleResolver<L>) -> Result<(), ModuleError> {
        self.apply_to(resolver.registry_mut())
    }

    pub(crate) fn apply_to(&self, registry: &mut IdentityRegistry) -> Result<(), ModuleError> {
        for (name, path) in &self.modules {
            registry.register(name, path.as_deref());
        }
        for (a, b) in &self.aliases {
            registry.union(a, b)?;
        }
        Ok(())
    }

    /// Serialize back to pretty JSON.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Record a module declaration with the same precedence as registration:
/// the first path declared for a name is kept.
fn declare(modules: &mut IndexMap<String, Option<String>>, name: String, path: Option<String>) {
    let slot = modules.entry(name).or_insert(None);
    if slot.is_none() {
        *slot = path;
    }
}

// serde's IndexMap deserializer keeps the last value of a repeated key.
fn first_declaration_wins<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ModulesVisitor;

    impl<'de> Visitor<'de> for ModulesVisitor {
        type Value = IndexMap<String, Option<String>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of module names to paths")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut modules = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, path)) = access.next_entry::<String, Option<String>>()? {
                declare(&mut modules, name, path);
            }
            Ok(modules)
        }
    }

    deserializer.deserialize_map(ModulesVisitor)
}
