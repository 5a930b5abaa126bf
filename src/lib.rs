//! Axel: a client-side module name resolver.
//!
//! Names are declared with [`ModuleResolver::register`], unified with
//! [`ModuleResolver::alias`], resolved to the canonical registered name with
//! [`ModuleResolver::resolve`], and loaded through an injected
//! [`ScriptLoader`] with [`ModuleResolver::load`].
//!
//! ```
//! use axel::{ModuleResolver, RecordingLoader};
//!
//! let loader = RecordingLoader::new();
//! let mut axel = ModuleResolver::new(loader.clone());
//!
//! axel.register("jquery", "vendor/jquery.js");
//! axel.alias("$", "jquery").unwrap();
//!
//! assert_eq!(axel.resolve("$"), Some("jquery"));
//! axel.load(["$", "jquery"]).unwrap();
//! assert_eq!(loader.loaded(), vec!["vendor/jquery.js".to_string()]);
//! ```

pub mod error;
pub mod module;

pub use error::{AxelError, ManifestError, ModuleError};
pub use module::{
    IdentityRegistry, LoadPlan, LoadRequest, Manifest, ModuleResolver, RecordingLoader,
    Registration, ScriptLoader, SharedResolver,
};
