//! # Modvis Package Access Engine
//!
//! Package-level visibility rules for module loading.
//!
//! ## Features
//!
//! - **Packages** as bounded regions of the module path space, nested to any depth
//! - **Visibility surfaces** per package: main file, public, protected and external
//! - **Pattern packages** (exact, regex, predicate or any-of locations)
//!   materialized lazily as matching paths are observed
//! - **Inheritance** of selected settings from parent to child packages
//! - **Path cache** and depth-indexed ancestor search for fast resolution
//! - **Call stack** tracking so nested loads are checked against the right caller
//!
//! ## Example
//!
//! ```rust
//! use modvis_access::{DenialReason, Engine, MemoryLoader, PackageSpec};
//!
//! let loader = MemoryLoader::new()
//!     .with_value("lib/internal", "secret")
//!     .with_module("app/main", |engine| engine.load("lib/internal"));
//!
//! let engine = Engine::new(loader);
//! engine
//!     .init([
//!         PackageSpec::new("app").main("main"),
//!         PackageSpec::new("lib").public("api"),
//!     ])
//!     .unwrap();
//!
//! let err = engine.load("app").unwrap_err();
//! assert_eq!(err.denial_reason(), Some(DenialReason::CrossPackage));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod package;
pub mod path;
pub mod pattern;
pub mod policy;
pub mod resolver;

// Re-export commonly used types
pub use config::{Options, PackageDefaults};
pub use engine::{Engine, ROOT_CONTEXT};
pub use error::{AccessError, Result};
pub use loader::{MemoryLoader, ModuleLoader};
pub use package::{InheritFlags, Inheritable, Package, PackageSpec, Surface};
pub use pattern::Pattern;
pub use policy::{Access, AccessPolicy, Decision, DenialReason};
pub use resolver::{CacheStats, Resolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
