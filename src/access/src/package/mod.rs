//! Packages: specs, normalized settings, pending templates and
//! materialized packages
//!
//! A spec whose location is an exact string becomes a [`Package`] as soon
//! as it is normalized. Any other location produces a [`Template`] that
//! stays pending until a resolved path matches it; each match is copied
//! into its own [`Package`].

mod spec;
mod tree;

use std::sync::Arc;

use crate::path;
use crate::pattern::{self, Pattern};

pub use spec::{InheritFlags, Inheritable, PackageSpec, Surface};
pub use tree::PackageTree;

/// Nested specs carried by a normalized package, not yet normalized themselves
#[derive(Debug, Clone, Default)]
pub(crate) struct NestedSpecs {
    pub(crate) specs: Vec<PackageSpec>,
    /// Inherited lists are expanded lazily, even for exact locations
    pub(crate) deferred: bool,
}

/// Normalized package settings (every field resolved)
#[derive(Debug, Clone)]
pub struct Settings {
    pub main: String,
    pub public: Option<Pattern>,
    pub external: Option<Pattern>,
    pub protected: Option<Pattern>,
    pub inheritable: InheritFlags,
    pub(crate) nested: NestedSpecs,
}

impl Settings {
    /// Pattern for one visibility surface
    pub fn surface(&self, surface: Surface) -> Option<&Pattern> {
        match surface {
            Surface::Public => self.public.as_ref(),
            Surface::External => self.external.as_ref(),
            Surface::Protected => self.protected.as_ref(),
        }
    }
}

/// Pending package whose location is a pattern
///
/// The location is matched against the path remainder below the parent
/// package (or the whole path for top-level templates).
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) location: Pattern,
    pub(crate) settings: Settings,
}

impl Template {
    pub fn location(&self) -> &Pattern {
        &self.location
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Materialized package with a canonical location
#[derive(Debug)]
pub struct Package {
    location: String,
    main_path: String,
    parent: Option<String>,
    settings: Settings,
    nested: Vec<Arc<Template>>,
}

impl Package {
    pub(crate) fn new(
        location: String,
        parent: Option<String>,
        settings: Settings,
        nested: Vec<Arc<Template>>,
    ) -> Self {
        let main_path = path::join(&location, &settings.main);

        Self {
            location,
            main_path,
            parent,
            settings,
            nested,
        }
    }

    /// Canonical location
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Main file path (location joined with the main file name)
    pub fn main_path(&self) -> &str {
        &self.main_path
    }

    /// Direct parent location, `None` for top-level packages
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Nested templates still waiting for a matching path
    pub fn pending(&self) -> &[Arc<Template>] {
        &self.nested
    }

    /// Whether `path` designates this package's main file
    pub fn is_main_file(&self, path: &str) -> bool {
        path == self.location || path == self.main_path
    }

    /// Whether `path`, taken relative to this package, matches a surface
    pub fn exposes(&self, surface: Surface, path: &str) -> bool {
        pattern::matches(path::relative(path, &self.location), self.settings.surface(surface))
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Package {}
