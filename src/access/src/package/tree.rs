//! Authoritative store of materialized packages and top-level templates

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use super::{Package, Template};

/// Materialized packages keyed by canonical location, plus the
/// top-level templates that have not been matched yet
///
/// Append-only: packages are never removed or replaced.
#[derive(Default)]
pub struct PackageTree {
    /// location -> package
    packages: DashMap<String, Arc<Package>>,
    /// Top-level pattern packages
    templates: RwLock<Vec<Arc<Template>>>,
}

impl PackageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a materialized package by exact location
    pub fn get(&self, location: &str) -> Option<Arc<Package>> {
        self.packages.get(location).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, location: &str) -> bool {
        self.packages.contains_key(location)
    }

    /// Stores a package unless its location is already taken
    ///
    /// Returns the stored package and whether it was newly inserted.
    pub fn insert(&self, package: Package) -> (Arc<Package>, bool) {
        let mut inserted = false;
        let stored = self
            .packages
            .entry(package.location().to_string())
            .or_insert_with(|| {
                inserted = true;
                Arc::new(package)
            })
            .value()
            .clone();

        (stored, inserted)
    }

    /// Number of materialized packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Replaces the pending top-level templates
    pub fn set_templates(&self, templates: Vec<Arc<Template>>) {
        *self.templates.write() = templates;
    }

    /// Snapshot of the pending top-level templates
    pub fn templates(&self) -> Vec<Arc<Template>> {
        self.templates.read().clone()
    }
}
