//! Parent index: direct parents and closest-ancestor search
//!
//! Locations are bucketed by depth (segment count). An ancestor always has
//! fewer segments than its descendant, so the closest-ancestor search walks
//! buckets from `depth(path) - 1` downwards and never visits packages that
//! are too deep to qualify.

use std::collections::BTreeMap;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::path;

/// Direct-parent map plus depth-ordered locations
#[derive(Default)]
pub struct ParentIndex {
    /// location -> direct parent location (top-level packages are absent)
    parents: DashMap<String, String>,
    /// depth -> locations with that many segments
    by_depth: RwLock<BTreeMap<usize, Vec<String>>>,
}

impl ParentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a materialized location and its direct parent
    pub fn insert(&self, location: &str, parent: Option<&str>) {
        if let Some(parent) = parent {
            self.parents.insert(location.to_string(), parent.to_string());
        }

        self.by_depth
            .write()
            .entry(path::depth(location))
            .or_default()
            .push(location.to_string());
    }

    /// Direct parent location
    pub fn parent_of(&self, location: &str) -> Option<String> {
        self.parents.get(location).map(|entry| entry.value().clone())
    }

    pub fn has_parent(&self, location: &str) -> bool {
        self.parents.contains_key(location)
    }

    /// Checks if `parent` is the direct parent of `location`
    pub fn is_direct_parent(&self, parent: &str, location: &str) -> bool {
        self.parents
            .get(location)
            .map_or(false, |entry| entry.value() == parent)
    }

    /// Checks if `ancestor` is on the parent chain of `location`
    pub fn is_ancestor(&self, ancestor: &str, location: &str) -> bool {
        let mut current = self.parent_of(location);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(&parent);
        }
        false
    }

    /// Topmost package on the parent chain of `location`
    ///
    /// Returns `location` itself for top-level packages.
    pub fn farthest_ancestor(&self, location: &str) -> String {
        let mut farthest = location.to_string();
        while let Some(parent) = self.parent_of(&farthest) {
            farthest = parent;
        }
        farthest
    }

    /// Deepest materialized location that is a strict ancestor of `module_path`
    pub fn closest_ancestor(&self, module_path: &str) -> Option<String> {
        let by_depth = self.by_depth.read();
        if by_depth.is_empty() {
            return None;
        }

        by_depth
            .range(..path::depth(module_path))
            .rev()
            .find_map(|(_, locations)| {
                locations
                    .iter()
                    .find(|location| path::is_ancestor(location, module_path))
                    .cloned()
            })
    }

    /// Number of indexed locations
    pub fn len(&self) -> usize {
        self.by_depth.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
