//! Package resolver with lazy template materialization and caching
//!
//! Answers "which package owns this path" by combining:
//! - the [`PackageTree`] of materialized packages and pending templates
//! - the [`ParentIndex`] for closest-ancestor search
//! - the [`PathCache`] of previous answers
//!
//! Pattern-located packages are materialized the first time a resolved
//! path matches them, so the tree grows as paths are observed.
//!
//! # Examples
//!
//! ```
//! use modvis_access::{PackageSpec, Pattern, Resolver};
//!
//! let resolver = Resolver::new();
//! resolver
//!     .init([PackageSpec::new("app")
//!         .package(PackageSpec::new(Pattern::regex("^feature-[a-z]+$").unwrap()))])
//!     .unwrap();
//!
//! let owner = resolver.resolve("app/feature-login/view").unwrap().unwrap();
//! assert_eq!(owner.location(), "app/feature-login");
//! assert_eq!(owner.parent(), Some("app"));
//! ```

mod cache;
mod index;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::Options;
use crate::error::{AccessError, Result};
use crate::package::{NestedSpecs, Package, PackageSpec, PackageTree, Settings, Template};
use crate::path;

pub use cache::{CacheStats, PathCache};
pub use index::ParentIndex;

/// Materialized parent of the specs being normalized
#[derive(Clone, Copy)]
struct ParentContext<'a> {
    location: &'a str,
    settings: &'a Settings,
}

/// Registry of packages for one configuration lifetime
///
/// `init` and `configure` may each be called once. Everything else is
/// append-only, so `&self` methods can be re-entered freely.
#[derive(Default)]
pub struct Resolver {
    /// Materialized packages and top-level templates
    tree: PackageTree,
    /// Direct parents and depth-ordered locations
    index: ParentIndex,
    /// path -> owning location
    cache: PathCache,
    /// Global options
    options: RwLock<Options>,
    initialized: AtomicBool,
    configured: AtomicBool,
}

impl Resolver {
    /// Creates an empty resolver with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets global options
    ///
    /// # Errors
    ///
    /// Returns `AlreadyConfigured` on a second call.
    pub fn configure(&self, options: Options) -> Result<()> {
        if self.configured.swap(true, Ordering::SeqCst) {
            return Err(AccessError::AlreadyConfigured);
        }

        info!(
            main = %options.package_defaults.main,
            allow_remote_protected = options.allow_remote_protected,
            "Package options configured"
        );

        *self.options.write() = options;
        Ok(())
    }

    /// Loads the package tree
    ///
    /// Exact locations are materialized immediately; pattern locations stay
    /// pending until a resolved path matches them.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` on a second call
    /// - `InvalidNestedExternal` if any nested spec declares `external`
    pub fn init<I>(&self, specs: I) -> Result<()>
    where
        I: IntoIterator<Item = PackageSpec>,
    {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(AccessError::AlreadyInitialized);
        }

        let specs: Vec<PackageSpec> = specs.into_iter().collect();
        validate_nested_externals(&specs, None)?;

        let templates = self.normalize(&specs, None, false)?;

        info!(
            packages = self.tree.len(),
            templates = templates.len(),
            "Packages list initialized"
        );

        self.tree.set_templates(templates);
        Ok(())
    }

    /// Whether `init` has been called
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Snapshot of the current options
    pub fn options(&self) -> Options {
        self.options.read().clone()
    }

    /// Whether descendants beyond direct children may reach protected files
    pub fn allow_remote_protected(&self) -> bool {
        self.options.read().allow_remote_protected
    }

    /// Finds the package owning `module_path`, materializing matching
    /// templates along the way
    ///
    /// Resolution order:
    /// 1. exact package location
    /// 2. cached answer
    /// 3. closest materialized ancestor, then its nested templates
    /// 4. top-level templates, then the nested templates of the match
    /// 5. no owner (cached as such)
    pub fn resolve(&self, module_path: &str) -> Result<Option<Arc<Package>>> {
        if let Some(package) = self.tree.get(module_path) {
            return Ok(Some(package));
        }

        if let Some(cached) = self.cache.get(module_path) {
            return Ok(cached.and_then(|location| self.tree.get(&location)));
        }

        let start = match self.index.closest_ancestor(module_path) {
            Some(location) => self.tree.get(&location),
            None => self.expand_any(module_path, &self.tree.templates(), None)?,
        };

        let Some(mut current) = start else {
            debug!(path = module_path, "No package owns path");
            self.cache.insert(module_path, None);
            return Ok(None);
        };

        // Expansion may materialize exact children below the current package
        loop {
            let closer = self
                .deepest_materialized(module_path)
                .filter(|package| path::is_ancestor(current.location(), package.location()));
            if let Some(package) = closer {
                current = package;
                continue;
            }

            let deeper = self.expand_any(module_path, current.pending(), Some(current.location()))?;
            match deeper {
                Some(package) if path::is_ancestor(current.location(), package.location()) => current = package,
                _ => break,
            }
        }

        debug!(path = module_path, package = current.location(), "Resolved path");
        self.cache.insert(module_path, Some(current.location()));
        Ok(Some(current))
    }

    /// Materialized package at exactly `location`
    pub fn package(&self, location: &str) -> Option<Arc<Package>> {
        self.tree.get(location)
    }

    /// Direct parent location of a materialized package
    pub fn parent_of(&self, location: &str) -> Option<String> {
        self.index.parent_of(location)
    }

    /// Topmost package on the parent chain (the package itself if top-level)
    pub fn farthest_ancestor(&self, package: &Package) -> Option<Arc<Package>> {
        self.tree.get(&self.index.farthest_ancestor(package.location()))
    }

    /// Checks if `parent` is the direct parent of `child`
    pub fn is_direct_parent(&self, parent: &Package, child: &Package) -> bool {
        self.index.is_direct_parent(parent.location(), child.location())
    }

    /// Checks if `ancestor` is anywhere on the parent chain of `descendant`
    pub fn is_ancestor(&self, ancestor: &Package, descendant: &Package) -> bool {
        self.index.is_ancestor(ancestor.location(), descendant.location())
    }

    /// Number of materialized packages
    pub fn package_count(&self) -> usize {
        self.tree.len()
    }

    /// Path cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            packages: self.tree.len(),
            ..self.cache.stats()
        }
    }

    /// The package at `module_path` itself, or its closest materialized ancestor
    fn deepest_materialized(&self, module_path: &str) -> Option<Arc<Package>> {
        self.tree.get(module_path).or_else(|| {
            self.index
                .closest_ancestor(module_path)
                .and_then(|location| self.tree.get(&location))
        })
    }

    /// Normalizes specs, materializing exact locations
    ///
    /// Returns the specs that stay pending as templates. A `deferred` list
    /// (inherited from a parent) never materializes eagerly.
    fn normalize(
        &self,
        specs: &[PackageSpec],
        parent: Option<ParentContext<'_>>,
        deferred: bool,
    ) -> Result<Vec<Arc<Template>>> {
        let mut templates = Vec::new();

        for spec in specs {
            let settings = self.settle(spec, parent)?;
            let exact = if deferred { None } else { spec.location.as_exact() };

            match exact {
                Some(relative) => {
                    let relative = path::trim(relative);
                    if relative.is_empty() {
                        return Err(AccessError::InvalidConfig(
                            "package location cannot be empty".to_string(),
                        ));
                    }

                    let parent_location = parent.map(|p| p.location);
                    let location = path::join(parent_location.unwrap_or(""), relative);
                    self.materialize(location, settings, parent_location)?;
                }
                None => templates.push(Arc::new(Template {
                    location: spec.location.clone(),
                    settings,
                })),
            }
        }

        Ok(templates)
    }

    /// Resolves every field of a spec: parent inheritance first, then
    /// global defaults
    fn settle(&self, spec: &PackageSpec, parent: Option<ParentContext<'_>>) -> Result<Settings> {
        let mut spec = spec.clone();
        let deferred = match parent {
            Some(parent) => spec.inherit_from(parent.settings),
            None => false,
        };

        if let Some(parent) = parent {
            if spec.declares_external() {
                return Err(AccessError::InvalidNestedExternal {
                    location: spec.location.to_string(),
                    parent: parent.location.to_string(),
                });
            }
        }

        let options = self.options.read();
        let defaults = &options.package_defaults;

        // A default external surface never applies to nested packages
        let external = match parent {
            Some(_) => None,
            None => spec.external.unwrap_or_else(|| defaults.external.clone()),
        };

        Ok(Settings {
            main: spec.main.unwrap_or_else(|| defaults.main.clone()),
            public: spec.public.unwrap_or_else(|| defaults.public.clone()),
            external,
            protected: spec.protected.unwrap_or_else(|| defaults.protected.clone()),
            inheritable: spec.inheritable.unwrap_or_default().or_flags(&defaults.inheritable),
            nested: NestedSpecs {
                specs: spec.packages.unwrap_or_default(),
                deferred,
            },
        })
    }

    /// Stores a package at `location`, normalizing its nested specs
    ///
    /// An already materialized location is returned unchanged.
    fn materialize(&self, location: String, settings: Settings, parent: Option<&str>) -> Result<Arc<Package>> {
        if let Some(existing) = self.tree.get(&location) {
            debug!(location = %location, "Package already materialized");
            return Ok(existing);
        }

        let context = ParentContext {
            location: &location,
            settings: &settings,
        };
        let nested = self.normalize(&settings.nested.specs, Some(context), settings.nested.deferred)?;

        let package = Package::new(location, parent.map(str::to_string), settings, nested);
        let (stored, inserted) = self.tree.insert(package);

        if inserted {
            self.index.insert(stored.location(), stored.parent());
            self.cache.insert(stored.location(), Some(stored.location()));
            // Nested packages are stored first and may own the same main path
            self.cache.insert_unless_deeper(stored.main_path(), stored.location());

            debug!(
                location = stored.location(),
                parent = ?stored.parent(),
                pending = stored.pending().len(),
                "Materialized package"
            );
        }

        Ok(stored)
    }

    /// Tries templates in order; the first one that matches wins
    fn expand_any(
        &self,
        module_path: &str,
        templates: &[Arc<Template>],
        parent: Option<&str>,
    ) -> Result<Option<Arc<Package>>> {
        for template in templates {
            if let Some(package) = self.expand_template(module_path, template, parent)? {
                return Ok(Some(package));
            }
        }
        Ok(None)
    }

    /// Matches a template against every prefix of the path below `parent`,
    /// shallowest first, materializing each match
    ///
    /// Prefixes with empty segments never match, so leading, trailing or
    /// doubled delimiters cannot produce a package.
    ///
    /// Returns the deepest match; the cache entry for `module_path` ends up
    /// pointing at it.
    fn expand_template(
        &self,
        module_path: &str,
        template: &Template,
        parent: Option<&str>,
    ) -> Result<Option<Arc<Package>>> {
        let remainder = match parent {
            Some(parent) if !path::is_ancestor(parent, module_path) => return Ok(None),
            Some(parent) => path::relative(module_path, parent),
            None => module_path,
        };

        let prefixes = remainder
            .match_indices(path::DELIMITER)
            .map(|(idx, _)| &remainder[..idx])
            .chain(std::iter::once(remainder));

        let mut deepest = None;
        for prefix in prefixes {
            if !path::is_canonical(prefix) || !template.location.matches(prefix) {
                continue;
            }

            let location = path::join(parent.unwrap_or(""), prefix);
            let package = self.materialize(location, template.settings.clone(), parent)?;
            self.cache.insert(module_path, Some(package.location()));
            deepest = Some(package);
        }

        Ok(deepest)
    }
}

/// Rejects `external` on any spec below the top level, including specs
/// under templates that will only materialize later
fn validate_nested_externals(specs: &[PackageSpec], parent: Option<&PackageSpec>) -> Result<()> {
    for spec in specs {
        if let Some(parent) = parent {
            if spec.declares_external() {
                return Err(AccessError::InvalidNestedExternal {
                    location: spec.location.to_string(),
                    parent: parent.location.to_string(),
                });
            }
        }

        if let Some(nested) = &spec.packages {
            validate_nested_externals(nested, Some(spec))?;
        }
    }
    Ok(())
}
