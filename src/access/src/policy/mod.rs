//! Access policy between packages
//!
//! Decides whether a caller path may load a target path, given the packages
//! both resolve to:
//! - outside callers see only the main file and public surface of
//!   top-level packages
//! - a package sees all of its own files
//! - a parent sees the main file and public surface of its direct children
//! - a child sees the protected surface (minus the main file) of its direct
//!   parent, or of any ancestor with `allow_remote_protected`
//! - untracked files are reachable from inside packages only through the
//!   `external` surface of the topmost ancestor

mod decision;

use tracing::debug;

use crate::engine::ROOT_CONTEXT;
use crate::error::Result;
use crate::package::{Package, Surface};
use crate::resolver::Resolver;

pub use decision::{Access, Decision, DenialReason};

/// Access rules evaluated against a resolver
pub struct AccessPolicy<'a> {
    resolver: &'a Resolver,
}

impl<'a> AccessPolicy<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    /// Decides whether `caller` may load `target`
    ///
    /// Resolving either path may materialize pattern packages, which is the
    /// only source of errors.
    pub fn check(&self, caller: &str, target: &str) -> Result<Decision> {
        let caller_package = if caller == ROOT_CONTEXT {
            None
        } else {
            self.resolver.resolve(caller)?
        };
        let target_package = self.resolver.resolve(target)?;

        let denial = match (&caller_package, &target_package) {
            (None, None) => None,
            (None, Some(target_pkg)) => self.outside_to_package(target, target_pkg),
            (Some(caller_pkg), Some(target_pkg)) => self.between_packages(target, caller_pkg, target_pkg),
            (Some(caller_pkg), None) => self.package_to_outside(target, caller_pkg),
        };

        let caller_location = caller_package.as_ref().map(|p| p.location().to_string());
        let target_location = target_package.as_ref().map(|p| p.location().to_string());

        let decision = match denial {
            None => Decision::allow(caller, target, caller_location, target_location),
            Some(reason) => {
                debug!(caller, target, reason = ?reason, "Access denied");
                Decision::deny(caller, target, caller_location, target_location, reason)
            }
        };

        Ok(decision)
    }

    fn outside_to_package(&self, target: &str, target_pkg: &Package) -> Option<DenialReason> {
        let visible = !target_pkg.has_parent() && exposed_entry(target_pkg, target);

        (!visible).then_some(DenialReason::OutsideToInternal)
    }

    fn between_packages(&self, target: &str, caller_pkg: &Package, target_pkg: &Package) -> Option<DenialReason> {
        if caller_pkg == target_pkg {
            return None;
        }

        if self.resolver.is_direct_parent(caller_pkg, target_pkg) && exposed_entry(target_pkg, target) {
            return None;
        }

        let descends = if self.resolver.allow_remote_protected() {
            self.resolver.is_ancestor(target_pkg, caller_pkg)
        } else {
            self.resolver.is_direct_parent(target_pkg, caller_pkg)
        };

        if descends && !target_pkg.is_main_file(target) && target_pkg.exposes(Surface::Protected, target) {
            return None;
        }

        Some(DenialReason::CrossPackage)
    }

    fn package_to_outside(&self, target: &str, caller_pkg: &Package) -> Option<DenialReason> {
        let allowed = match self.resolver.farthest_ancestor(caller_pkg) {
            Some(entry) => entry.exposes(Surface::External, target),
            None => caller_pkg.exposes(Surface::External, target),
        };

        (!allowed).then_some(DenialReason::OutsideAccessDenied)
    }
}

/// Main file or public surface
fn exposed_entry(package: &Package, path: &str) -> bool {
    package.is_main_file(path) || package.exposes(Surface::Public, path)
}
