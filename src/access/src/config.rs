//! Engine options and JSON ingestion of package trees

use serde::Deserialize;

use crate::error::{AccessError, Result};
use crate::package::{InheritFlags, PackageSpec};
use crate::pattern::{self, Pattern};

/// Default main file name
pub const DEFAULT_MAIN: &str = "index";

/// Defaults applied to every package after inheritance
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageDefaults {
    /// Main file name
    pub main: String,

    /// Package files reachable from outside and from the direct parent
    #[serde(deserialize_with = "pattern::deserialize_optional")]
    pub public: Option<Pattern>,

    /// Untracked files reachable from inside top-level packages
    #[serde(deserialize_with = "pattern::deserialize_optional")]
    pub external: Option<Pattern>,

    /// Package files reachable from nested packages
    #[serde(deserialize_with = "pattern::deserialize_optional")]
    pub protected: Option<Pattern>,

    /// Which fields pass from a package to its direct children
    pub inheritable: InheritFlags,
}

impl Default for PackageDefaults {
    fn default() -> Self {
        Self {
            main: DEFAULT_MAIN.to_string(),
            public: None,
            external: None,
            protected: None,
            inheritable: InheritFlags::default(),
        }
    }
}

/// Global engine options
///
/// # Examples
///
/// ```
/// use modvis_access::Options;
///
/// let options = Options::from_json(r#"{
///     "package_defaults": { "main": "main" },
///     "allow_remote_protected": true
/// }"#).unwrap();
///
/// assert_eq!(options.package_defaults.main, "main");
/// assert!(options.allow_remote_protected);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Package defaults
    pub package_defaults: PackageDefaults,

    /// Allow any descendant, not only direct children, to load an
    /// ancestor's protected files
    pub allow_remote_protected: bool,
}

impl Options {
    /// Parses options from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AccessError::InvalidConfig(e.to_string()))
    }

    /// Sets the default main file name
    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.package_defaults.main = main.into();
        self
    }

    /// Allows protected access from any descendant
    pub fn with_remote_protected(mut self, allow: bool) -> Self {
        self.allow_remote_protected = allow;
        self
    }
}

/// Parses a package tree (single spec or list) from JSON text
///
/// # Examples
///
/// ```
/// use modvis_access::config::parse_packages;
///
/// let specs = parse_packages(r#"[
///     "vendor",
///     { "location": "app", "public": "api", "packages": ["widgets"] }
/// ]"#).unwrap();
///
/// assert_eq!(specs.len(), 2);
/// ```
pub fn parse_packages(json: &str) -> Result<Vec<PackageSpec>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| AccessError::InvalidConfig(e.to_string()))?;

    PackageSpec::list_from_json(&value)
}
