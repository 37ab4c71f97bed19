//! Package specifications as supplied by the host
//!
//! A `PackageSpec` is user input before normalization. Every field except
//! the location may be left unset; unset fields are filled first from the
//! parent's inheritable fields, then from the global package defaults.
//! An explicitly empty surface (`false` in JSON) counts as set.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Settings;
use crate::error::{AccessError, Result};
use crate::pattern::Pattern;

/// Visibility surfaces a package can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Files reachable from outside the package and from its direct parent
    Public,
    /// Untracked files reachable from inside the package subtree
    External,
    /// Files reachable from nested packages
    Protected,
}

impl Surface {
    /// Configuration key for this surface
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::External => "external",
            Self::Protected => "protected",
        }
    }
}

/// Resolved inheritance flags
///
/// A `true` flag passes the field down to direct children as a
/// low-priority default. `external` is never inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InheritFlags {
    pub main: bool,
    pub public: bool,
    pub protected: bool,
    pub packages: bool,
    pub inheritable: bool,
}

impl Default for InheritFlags {
    fn default() -> Self {
        Self {
            main: false,
            public: false,
            protected: false,
            packages: false,
            inheritable: true,
        }
    }
}

/// Partially specified inheritance flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Inheritable {
    pub main: Option<bool>,
    pub public: Option<bool>,
    pub protected: Option<bool>,
    pub packages: Option<bool>,
    pub inheritable: Option<bool>,
}

impl Inheritable {
    /// Fills every unset flag from `flags`
    pub fn or_flags(self, flags: &InheritFlags) -> InheritFlags {
        InheritFlags {
            main: self.main.unwrap_or(flags.main),
            public: self.public.unwrap_or(flags.public),
            protected: self.protected.unwrap_or(flags.protected),
            packages: self.packages.unwrap_or(flags.packages),
            inheritable: self.inheritable.unwrap_or(flags.inheritable),
        }
    }
}

impl From<InheritFlags> for Inheritable {
    fn from(flags: InheritFlags) -> Self {
        Self {
            main: Some(flags.main),
            public: Some(flags.public),
            protected: Some(flags.protected),
            packages: Some(flags.packages),
            inheritable: Some(flags.inheritable),
        }
    }
}

/// Package specification before normalization
///
/// # Examples
///
/// ```
/// use modvis_access::{PackageSpec, Pattern};
///
/// let spec = PackageSpec::new("app")
///     .main("main")
///     .public(Pattern::exact("api"))
///     .package(PackageSpec::new("widgets").protected("theme"));
///
/// assert_eq!(spec.location().as_exact(), Some("app"));
/// ```
#[derive(Debug, Clone)]
pub struct PackageSpec {
    pub(crate) location: Pattern,
    pub(crate) main: Option<String>,
    pub(crate) public: Option<Option<Pattern>>,
    pub(crate) external: Option<Option<Pattern>>,
    pub(crate) protected: Option<Option<Pattern>>,
    pub(crate) packages: Option<Vec<PackageSpec>>,
    pub(crate) inheritable: Option<Inheritable>,
}

impl PackageSpec {
    /// Creates a spec with only a location; every other field is unset
    pub fn new(location: impl Into<Pattern>) -> Self {
        Self {
            location: location.into(),
            main: None,
            public: None,
            external: None,
            protected: None,
            packages: None,
            inheritable: None,
        }
    }

    /// Location pattern (relative to the parent package, if any)
    pub fn location(&self) -> &Pattern {
        &self.location
    }

    /// Sets the main file name
    pub fn main(mut self, main: impl Into<String>) -> Self {
        self.main = Some(main.into());
        self
    }

    /// Sets the public surface
    pub fn public(mut self, pattern: impl Into<Pattern>) -> Self {
        self.public = Some(Some(pattern.into()));
        self
    }

    /// Sets the external surface
    pub fn external(mut self, pattern: impl Into<Pattern>) -> Self {
        self.external = Some(Some(pattern.into()));
        self
    }

    /// Sets the protected surface
    pub fn protected(mut self, pattern: impl Into<Pattern>) -> Self {
        self.protected = Some(Some(pattern.into()));
        self
    }

    /// Explicitly declares an empty surface, so defaults do not fill it
    pub fn without(mut self, surface: Surface) -> Self {
        *self.surface_mut(surface) = Some(None);
        self
    }

    /// Replaces the nested package list
    pub fn packages(mut self, packages: impl IntoIterator<Item = PackageSpec>) -> Self {
        self.packages = Some(packages.into_iter().collect());
        self
    }

    /// Appends one nested package
    pub fn package(mut self, package: PackageSpec) -> Self {
        self.packages.get_or_insert_with(Vec::new).push(package);
        self
    }

    /// Sets inheritance flags
    pub fn inheritable(mut self, inheritable: Inheritable) -> Self {
        self.inheritable = Some(inheritable);
        self
    }

    pub(crate) fn surface_mut(&mut self, surface: Surface) -> &mut Option<Option<Pattern>> {
        match surface {
            Surface::Public => &mut self.public,
            Surface::External => &mut self.external,
            Surface::Protected => &mut self.protected,
        }
    }

    /// Applies the parent's inheritable fields as low-priority defaults
    ///
    /// Returns `true` when the nested package list itself was inherited.
    pub(crate) fn inherit_from(&mut self, parent: &Settings) -> bool {
        let flags = parent.inheritable;

        if flags.main && self.main.is_none() {
            self.main = Some(parent.main.clone());
        }
        if flags.public && self.public.is_none() {
            self.public = Some(parent.public.clone());
        }
        if flags.protected && self.protected.is_none() {
            self.protected = Some(parent.protected.clone());
        }
        if flags.inheritable {
            let own = self.inheritable.unwrap_or_default();
            self.inheritable = Some(own.or_flags(&flags).into());
        }
        if flags.packages && self.packages.is_none() {
            self.packages = Some(parent.nested.specs.clone());
            return true;
        }

        false
    }

    /// Whether this spec explicitly declares a non-empty external surface
    pub(crate) fn declares_external(&self) -> bool {
        matches!(self.external, Some(Some(_)))
    }

    /// Reads one spec from its JSON form: a bare location string,
    /// or an object with `location` and optional settings
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = match value {
            Value::String(location) => return Ok(Self::new(location.as_str())),
            Value::Object(map) => map,
            other => {
                return Err(AccessError::InvalidConfig(format!(
                    "package should be a location string or an object, got {}",
                    other
                )))
            }
        };

        let location = map
            .get("location")
            .map(Pattern::from_json)
            .transpose()?
            .flatten()
            .ok_or_else(|| AccessError::InvalidConfig("package location is required".to_string()))?;

        let mut spec = Self::new(location);

        for (key, value) in map {
            match key.as_str() {
                "location" => {}
                "main" => match value {
                    Value::String(main) => spec.main = Some(main.clone()),
                    other => {
                        return Err(AccessError::InvalidConfig(format!(
                            "\"main\" should be a file name, got {}",
                            other
                        )))
                    }
                },
                "public" => spec.public = Some(Pattern::from_json(value)?),
                "external" => spec.external = Some(Pattern::from_json(value)?),
                "protected" => spec.protected = Some(Pattern::from_json(value)?),
                "packages" => spec.packages = Some(Self::list_from_json(value)?),
                "inheritable" => {
                    let inheritable = serde_json::from_value(value.clone())
                        .map_err(|e| AccessError::InvalidConfig(format!("inheritable: {}", e)))?;
                    spec.inheritable = Some(inheritable);
                }
                other => {
                    return Err(AccessError::InvalidConfig(format!(
                        "unknown package option \"{}\"",
                        other
                    )))
                }
            }
        }

        Ok(spec)
    }

    /// Reads a single spec or a list of specs; `false`/`null` is an empty list
    pub fn list_from_json(value: &Value) -> Result<Vec<Self>> {
        match value {
            Value::Null | Value::Bool(false) => Ok(Vec::new()),
            Value::Array(items) => items.iter().map(Self::from_json).collect(),
            single => Ok(vec![Self::from_json(single)?]),
        }
    }
}

impl From<&str> for PackageSpec {
    fn from(location: &str) -> Self {
        Self::new(location)
    }
}

impl From<Pattern> for PackageSpec {
    fn from(location: Pattern) -> Self {
        Self::new(location)
    }
}

impl<'de> Deserialize<'de> for PackageSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
