//! Location and visibility patterns
//!
//! A pattern is one of four shapes:
//! - exact string: `"main"` matches only `"main"`
//! - regular expression: matches when the regex finds a match
//! - predicate: any `Fn(&str) -> bool`
//! - list: matches when any element matches
//!
//! # Examples
//!
//! ```
//! use modvis_access::Pattern;
//!
//! let pattern = Pattern::any_of([
//!     Pattern::exact("api"),
//!     Pattern::regex(r"^views/").unwrap(),
//! ]);
//!
//! assert!(pattern.matches("api"));
//! assert!(pattern.matches("views/list"));
//! assert!(!pattern.matches("internal/db"));
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AccessError, Result};

/// Predicate over a path
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Pattern over package-relative (or, for locations, parent-relative) paths
#[derive(Clone)]
pub enum Pattern {
    /// Exact string equality
    Exact(String),
    /// Regular expression search
    Regex(Regex),
    /// Arbitrary predicate
    Predicate(Predicate),
    /// Matches if any element matches
    AnyOf(Vec<Pattern>),
}

impl Pattern {
    /// Creates an exact-string pattern
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    /// Compiles a regular-expression pattern
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the expression does not compile.
    pub fn regex(expr: &str) -> Result<Self> {
        Regex::new(expr)
            .map(Self::Regex)
            .map_err(|e| AccessError::InvalidPattern(format!("regex /{}/: {}", expr, e)))
    }

    /// Wraps a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Builds an any-of list
    pub fn any_of<I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = Pattern>,
    {
        Self::AnyOf(patterns.into_iter().collect())
    }

    /// Returns the string if this is an exact pattern
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            Self::Exact(value) => Some(value),
            _ => None,
        }
    }

    /// Checks whether `value` satisfies this pattern
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(expected) => value == expected,
            Self::Regex(regex) => regex.is_match(value),
            Self::Predicate(predicate) => predicate(value),
            Self::AnyOf(patterns) => patterns.iter().any(|p| p.matches(value)),
        }
    }

    /// Reads a pattern from its JSON form
    ///
    /// - `"text"` → exact
    /// - `{"regex": "..."}` → regular expression
    /// - `[...]` → any-of list
    /// - `false` / `null` → no pattern
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for any other shape.
    pub fn from_json(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::String(s) => Ok(Some(Self::exact(s.as_str()))),
            Value::Array(items) => {
                let mut patterns = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(pattern) = Self::from_json(item)? {
                        patterns.push(pattern);
                    }
                }
                Ok(Some(Self::AnyOf(patterns)))
            }
            Value::Object(map) if map.len() == 1 => match map.get("regex") {
                Some(Value::String(expr)) => Self::regex(expr).map(Some),
                _ => Err(unsupported(value)),
            },
            _ => Err(unsupported(value)),
        }
    }
}

fn unsupported(value: &Value) -> AccessError {
    AccessError::InvalidPattern(format!(
        "pattern should be either string, regexp, function or array, got {}",
        value
    ))
}

/// Matches `value` against an optional pattern; absence matches nothing
pub fn matches(value: &str, pattern: Option<&Pattern>) -> bool {
    pattern.map_or(false, |p| p.matches(value))
}

/// Serde adapter for `Option<Pattern>` fields in JSON configuration
pub(crate) fn deserialize_optional<'de, D>(deserializer: D) -> std::result::Result<Option<Pattern>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Pattern::from_json(&value).map_err(serde::de::Error::custom)
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
            Self::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::AnyOf(patterns) => f.debug_tuple("AnyOf").field(patterns).finish(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{}", value),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
            Self::Predicate(_) => write!(f, "<predicate>"),
            Self::AnyOf(patterns) => {
                write!(f, "[")?;
                for (idx, pattern) in patterns.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", pattern)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self::exact(value)
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Self::Exact(value)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<Vec<Pattern>> for Pattern {
    fn from(patterns: Vec<Pattern>) -> Self {
        Self::AnyOf(patterns)
    }
}
