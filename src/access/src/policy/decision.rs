//! Access decision types

use std::fmt;

use serde::Serialize;

use crate::error::{AccessError, Result};

/// Rule category that refused an access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DenialReason {
    /// Caller outside any package reached past a package's public surface
    OutsideToInternal,
    /// Caller and target live in unrelated packages, or the target file is
    /// not on the surface the relation allows
    CrossPackage,
    /// Caller inside a package reached an untracked file not listed as external
    OutsideAccessDenied,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OutsideToInternal => "Access to package internal files from outside of package",
            Self::CrossPackage => "Cross-package access",
            Self::OutsideAccessDenied => "Access to out-of-package files from inside packages",
        };
        f.write_str(text)
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Access {
    Allowed,
    Denied { reason: DenialReason },
}

/// Access decision with the packages both paths resolved to
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Requesting path (or the root context)
    pub caller: String,

    /// Requested path
    pub target: String,

    /// Package owning the caller, if any
    pub caller_package: Option<String>,

    /// Package owning the target, if any
    pub target_package: Option<String>,

    /// Outcome
    pub access: Access,
}

impl Decision {
    /// Create an allow decision
    pub fn allow(
        caller: impl Into<String>,
        target: impl Into<String>,
        caller_package: Option<String>,
        target_package: Option<String>,
    ) -> Self {
        Self {
            caller: caller.into(),
            target: target.into(),
            caller_package,
            target_package,
            access: Access::Allowed,
        }
    }

    /// Create a deny decision
    pub fn deny(
        caller: impl Into<String>,
        target: impl Into<String>,
        caller_package: Option<String>,
        target_package: Option<String>,
        reason: DenialReason,
    ) -> Self {
        Self {
            caller: caller.into(),
            target: target.into(),
            caller_package,
            target_package,
            access: Access::Denied { reason },
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.access == Access::Allowed
    }

    /// Denial reason, `None` when allowed
    pub fn reason(&self) -> Option<DenialReason> {
        match self.access {
            Access::Allowed => None,
            Access::Denied { reason } => Some(reason),
        }
    }

    /// Converts a denial into `AccessDenied`
    pub fn into_result(self) -> Result<()> {
        match self.access {
            Access::Allowed => Ok(()),
            Access::Denied { reason } => Err(AccessError::AccessDenied {
                reason,
                caller: self.caller,
                target: self.target,
            }),
        }
    }
}
