//! Error types for rulegate
//!
//! This module defines the error hierarchy for the rulegate crate using `thiserror`.
//! Evaluating a rule to `false` is **not** an error: a denial is a normal
//! [`Outcome`](crate::rule::Outcome). Errors are reserved for three situations:
//!
//! # Error Variants
//!
//! - [`PermissionError::NotChecked`]: `deny()` called with no pending failed `check()`
//! - [`PermissionError::CheckPassed`]: `deny()` called after `check()` granted access
//! - [`PermissionError::Predicate`]: a caller-supplied check or denial handler failed
//! - [`PermissionError::Denied`]: denial signal raised by [`Permission::require`](crate::Permission::require)
//!
//! # Example
//!
//! ```rust
//! use rulegate::prelude::*;
//!
//! let mut permission: Permission<()> = Permission::new("noop", Rule::allow("open"));
//!
//! // deny() before check() is a programming error, not a denial
//! let err = permission.deny().unwrap_err();
//! assert!(err.is_misuse());
//! ```

use std::fmt;
use thiserror::Error;

/// Boxed error returned by fallible checks and denial handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which caller-supplied hook raised a [`PermissionError::Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The rule's own check
    Check,
    /// The rule's denial handler
    Deny,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Check => f.write_str("check"),
            Stage::Deny => f.write_str("deny"),
        }
    }
}

/// The main error type for all rulegate operations
#[derive(Error, Debug)]
pub enum PermissionError {
    /// `deny()` was called without a pending failed `check()`
    ///
    /// Either `check()` was never called on this permission, or the failure it
    /// recorded has already been dispatched by an earlier `deny()`.
    #[error("deny() called on permission '{permission}' without a failed check()")]
    NotChecked {
        /// Name of the permission that was misused
        permission: String,
    },

    /// `deny()` was called after `check()` granted access
    #[error("deny() called on permission '{permission}' after check() granted access")]
    CheckPassed {
        /// Name of the permission that was misused
        permission: String,
    },

    /// A caller-supplied check or denial handler failed
    ///
    /// The core never guesses a verdict for a failing predicate; the original
    /// error is kept as the source and can be recovered with
    /// [`PermissionError::into_source`].
    #[error("rule '{rule}' failed during {stage}: {source}")]
    Predicate {
        /// Name of the rule whose hook failed
        rule: String,
        /// Which hook failed
        stage: Stage,
        /// The error raised by the hook
        #[source]
        source: BoxError,
    },

    /// Access was denied and the denial handler completed
    ///
    /// Only produced by the scoped helpers in [`crate::guard`], which turn a
    /// denial into an early exit via `?`.
    #[error("permission '{permission}' denied by rule '{rule}'")]
    Denied {
        /// Name of the permission that denied access
        permission: String,
        /// Name of the rule that caused the denial
        rule: String,
    },
}

impl PermissionError {
    pub(crate) fn predicate(rule: &str, stage: Stage, source: BoxError) -> Self {
        PermissionError::Predicate {
            rule: rule.to_string(),
            stage,
            source,
        }
    }

    /// Returns true for caller programming errors (`deny()` without a failed `check()`).
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            PermissionError::NotChecked { .. } | PermissionError::CheckPassed { .. }
        )
    }

    /// Returns true if this is the denial signal produced by the guard helpers.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, PermissionError::Denied { .. })
    }

    /// Recover the error raised by a caller-supplied hook, if this is one.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            PermissionError::Predicate { source, .. } => Some(source),
            _ => None,
        }
    }
}
