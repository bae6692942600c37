//! Permission options and builder.
//!
//! Options are plain data with `serde` support so applications can keep them in
//! their own configuration files. The library itself never reads files or
//! environment variables.
//!
//! # Example
//!
//! ```rust
//! use rulegate::options::{AuditMode, PermissionOptions};
//!
//! let options = PermissionOptions::builder()
//!     .audit(AuditMode::Denials)
//!     .build();
//!
//! assert!(options.audit.records(false));
//! assert!(!options.audit.records(true));
//! ```

use serde::{Deserialize, Serialize};

/// Which verdicts are reported on the `rulegate::audit` tracing target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// Verdicts are only logged at debug level
    #[default]
    Off,
    /// Denials are reported at info level
    Denials,
    /// Every verdict is reported at info level
    All,
}

impl AuditMode {
    /// Whether a verdict with the given result is reported.
    pub fn records(self, granted: bool) -> bool {
        match self {
            AuditMode::Off => false,
            AuditMode::Denials => !granted,
            AuditMode::All => true,
        }
    }
}

/// Options applied to a [`Permission`](crate::Permission).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionOptions {
    /// Audit reporting of verdicts
    pub audit: AuditMode,
}

impl PermissionOptions {
    /// Create a new builder.
    pub fn builder() -> PermissionOptionsBuilder {
        PermissionOptionsBuilder::default()
    }
}

/// Builder for [`PermissionOptions`].
#[derive(Debug, Default)]
pub struct PermissionOptionsBuilder {
    audit: Option<AuditMode>,
}

impl PermissionOptionsBuilder {
    /// Set the audit mode.
    pub fn audit(mut self, audit: AuditMode) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Build the options.
    pub fn build(self) -> PermissionOptions {
        PermissionOptions {
            audit: self.audit.unwrap_or_default(),
        }
    }
}
