//! Rulegate - composable access-control rules
//!
//! Rulegate evaluates small boolean rules that gate a guarded action, and when
//! access is denied it picks exactly one rule whose denial handler should run.
//!
//! # Overview
//!
//! - **Rules** carry an optional base rule, their own check, and a denial handler
//! - **Composition** with `&` / `|` (or [`and`] / [`or`]) builds expression trees
//!   evaluated left to right with short-circuiting
//! - **Permissions** bind a name to a root rule, remember the outcome of
//!   `check()`, and dispatch `deny()` to the rule that caused the failure
//! - **Guards** wrap protected code in a check/deny pair
//!
//! What a rule checks (sessions, database lookups) and what a denial means
//! (a redirect, an HTTP status) is left entirely to the application: the
//! denial effect is an opaque type parameter.
//!
//! # Architecture
//!
//! - `rule`: the rule tree, its evaluation, and the AND/OR combinators
//! - `permission`: named permissions and the `RuleFactory` trait
//! - `guard`: guarded execution helpers built on `check()`/`deny()`
//! - `options`: permission options (audit logging)
//! - `error`: error types and handling
//!
//! # Example
//!
//! ```rust
//! use rulegate::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! enum Denial {
//!     Login,
//!     Forbidden,
//! }
//!
//! struct Session {
//!     user_id: Option<u64>,
//!     is_admin: bool,
//! }
//!
//! struct EditTopic {
//!     session: std::sync::Arc<Session>,
//!     topic_owner: u64,
//! }
//!
//! impl RuleFactory for EditTopic {
//!     type Effect = Denial;
//!
//!     fn rule(&self) -> Rule<Denial> {
//!         let session = self.session.clone();
//!         let user = Rule::builder("user")
//!             .check(move || session.user_id.is_some())
//!             .on_denied(|| Denial::Login)
//!             .build();
//!
//!         let session = self.session.clone();
//!         let admin = Rule::builder("admin")
//!             .base(user.clone())
//!             .check(move || session.is_admin)
//!             .on_denied(|| Denial::Forbidden)
//!             .build();
//!
//!         let (session, owner) = (self.session.clone(), self.topic_owner);
//!         let topic_owner = Rule::builder("topic_owner")
//!             .base(user)
//!             .check(move || session.user_id == Some(owner))
//!             .on_denied(|| Denial::Forbidden)
//!             .build();
//!
//!         admin | topic_owner
//!     }
//! }
//!
//! let session = std::sync::Arc::new(Session { user_id: None, is_admin: false });
//! let mut permission = Permission::from_factory(&EditTopic { session, topic_owner: 7 });
//!
//! assert!(!permission.check()?);
//! assert_eq!(permission.deny()?, Some(Denial::Login));
//! # Ok::<(), PermissionError>(())
//! ```
//!
//! # License
//!
//! Licensed under MIT. See LICENSE file for details.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export macros from rulegate_macros
pub use rulegate_macros::*;

/// Rule tree and evaluation
///
/// This module provides [`Rule`], an expression tree over leaf rules, together
/// with the evaluation algorithm:
///
/// - `Rule::Leaf` - a base rule, a check and a denial handler (see `LeafRule`)
/// - `Rule::And` / `Rule::Or` - short-circuiting composites
/// - `Outcome` - the verdict plus the one leaf rule blamed for a denial
pub mod rule;

/// Named permissions
///
/// This module provides `Permission`, which owns a root rule and the outcome of
/// its latest `check()`, and `RuleFactory`, for building root rules from
/// parameters captured at construction time.
pub mod permission;

/// Guarded execution helpers
///
/// Decorator- and scope-style wrappers turning "if not check(), deny()" into a
/// single call. Built only from `Permission::check` and `Permission::deny`.
pub mod guard;

/// Configuration options and builder
///
/// This module provides `PermissionOptions` for configuring audit logging of
/// permission verdicts.
pub mod options;

/// Error types and utilities
///
/// This module defines the `PermissionError` enum:
///
/// - `NotChecked` - `deny()` without a pending failed `check()`
/// - `CheckPassed` - `deny()` after a granting `check()`
/// - `Predicate` - a caller-supplied check or denial handler failed
/// - `Denied` - denial signal raised by `Permission::require`
pub mod error;

// Public API re-exports
pub use error::{BoxError, PermissionError};
pub use permission::{Permission, RuleFactory};
pub use rule::{Outcome, Rule, and, or};

// Prelude module for common imports
pub mod prelude {
    //! Common imports for rulegate users
    //!
    //! Use `use rulegate::prelude::*;` to import commonly used types.

    pub use crate::error::{BoxError, PermissionError, Stage};
    pub use crate::guard::Guarded;
    pub use crate::options::{AuditMode, PermissionOptions};
    pub use crate::permission::{Permission, RuleFactory};
    pub use crate::rule::{LeafRule, Outcome, Rule, RuleBuilder, and, or};
    pub use rulegate_macros::rule;
}
