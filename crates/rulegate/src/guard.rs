//! Guarded execution built on `check()` / `deny()`.
//!
//! These helpers are the integration layer between a [`Permission`] and the code
//! it protects. They only ever call the two public primitives, in order:
//!
//! - [`Permission::guard`] / [`Permission::guard_async`] - run the protected code
//!   when access is granted, otherwise hand back the denial effect in its place
//! - [`Permission::require`] - for early exit with `?`: a denial runs the handler
//!   and then surfaces as [`PermissionError::Denied`]
//!
//! # Example
//!
//! ```rust
//! use rulegate::prelude::*;
//!
//! fn delete_topic(permission: &mut Permission<&'static str>) -> Result<(), PermissionError> {
//!     permission.require()?;
//!     // ... only reached when access is granted
//!     Ok(())
//! }
//!
//! let mut permission = Permission::new("delete_topic", Rule::new("admin", || false));
//! let err = delete_topic(&mut permission).unwrap_err();
//! assert!(err.is_denied());
//! ```

use crate::error::PermissionError;
use crate::permission::Permission;
use std::future::Future;

/// Result of running code behind a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T, E> {
    /// Access was granted and the guarded code ran
    Allowed(T),
    /// Access was denied; holds the denial effect of the failing rule
    Denied(Option<E>),
}

impl<T, E> Guarded<T, E> {
    /// Returns true if the guarded code ran.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Guarded::Allowed(_))
    }

    /// The value returned by the guarded code, if it ran.
    pub fn allowed(self) -> Option<T> {
        match self {
            Guarded::Allowed(value) => Some(value),
            Guarded::Denied(_) => None,
        }
    }

    /// The denial effect, if access was denied and the rule produced one.
    pub fn denied(self) -> Option<E> {
        match self {
            Guarded::Allowed(_) => None,
            Guarded::Denied(effect) => effect,
        }
    }

    /// Merge both branches into one value, e.g. a response.
    pub fn unwrap_or_else<F>(self, on_denied: F) -> T
    where
        F: FnOnce(Option<E>) -> T,
    {
        match self {
            Guarded::Allowed(value) => value,
            Guarded::Denied(effect) => on_denied(effect),
        }
    }
}

impl<E> Permission<E> {
    /// Run `f` if access is granted, otherwise run the denial handler instead.
    ///
    /// ```rust
    /// use rulegate::prelude::*;
    ///
    /// let rule = Rule::builder("owner").check(|| false).on_denied(|| 403u16).build();
    /// let mut permission = Permission::new("edit_topic", rule);
    ///
    /// let result = permission.guard(|| "edited").unwrap();
    /// assert_eq!(result, Guarded::Denied(Some(403)));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Predicate`] if a check or the denial handler fails.
    pub fn guard<T, F>(&mut self, f: F) -> Result<Guarded<T, E>, PermissionError>
    where
        F: FnOnce() -> T,
    {
        if self.check()? {
            Ok(Guarded::Allowed(f()))
        } else {
            Ok(Guarded::Denied(self.deny()?))
        }
    }

    /// Async form of [`guard`](Permission::guard): `fut` is only awaited when
    /// access is granted.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Predicate`] if a check or the denial handler fails.
    pub async fn guard_async<T, Fut>(&mut self, fut: Fut) -> Result<Guarded<T, E>, PermissionError>
    where
        Fut: Future<Output = T>,
    {
        if self.check()? {
            Ok(Guarded::Allowed(fut.await))
        } else {
            Ok(Guarded::Denied(self.deny()?))
        }
    }

    /// Check access for a guarded scope left with `?`.
    ///
    /// On denial the handler of the failing rule runs first; its effect is
    /// dropped and [`PermissionError::Denied`] is returned.
    ///
    /// # Errors
    ///
    /// - [`PermissionError::Denied`] if access is denied
    /// - [`PermissionError::Predicate`] if a check or the denial handler fails
    ///   (the handler's error wins over the denial signal)
    pub fn require(&mut self) -> Result<(), PermissionError> {
        if self.check()? {
            return Ok(());
        }

        let rule = self
            .failing_rule()
            .map(|rule| rule.name().to_string())
            .unwrap_or_default();
        self.deny()?;

        Err(PermissionError::Denied {
            permission: self.name().to_string(),
            rule,
        })
    }
}
