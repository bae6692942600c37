//! Leaf rules and their builder.

use crate::error::{BoxError, PermissionError, Stage};
use crate::rule::Rule;
use std::fmt;
use std::sync::Arc;

type CheckFn = Box<dyn Fn() -> Result<bool, BoxError> + Send + Sync>;
type DenyFn<E> = Box<dyn Fn() -> Result<E, BoxError> + Send + Sync>;

/// An atomic rule: an optional base rule, its own check and a denial handler.
///
/// Leaf rules are created through [`Rule::builder`] (or the `#[rule]` macro) and
/// are always handed out wrapped in a [`Rule`]. When a rule tree denies access,
/// the [`Outcome`](crate::rule::Outcome) points at exactly one `LeafRule`, whose
/// [`deny`](LeafRule::deny) is the handler to run.
pub struct LeafRule<E> {
    name: String,
    base: Option<Rule<E>>,
    check: Option<CheckFn>,
    on_denied: Option<DenyFn<E>>,
}

impl<E> LeafRule<E> {
    /// Name of the rule, used in logs, errors and [`Rule::channels`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The prerequisite rule evaluated before this rule's own check.
    pub fn base(&self) -> Option<&Rule<E>> {
        self.base.as_ref()
    }

    /// Whether a denial handler was registered.
    pub fn has_denial_handler(&self) -> bool {
        self.on_denied.is_some()
    }

    /// Run this rule's own check, ignoring the base rule.
    ///
    /// A rule built without a check always passes.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Predicate`] if the check itself fails.
    pub fn check(&self) -> Result<bool, PermissionError> {
        match &self.check {
            Some(check) => {
                check().map_err(|e| PermissionError::predicate(&self.name, Stage::Check, e))
            }
            None => Ok(true),
        }
    }

    /// Run the denial handler and return its effect.
    ///
    /// Returns `Ok(None)` when the rule has no handler.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Predicate`] if the handler fails.
    pub fn deny(&self) -> Result<Option<E>, PermissionError> {
        match &self.on_denied {
            Some(on_denied) => on_denied()
                .map(Some)
                .map_err(|e| PermissionError::predicate(&self.name, Stage::Deny, e)),
            None => Ok(None),
        }
    }
}

impl<E> fmt::Debug for LeafRule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafRule")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("has_check", &self.check.is_some())
            .field("has_denial_handler", &self.on_denied.is_some())
            .finish()
    }
}

/// Builder for leaf [`Rule`]s.
///
/// # Examples
///
/// ```rust
/// use rulegate::prelude::*;
///
/// let logged_in = Rule::<&'static str>::builder("logged_in")
///     .check(|| true)
///     .on_denied(|| "redirect:/login")
///     .build();
///
/// let admin = Rule::builder("admin")
///     .base(logged_in)
///     .check(|| false)
///     .on_denied(|| "abort:403")
///     .build();
///
/// let outcome = admin.evaluate().unwrap();
/// assert_eq!(outcome.failing_rule().unwrap().name(), "admin");
/// ```
pub struct RuleBuilder<E> {
    name: String,
    base: Option<Rule<E>>,
    check: Option<CheckFn>,
    on_denied: Option<DenyFn<E>>,
}

impl<E> RuleBuilder<E> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            check: None,
            on_denied: None,
        }
    }

    /// Set the prerequisite rule, evaluated before this rule's own check.
    pub fn base(mut self, base: Rule<E>) -> Self {
        self.base = Some(base);
        self
    }

    /// Set an infallible check.
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.check = Some(Box::new(move || Ok(check())));
        self
    }

    /// Set a check that can fail, e.g. because the state it consults is missing.
    ///
    /// Errors are propagated to the caller of `evaluate()` unchanged.
    pub fn try_check<F, Err>(mut self, check: F) -> Self
    where
        F: Fn() -> Result<bool, Err> + Send + Sync + 'static,
        Err: Into<BoxError>,
    {
        self.check = Some(Box::new(move || check().map_err(Into::into)));
        self
    }

    /// Set the denial handler.
    pub fn on_denied<F>(mut self, on_denied: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.on_denied = Some(Box::new(move || Ok(on_denied())));
        self
    }

    /// Set a denial handler that can fail.
    pub fn try_on_denied<F, Err>(mut self, on_denied: F) -> Self
    where
        F: Fn() -> Result<E, Err> + Send + Sync + 'static,
        Err: Into<BoxError>,
    {
        self.on_denied = Some(Box::new(move || on_denied().map_err(Into::into)));
        self
    }

    /// Build the rule.
    pub fn build(self) -> Rule<E> {
        Rule::Leaf(Arc::new(LeafRule {
            name: self.name,
            base: self.base,
            check: self.check,
            on_denied: self.on_denied,
        }))
    }
}
