//! Named permissions bound to a root rule.

use crate::error::PermissionError;
use crate::options::PermissionOptions;
use crate::rule::{LeafRule, Outcome, Rule};
use std::fmt;
use tracing::{debug, info, warn};

/// Builds the root rule of a permission.
///
/// Implement this on a type that carries the parameters a rule tree needs
/// (a resource id, a session handle) and turn it into a [`Permission`] with
/// [`Permission::from_factory`]. Closures returning a [`Rule`] implement it too.
///
/// # Examples
///
/// ```
/// use rulegate::prelude::*;
///
/// struct EditTopic {
///     topic_id: u64,
///     user_id: u64,
/// }
///
/// impl RuleFactory for EditTopic {
///     type Effect = u16;
///
///     fn rule(&self) -> Rule<u16> {
///         let (topic_id, user_id) = (self.topic_id, self.user_id);
///         Rule::builder("topic_owner")
///             .check(move || topic_id % 100 == user_id)
///             .on_denied(|| 403)
///             .build()
///     }
/// }
///
/// let mut permission = Permission::from_factory(&EditTopic { topic_id: 107, user_id: 7 });
/// assert_eq!(permission.name(), "EditTopic");
/// assert!(permission.check().unwrap());
/// ```
pub trait RuleFactory {
    /// Denial effect produced by the rules
    type Effect;

    /// Build the root rule.
    fn rule(&self) -> Rule<Self::Effect>;

    /// Permission name used in logs and errors. Defaults to the type name.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }
}

/// Blanket implementation for closures returning a rule.
impl<F, E> RuleFactory for F
where
    F: Fn() -> Rule<E>,
{
    type Effect = E;

    fn rule(&self) -> Rule<E> {
        self()
    }
}

/// A named access check over one root [`Rule`].
///
/// A permission remembers the outcome of its latest [`check`](Permission::check)
/// so that [`deny`](Permission::deny) can run the handler of the rule that
/// caused the failure without evaluating (and re-running side effects) again.
///
/// Both methods take `&mut self`: construct one permission per guarded call,
/// run one `check()`/`deny()` pair on it, and drop it.
///
/// # Examples
///
/// ```
/// use rulegate::prelude::*;
///
/// let user = Rule::builder("user")
///     .check(|| true)
///     .on_denied(|| "redirect:/login")
///     .build();
/// let admin = Rule::builder("admin")
///     .base(user)
///     .check(|| false)
///     .on_denied(|| "abort:403")
///     .build();
///
/// let mut permission = Permission::new("admin_panel", admin);
/// if !permission.check()? {
///     assert_eq!(permission.deny()?, Some("abort:403"));
/// }
/// # Ok::<(), PermissionError>(())
/// ```
pub struct Permission<E> {
    name: String,
    rule: Rule<E>,
    options: PermissionOptions,
    last: Option<Outcome<E>>,
}

impl<E> Permission<E> {
    /// Create a permission from a name and its root rule.
    pub fn new(name: impl Into<String>, rule: Rule<E>) -> Self {
        Self {
            name: name.into(),
            rule,
            options: PermissionOptions::default(),
            last: None,
        }
    }

    /// Create a permission from a [`RuleFactory`].
    pub fn from_factory<F>(factory: &F) -> Self
    where
        F: RuleFactory<Effect = E> + ?Sized,
    {
        Self::new(factory.name(), factory.rule())
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: PermissionOptions) -> Self {
        self.options = options;
        self
    }

    /// Name of the permission.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root rule.
    pub fn rule(&self) -> &Rule<E> {
        &self.rule
    }

    /// Options in effect.
    pub fn options(&self) -> &PermissionOptions {
        &self.options
    }

    /// Outcome of the latest `check()` that has not been dispatched by `deny()`.
    pub fn last_outcome(&self) -> Option<&Outcome<E>> {
        self.last.as_ref()
    }

    /// The rule a pending `deny()` would dispatch to.
    pub fn failing_rule(&self) -> Option<&LeafRule<E>> {
        self.last
            .as_ref()
            .and_then(Outcome::failing_rule)
            .map(|rule| &**rule)
    }

    /// Evaluate the root rule and remember the outcome.
    ///
    /// Calling `check()` again replaces the remembered outcome.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Predicate`] if a check fails. Nothing is
    /// remembered in that case.
    pub fn check(&mut self) -> Result<bool, PermissionError> {
        self.last = None;
        let outcome = self.rule.evaluate()?;
        let granted = outcome.is_granted();
        let rule = outcome.failing_rule().map(|rule| rule.name()).unwrap_or("-");

        if self.options.audit.records(granted) {
            info!(
                target: "rulegate::audit",
                permission = %self.name,
                granted,
                rule,
                "permission evaluated"
            );
        } else {
            debug!(permission = %self.name, granted, rule, "permission evaluated");
        }

        self.last = Some(outcome);
        Ok(granted)
    }

    /// Run the denial handler of the rule that failed the latest `check()`.
    ///
    /// The handler runs at most once per `check()`: a second `deny()` without
    /// a new failing `check()` is an error.
    ///
    /// # Errors
    ///
    /// - [`PermissionError::NotChecked`] if there is no pending failed `check()`
    /// - [`PermissionError::CheckPassed`] if the latest `check()` granted access
    /// - [`PermissionError::Predicate`] if the denial handler fails
    pub fn deny(&mut self) -> Result<Option<E>, PermissionError> {
        match self.last.take() {
            Some(Outcome::Denied(rule)) => {
                debug!(permission = %self.name, rule = rule.name(), "dispatching denial");
                rule.deny()
            }
            Some(Outcome::Granted) => {
                self.last = Some(Outcome::Granted);
                warn!(permission = %self.name, "deny() called after check() granted access");
                Err(PermissionError::CheckPassed {
                    permission: self.name.clone(),
                })
            }
            None => {
                warn!(permission = %self.name, "deny() called without a failed check()");
                Err(PermissionError::NotChecked {
                    permission: self.name.clone(),
                })
            }
        }
    }

    /// Log the channels of the root rule at debug level and return them.
    pub fn show(&self) -> Vec<Vec<&str>> {
        let channels = self.rule.channels();
        for channel in &channels {
            debug!(permission = %self.name, "channel: {}", channel.join(", "));
        }
        channels
    }
}

impl<E> fmt::Debug for Permission<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permission")
            .field("name", &self.name)
            .field("rule", &self.rule)
            .field("options", &self.options)
            .field("last", &self.last)
            .finish()
    }
}
