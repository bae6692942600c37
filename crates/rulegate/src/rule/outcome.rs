//! Result of one rule evaluation.

use crate::rule::LeafRule;
use std::fmt;
use std::sync::Arc;

/// Verdict of a single [`Rule::evaluate`](crate::Rule::evaluate) call.
///
/// A denial carries the one leaf rule held responsible for it; that rule's
/// denial handler is the only one a [`Permission`](crate::Permission) will run.
pub enum Outcome<E> {
    /// Every rule on the evaluated path passed
    Granted,
    /// The given rule's check (or its base chain) failed
    Denied(Arc<LeafRule<E>>),
}

impl<E> Outcome<E> {
    /// Returns true if access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Outcome::Granted)
    }

    /// Returns true if access was denied.
    pub fn is_denied(&self) -> bool {
        !self.is_granted()
    }

    /// The rule that caused the denial, if any.
    pub fn failing_rule(&self) -> Option<&Arc<LeafRule<E>>> {
        match self {
            Outcome::Granted => None,
            Outcome::Denied(rule) => Some(rule),
        }
    }

    /// Consume the outcome, returning the rule that caused the denial.
    pub fn into_failing_rule(self) -> Option<Arc<LeafRule<E>>> {
        match self {
            Outcome::Granted => None,
            Outcome::Denied(rule) => Some(rule),
        }
    }
}

impl<E> Clone for Outcome<E> {
    fn clone(&self) -> Self {
        match self {
            Outcome::Granted => Outcome::Granted,
            Outcome::Denied(rule) => Outcome::Denied(Arc::clone(rule)),
        }
    }
}

impl<E> fmt::Debug for Outcome<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Granted => f.write_str("Granted"),
            Outcome::Denied(rule) => f.debug_tuple("Denied").field(&rule.name()).finish(),
        }
    }
}
