//! Rules and their evaluation.
//!
//! A [`Rule`] is a node in a binary expression tree:
//!
//! - [`Rule::Leaf`] wraps a [`LeafRule`]: an optional base rule, its own check
//!   and a denial handler
//! - [`Rule::And`] / [`Rule::Or`] combine two child rules (see [`and`] and [`or`])
//!
//! # Evaluation Order
//!
//! Evaluation is a depth-first walk that stops as soon as the verdict is known:
//!
//! 1. **Leaf** - the base rule is evaluated first; if it denies, the denial is
//!    passed up unchanged and the leaf's own check never runs. Otherwise the
//!    leaf's check decides, and a failing check blames the leaf itself.
//! 2. **And** - the left child is evaluated; if it denies, the right child is
//!    skipped and the left denial is the result. Otherwise the right child decides.
//! 3. **Or** - the left child is evaluated; if it grants, the right child is
//!    skipped. Otherwise the right child decides, so a double failure is
//!    attributed to the right child.
//!
//! # Example
//!
//! ```rust
//! use rulegate::prelude::*;
//!
//! let user = Rule::<&'static str>::builder("user").check(|| true).build();
//! let admin = Rule::builder("admin").check(|| false).on_denied(|| "not admin").build();
//! let owner = Rule::builder("owner").check(|| false).on_denied(|| "not owner").build();
//!
//! let rule = user & (admin | owner);
//! assert_eq!(rule.to_string(), "(user & (admin | owner))");
//!
//! let outcome = rule.evaluate().unwrap();
//! assert_eq!(outcome.failing_rule().unwrap().name(), "owner");
//! ```

mod compose;
mod leaf;
mod outcome;

pub use compose::{and, or};
pub use leaf::{LeafRule, RuleBuilder};
pub use outcome::Outcome;

use crate::error::PermissionError;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A composable access-control rule.
///
/// `E` is the denial effect: whatever the application's denial handlers
/// produce (a redirect, an HTTP status, an error value). The core never
/// inspects it.
pub enum Rule<E> {
    /// An atomic rule
    Leaf(Arc<LeafRule<E>>),
    /// Both children must grant
    And(Box<Rule<E>>, Box<Rule<E>>),
    /// Either child may grant
    Or(Box<Rule<E>>, Box<Rule<E>>),
}

impl<E> Rule<E> {
    /// Start building a leaf rule.
    pub fn builder(name: impl Into<String>) -> RuleBuilder<E> {
        RuleBuilder::new(name)
    }

    /// A leaf rule with the given check and no denial handler.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::builder(name).check(check).build()
    }

    /// A leaf rule that always passes.
    pub fn allow(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// The leaf rule, if this is not a composite.
    pub fn as_leaf(&self) -> Option<&LeafRule<E>> {
        self.as_leaf_arc().map(Arc::as_ref)
    }

    /// The shared leaf rule, if this is not a composite.
    pub fn as_leaf_arc(&self) -> Option<&Arc<LeafRule<E>>> {
        match self {
            Rule::Leaf(leaf) => Some(leaf),
            Rule::And(..) | Rule::Or(..) => None,
        }
    }

    /// Evaluate the rule tree.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Predicate`] if a check on the evaluated path
    /// fails. No default verdict is substituted.
    pub fn evaluate(&self) -> Result<Outcome<E>, PermissionError> {
        match self {
            Rule::Leaf(leaf) => evaluate_leaf(leaf),
            Rule::And(left, right) => match left.evaluate()? {
                Outcome::Granted => right.evaluate(),
                denied @ Outcome::Denied(_) => {
                    trace!(right = %right, "and: left denied, skipping right");
                    Ok(denied)
                }
            },
            Rule::Or(left, right) => match left.evaluate()? {
                Outcome::Granted => {
                    trace!(right = %right, "or: left granted, skipping right");
                    Ok(Outcome::Granted)
                }
                Outcome::Denied(discarded) => {
                    trace!(discarded = discarded.name(), "or: left denied, evaluating right");
                    right.evaluate()
                }
            },
        }
    }

    /// Expand the tree into its alternative "channels".
    ///
    /// Each channel is the ordered list of rule names that must all pass for
    /// that alternative to grant access, with base chains spelled out first.
    /// Access is granted when any channel passes.
    ///
    /// ```rust
    /// use rulegate::prelude::*;
    ///
    /// let user = Rule::<()>::allow("user");
    /// let admin = Rule::builder("admin").base(user).build();
    /// let rule = admin | Rule::allow("owner");
    ///
    /// assert_eq!(rule.channels(), vec![vec!["user", "admin"], vec!["owner"]]);
    /// ```
    pub fn channels(&self) -> Vec<Vec<&str>> {
        match self {
            Rule::Leaf(leaf) => {
                let own = vec![vec![leaf.name()]];
                match leaf.base() {
                    Some(base) => serial(base.channels(), &own),
                    None => own,
                }
            }
            Rule::And(left, right) => serial(left.channels(), &right.channels()),
            Rule::Or(left, right) => {
                let mut channels = left.channels();
                channels.extend(right.channels());
                channels
            }
        }
    }
}

fn evaluate_leaf<E>(leaf: &Arc<LeafRule<E>>) -> Result<Outcome<E>, PermissionError> {
    if let Some(base) = leaf.base() {
        if let Outcome::Denied(failing) = base.evaluate()? {
            trace!(
                rule = leaf.name(),
                base = failing.name(),
                "base denied, skipping own check"
            );
            return Ok(Outcome::Denied(failing));
        }
    }

    let passed = leaf.check()?;
    trace!(rule = leaf.name(), passed, "rule checked");
    if passed {
        Ok(Outcome::Granted)
    } else {
        Ok(Outcome::Denied(Arc::clone(leaf)))
    }
}

/// Every `pre` channel followed by every `post` channel.
fn serial<'a>(pre: Vec<Vec<&'a str>>, post: &[Vec<&'a str>]) -> Vec<Vec<&'a str>> {
    pre.into_iter()
        .flat_map(|head| {
            post.iter().map(move |tail| {
                let mut channel = head.clone();
                channel.extend(tail.iter().copied());
                channel
            })
        })
        .collect()
}

impl<E> Clone for Rule<E> {
    fn clone(&self) -> Self {
        match self {
            Rule::Leaf(leaf) => Rule::Leaf(Arc::clone(leaf)),
            Rule::And(left, right) => Rule::And(left.clone(), right.clone()),
            Rule::Or(left, right) => Rule::Or(left.clone(), right.clone()),
        }
    }
}

impl<E> fmt::Display for Rule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Leaf(leaf) => match leaf.base() {
                Some(base) => write!(f, "({base} => {})", leaf.name()),
                None => f.write_str(leaf.name()),
            },
            Rule::And(left, right) => write!(f, "({left} & {right})"),
            Rule::Or(left, right) => write!(f, "({left} | {right})"),
        }
    }
}

impl<E> fmt::Debug for Rule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Leaf(leaf) => f.debug_tuple("Leaf").field(leaf).finish(),
            Rule::And(left, right) => f.debug_tuple("And").field(left).field(right).finish(),
            Rule::Or(left, right) => f.debug_tuple("Or").field(left).field(right).finish(),
        }
    }
}
