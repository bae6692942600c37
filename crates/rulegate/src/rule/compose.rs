//! AND / OR combinators.
//!
//! Combinators take ownership of both operands and return a new composite node;
//! the operands themselves are never modified. Chaining is left-associative, so
//! `a & b & c` is `and(and(a, b), c)`.

use crate::rule::Rule;
use std::ops::{BitAnd, BitOr};

/// Both `left` and `right` must grant. `right` is skipped once `left` denies.
pub fn and<E>(left: Rule<E>, right: Rule<E>) -> Rule<E> {
    Rule::And(Box::new(left), Box::new(right))
}

/// Either `left` or `right` must grant. `right` is skipped once `left` grants.
pub fn or<E>(left: Rule<E>, right: Rule<E>) -> Rule<E> {
    Rule::Or(Box::new(left), Box::new(right))
}

impl<E> Rule<E> {
    /// Method form of [`and`].
    #[must_use]
    pub fn and(self, other: Rule<E>) -> Rule<E> {
        and(self, other)
    }

    /// Method form of [`or`].
    #[must_use]
    pub fn or(self, other: Rule<E>) -> Rule<E> {
        or(self, other)
    }
}

impl<E> BitAnd for Rule<E> {
    type Output = Rule<E>;

    fn bitand(self, rhs: Rule<E>) -> Rule<E> {
        and(self, rhs)
    }
}

impl<E> BitOr for Rule<E> {
    type Output = Rule<E>;

    fn bitor(self, rhs: Rule<E>) -> Rule<E> {
        or(self, rhs)
    }
}
