//! Integration tests for rulegate
//!
//! These tests exercise the public API end to end with call-count probes, so
//! that short-circuiting and denial dispatch are observed rather than assumed.
//!
//! # Test Structure
//!
//! - **Evaluation**: base chains and AND/OR short-circuiting
//! - **Denial Dispatch**: which handler `deny()` runs, and how often
//! - **Misuse**: `deny()` without a failed `check()`
//! - **Scenarios**: the forum permissions a web application would define
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rulegate::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Counters for one probe rule
#[derive(Clone, Default)]
struct Calls {
    checks: Arc<AtomicUsize>,
    denials: Arc<AtomicUsize>,
}

impl Calls {
    fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    fn denials(&self) -> usize {
        self.denials.load(Ordering::SeqCst)
    }
}

/// Build a rule with a fixed verdict whose check and handler calls are counted.
/// The denial effect is the rule name.
fn probe(name: &'static str, passes: bool, base: Option<Rule<&'static str>>) -> (Rule<&'static str>, Calls) {
    let calls = Calls::default();
    let (checks, denials) = (Arc::clone(&calls.checks), Arc::clone(&calls.denials));

    let mut builder = Rule::builder(name)
        .check(move || {
            checks.fetch_add(1, Ordering::SeqCst);
            passes
        })
        .on_denied(move || {
            denials.fetch_add(1, Ordering::SeqCst);
            name
        });
    if let Some(base) = base {
        builder = builder.base(base);
    }

    (builder.build(), calls)
}

fn blamed(rule: &Rule<&'static str>) -> Option<String> {
    rule.evaluate()
        .unwrap()
        .failing_rule()
        .map(|rule| rule.name().to_string())
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_leaf_verdict_matches_check() {
    for passes in [true, false] {
        let (rule, calls) = probe("r", passes, None);
        let outcome = rule.evaluate().unwrap();
        assert_eq!(outcome.is_granted(), passes);
        assert_eq!(blamed(&rule).is_none(), passes);
        assert_eq!(calls.checks(), 2);
    }
}

#[test]
fn test_failed_base_is_propagated_and_skips_own_check() {
    let (base, base_calls) = probe("base", false, None);
    let (rule, rule_calls) = probe("rule", true, Some(base));

    assert_eq!(blamed(&rule).as_deref(), Some("base"));
    assert_eq!(base_calls.checks(), 1);
    assert_eq!(rule_calls.checks(), 0);
}

#[test]
fn test_and_short_circuit() {
    let (a, _) = probe("a", false, None);
    let (b_base, b_base_calls) = probe("b_base", true, None);
    let (b, b_calls) = probe("b", true, Some(b_base));

    assert_eq!(blamed(&and(a, b)).as_deref(), Some("a"));
    assert_eq!(b_calls.checks(), 0);
    assert_eq!(b_base_calls.checks(), 0);
}

#[test]
fn test_or_short_circuit() {
    let (a, _) = probe("a", true, None);
    let (b_base, b_base_calls) = probe("b_base", false, None);
    let (b, b_calls) = probe("b", false, Some(b_base));

    assert!(or(a, b).evaluate().unwrap().is_granted());
    assert_eq!(b_calls.checks(), 0);
    assert_eq!(b_base_calls.checks(), 0);
}

#[test]
fn test_or_both_fail_blames_right() {
    let (a, a_calls) = probe("a", false, None);
    let (b, _) = probe("b", false, None);

    assert_eq!(blamed(&or(a, b)).as_deref(), Some("b"));
    assert_eq!(a_calls.checks(), 1);
}

#[test]
fn test_association_preserves_verdicts() {
    for bits in 0u8..8 {
        let truth = [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0];
        let leaf = move |i: usize| Rule::<()>::new(["a", "b", "c"][i], move || truth[i]);

        let left = (leaf(0) & leaf(1)) & leaf(2);
        let right = leaf(0) & (leaf(1) & leaf(2));
        assert_eq!(
            left.evaluate().unwrap().is_granted(),
            right.evaluate().unwrap().is_granted(),
            "truth assignment {truth:?}"
        );
        assert_eq!(
            left.evaluate().unwrap().is_granted(),
            truth.iter().all(|t| *t)
        );
    }
}

// ============================================================================
// Denial Dispatch
// ============================================================================

#[test]
fn test_deny_runs_only_blamed_handler_once() {
    let (user, user_calls) = probe("user", true, None);
    let (admin, admin_calls) = probe("admin", false, Some(user));
    let mut permission = Permission::new("admin_panel", admin);

    assert!(!permission.check().unwrap());
    assert_eq!(permission.deny().unwrap(), Some("admin"));
    assert_eq!(admin_calls.denials(), 1);
    assert_eq!(user_calls.denials(), 0);
}

#[test]
fn test_or_passing_never_denies() {
    let (a, a_calls) = probe("a", false, None);
    let (c, c_calls) = probe("c", true, None);
    let mut permission = Permission::new("p", or(a, c));

    assert!(permission.check().unwrap());
    assert!(permission.deny().unwrap_err().is_misuse());
    assert_eq!(a_calls.denials(), 0);
    assert_eq!(c_calls.denials(), 0);
}

#[test]
fn test_or_both_fail_denies_with_right() {
    let (a, a_calls) = probe("a", false, None);
    let (c, c_calls) = probe("c", false, None);
    let mut permission = Permission::new("p", or(a, c));

    assert!(!permission.check().unwrap());
    assert_eq!(permission.deny().unwrap(), Some("c"));
    assert_eq!(a_calls.denials(), 0);
    assert_eq!(c_calls.denials(), 1);
}

#[test]
fn test_deny_does_not_reevaluate() {
    let (rule, calls) = probe("r", false, None);
    let mut permission = Permission::new("p", rule);

    permission.check().unwrap();
    permission.deny().unwrap();
    assert_eq!(calls.checks(), 1);
}

// ============================================================================
// Misuse
// ============================================================================

#[test]
fn test_deny_without_check() {
    let (rule, calls) = probe("r", false, None);
    let mut permission = Permission::new("p", rule);

    let err = permission.deny().unwrap_err();
    assert!(err.is_misuse());
    assert!(matches!(err, PermissionError::NotChecked { .. }));
    assert_eq!(calls.denials(), 0);
    assert_eq!(calls.checks(), 0);
}

#[test]
fn test_deny_after_successful_check() {
    let (rule, calls) = probe("r", true, None);
    let mut permission = Permission::new("p", rule);

    assert!(permission.check().unwrap());
    let err = permission.deny().unwrap_err();
    assert!(matches!(err, PermissionError::CheckPassed { .. }));
    assert_eq!(calls.denials(), 0);
}

#[test]
fn test_predicate_error_propagates_unchanged() {
    #[derive(Debug, thiserror::Error)]
    #[error("session cookie malformed")]
    struct BadCookie;

    let rule = Rule::<()>::builder("user")
        .try_check(|| Err::<bool, _>(BadCookie))
        .build();
    let mut permission = Permission::new("p", rule);

    let source = permission.check().unwrap_err().into_source().unwrap();
    assert!(source.downcast_ref::<BadCookie>().is_some());
}

// ============================================================================
// Scenarios
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Response {
    Redirect(&'static str),
    Abort(u16),
}

struct Session {
    user_id: Option<u64>,
    role: &'static str,
}

/// "Edit topic": admins, or the logged-in owner of the topic
struct EditTopic {
    session: Arc<Session>,
    topic_owner: u64,
}

impl RuleFactory for EditTopic {
    type Effect = Response;

    fn rule(&self) -> Rule<Response> {
        let user = {
            let session = Arc::clone(&self.session);
            Rule::builder("user")
                .check(move || session.user_id.is_some())
                .on_denied(|| Response::Redirect("/login"))
                .build()
        };
        let admin = {
            let session = Arc::clone(&self.session);
            Rule::builder("admin")
                .base(user.clone())
                .check(move || session.role == "admin")
                .on_denied(|| Response::Abort(403))
                .build()
        };
        let owner = {
            let session = Arc::clone(&self.session);
            let topic_owner = self.topic_owner;
            Rule::builder("topic_owner")
                .base(user)
                .check(move || session.user_id == Some(topic_owner))
                .on_denied(|| Response::Abort(404))
                .build()
        };
        admin | owner
    }
}

fn edit_topic(user_id: Option<u64>, role: &'static str, topic_owner: u64) -> Permission<Response> {
    let session = Arc::new(Session { user_id, role });
    Permission::from_factory(&EditTopic { session, topic_owner })
}

#[test]
fn test_scenario_anonymous_is_redirected() {
    let mut permission = edit_topic(None, "guest", 1);
    assert_eq!(permission.name(), "EditTopic");
    assert!(!permission.check().unwrap());
    assert_eq!(permission.deny().unwrap(), Some(Response::Redirect("/login")));
}

#[test]
fn test_scenario_admin_is_allowed() {
    let mut permission = edit_topic(Some(2), "admin", 1);
    assert!(permission.check().unwrap());
}

#[test]
fn test_scenario_owner_is_allowed() {
    let mut permission = edit_topic(Some(1), "member", 1);
    let result = permission.guard(|| "saved").unwrap();
    assert_eq!(result, Guarded::Allowed("saved"));
}

#[test]
fn test_scenario_stranger_gets_owner_denial() {
    let mut permission = edit_topic(Some(3), "member", 1);
    let result = permission.guard(|| "saved").unwrap();
    assert_eq!(result, Guarded::Denied(Some(Response::Abort(404))));
}

#[test]
fn test_scenario_require_in_handler() {
    fn handler(permission: &mut Permission<Response>) -> Result<&'static str, PermissionError> {
        permission.require()?;
        Ok("saved")
    }

    assert_eq!(handler(&mut edit_topic(Some(1), "member", 1)).unwrap(), "saved");

    let err = handler(&mut edit_topic(Some(3), "member", 1)).unwrap_err();
    match err {
        PermissionError::Denied { permission, rule } => {
            assert_eq!(permission, "EditTopic");
            assert_eq!(rule, "topic_owner");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_scenario_show_channels() {
    let permission = edit_topic(None, "guest", 1);
    assert_eq!(
        permission.show(),
        vec![vec!["user", "admin"], vec!["user", "topic_owner"]]
    );
    assert_eq!(
        permission.rule().to_string(),
        "((user => admin) | (user => topic_owner))"
    );
}

#[test]
fn test_scenario_audit_options() {
    let options = PermissionOptions::builder().audit(AuditMode::Denials).build();
    let mut permission = edit_topic(None, "guest", 1).with_options(options);
    assert!(!permission.check().unwrap());
    assert_eq!(permission.options().audit, AuditMode::Denials);
}
