//! Edit topic: a forum permission built from composed rules.
//!
//! This example demonstrates the core API:
//! - `Rule::builder()` with base rules, checks and denial handlers
//! - `|` / `&` composition
//! - `RuleFactory` for permissions parameterized by a resource id
//! - `check()` followed by `deny()` on the rule that caused the failure
//!
//! ## Run
//! ```sh
//! RUST_LOG=rulegate=trace cargo run -p demos --example edit_topic
//! ```

use rulegate::prelude::*;
use std::sync::Arc;

#[derive(Debug)]
enum Response {
    Redirect(&'static str),
    Abort(u16),
}

struct Session {
    user_id: Option<u64>,
    role: &'static str,
}

struct EditTopic {
    session: Arc<Session>,
    topic_id: u64,
}

impl EditTopic {
    /// Stand-in for a database lookup.
    fn topic_owner(topic_id: u64) -> u64 {
        topic_id % 10
    }
}

impl RuleFactory for EditTopic {
    type Effect = Response;

    fn rule(&self) -> Rule<Response> {
        let session = Arc::clone(&self.session);
        let user = Rule::builder("user")
            .check(move || session.user_id.is_some())
            .on_denied(|| Response::Redirect("/account/signin"))
            .build();

        let session = Arc::clone(&self.session);
        let admin = Rule::builder("admin")
            .base(user.clone())
            .check(move || session.role == "admin")
            .on_denied(|| Response::Abort(403))
            .build();

        let session = Arc::clone(&self.session);
        let owner = Self::topic_owner(self.topic_id);
        let topic_owner = Rule::builder("topic_owner")
            .base(user)
            .check(move || session.user_id == Some(owner))
            .on_denied(|| Response::Abort(403))
            .build();

        admin | topic_owner
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulegate=debug".into()),
        )
        .with_target(false)
        .init();

    let visitors = [
        ("anonymous", None, "guest"),
        ("admin", Some(1), "admin"),
        ("owner", Some(3), "member"),
        ("stranger", Some(4), "member"),
    ];

    for (label, user_id, role) in visitors {
        let session = Arc::new(Session { user_id, role });
        let mut permission = Permission::from_factory(&EditTopic {
            session,
            topic_id: 13,
        });

        if label == "anonymous" {
            println!("Rule: {}", permission.rule());
            for channel in permission.show() {
                println!("  channel: {}", channel.join(" -> "));
            }
            println!();
        }

        match permission.check() {
            Ok(true) => println!("{label:>10}: edit allowed"),
            Ok(false) => match permission.deny() {
                Ok(effect) => println!("{label:>10}: denied -> {effect:?}"),
                Err(e) => eprintln!("{label:>10}: denial handler failed: {e}"),
            },
            Err(e) => eprintln!("{label:>10}: check failed: {e}"),
        }
    }
}
