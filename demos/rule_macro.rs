//! Rule macro: define leaf rules as plain check functions.
//!
//! This example demonstrates `#[rule]`:
//! - Parameters become values captured by the rule
//! - `base = ...` chains a prerequisite rule
//! - `deny = ...` sets the denial effect
//! - Fallible checks return `Result<bool, E>`
//!
//! ## Run
//! ```sh
//! cargo run -p demos --example rule_macro
//! ```

use rulegate::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
enum Denial {
    SignIn,
    Forbidden(&'static str),
}

type Roles = Arc<HashMap<u64, String>>;

#[rule(effect = Denial, deny = Denial::SignIn)]
fn signed_in(user_id: Option<u64>) -> bool {
    user_id.is_some()
}

#[rule(
    name = "moderator",
    effect = Denial,
    base = signed_in(user_id),
    deny = Denial::Forbidden("moderators only")
)]
fn is_moderator(user_id: Option<u64>, roles: Roles) -> Result<bool, String> {
    let user_id = user_id.ok_or("signed_in base rule let an anonymous user through")?;
    match roles.get(&user_id) {
        Some(role) => Ok(role == "moderator"),
        None => Err(format!("no role record for user {user_id}")),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulegate=warn".into()),
        )
        .with_target(false)
        .init();

    let roles: Roles = Arc::new(HashMap::from([
        (1, "moderator".to_string()),
        (2, "member".to_string()),
    ]));

    for user_id in [None, Some(1), Some(2), Some(3)] {
        let mut permission = Permission::new("pin_topic", is_moderator(user_id, Arc::clone(&roles)));
        let verdict = match permission.guard(|| "pinned") {
            Ok(Guarded::Allowed(done)) => done.to_string(),
            Ok(Guarded::Denied(effect)) => format!("denied: {effect:?}"),
            Err(e) => format!("error: {e}"),
        };
        println!("user {user_id:?}: {verdict}");
    }
}
