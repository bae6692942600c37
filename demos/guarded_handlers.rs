//! Guarded handlers: protect request handlers with a permission.
//!
//! This example demonstrates the guard helpers:
//! - `require()` with `?` for early exit from a handler
//! - `guard_async()` around an async handler body
//! - Audit logging through `PermissionOptions`
//!
//! ## Run
//! ```sh
//! cargo run -p demos --example guarded_handlers
//! ```

use rulegate::prelude::*;

#[derive(Debug)]
struct Status(u16);

fn api_key_rule(api_key: Option<&'static str>) -> Rule<Status> {
    let present = Rule::builder("api_key_present")
        .check(move || api_key.is_some())
        .on_denied(|| Status(401))
        .build();

    Rule::builder("api_key_valid")
        .base(present)
        .check(move || api_key == Some("s3cret"))
        .on_denied(|| Status(403))
        .build()
}

fn audited(name: &str, rule: Rule<Status>) -> Permission<Status> {
    let options = PermissionOptions::builder().audit(AuditMode::All).build();
    Permission::new(name, rule).with_options(options)
}

fn delete_report(api_key: Option<&'static str>) -> Result<&'static str, PermissionError> {
    audited("delete_report", api_key_rule(api_key)).require()?;
    Ok("report deleted")
}

async fn fetch_report(api_key: Option<&'static str>) -> Result<String, PermissionError> {
    let mut permission = audited("fetch_report", api_key_rule(api_key));
    let result = permission
        .guard_async(async { "report body".to_string() })
        .await?;
    Ok(result.unwrap_or_else(|status| format!("HTTP {status:?}")))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulegate::audit=info".into()),
        )
        .init();

    for api_key in [None, Some("guess"), Some("s3cret")] {
        match delete_report(api_key) {
            Ok(message) => println!("delete {api_key:?}: {message}"),
            Err(e) => println!("delete {api_key:?}: {e}"),
        }

        match fetch_report(api_key).await {
            Ok(body) => println!("fetch  {api_key:?}: {body}"),
            Err(e) => println!("fetch  {api_key:?}: {e}"),
        }
    }
}
