//! Loads a route manifest, then resolves a handful of requests.
//!
//! ```text
//! RUST_LOG=minimal=debug cargo run --example routing
//! ```

use minimal::{Dispatch, Method, RouterConfig};
use tracing_subscriber::EnvFilter;

const MANIFEST: &str = r#"
[[routes]]
path = "/"
controller = "home"

[[routes]]
path = "/users"
controller = "users"

[[routes]]
path = "/users/$id"
controller = "users"
action = "show"
model = "user"

[[routes]]
path = "/users/$id/posts/$rest..."
controller = "posts"
parameters = { per_page = 20 }
"#;

#[derive(Debug, Clone, Copy)]
enum Controller {
    Home,
    Users,
    Posts,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let router = RouterConfig::from_toml_str(MANIFEST)?.build(|name| match name {
        "home" => Some(Controller::Home),
        "users" => Some(Controller::Users),
        "posts" => Some(Controller::Posts),
        _ => None,
    })?;

    for (method, path) in [
        (Method::Get, "/users/42"),
        (Method::Get, "/users/42/posts/1/2"),
        (Method::Get, "/users"),
        (Method::Delete, "/users/42"),
        (Method::Get, "/missing"),
    ] {
        match router.dispatch(&method, path) {
            Dispatch::Found(resolved) => println!(
                "{method} {path} -> {:?}::{} via {} with {}",
                resolved.route.controller(),
                resolved.route.action_name(),
                resolved.pattern,
                resolved.parameters.into_json(),
            ),
            Dispatch::MethodNotAllowed { allowed } => {
                println!("{method} {path} -> 405 (allowed: {allowed:?})")
            }
            Dispatch::NotFound => println!("{method} {path} -> 404"),
        }
    }

    Ok(())
}
