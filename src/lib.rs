//! # minimal
//!
//! A minimalist MVC dispatch layer: a route table and URL-pattern matcher that
//! turns `(method, path)` into a controller, an action and the parameters bound
//! from the path.
//!
//! ## Quick Start
//!
//! ```rust
//! use minimal::{Dispatch, Method, Route, Router};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Controller { Home, Users, Files }
//!
//! let mut router = Router::new();
//! router.get("/", Route::new(Controller::Home))?;
//! router.get("/users/list", Route::new(Controller::Users).action("list"))?;
//! router.get("/users/$id", Route::new(Controller::Users).action("show"))?;
//! router.get("/files/$path...", Route::new(Controller::Files))?;
//! router.freeze();
//!
//! // Literal templates win over variables, whatever the registration order.
//! let found = router.dispatch(&Method::Get, "/users/list").found().unwrap();
//! assert_eq!(found.route.action_name(), "list");
//!
//! let found = router.dispatch(&Method::Get, "/files/docs/a.md").found().unwrap();
//! assert_eq!(found.parameters.get_list("path"), Some(vec!["docs", "a.md"]));
//!
//! assert!(matches!(router.dispatch(&Method::Get, "/missing"), Dispatch::NotFound));
//! # Ok::<(), minimal::RegisterError>(())
//! ```

// ── Core routing ──────────────────────────────────────────────────────────────
pub mod router;

// ── Payloads, parameters and manifests ───────────────────────────────────────
pub mod config;
pub mod context;
pub mod http;
pub mod route;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::{ConfigError, RouterConfig};
pub use context::Parameters;
pub use http::Method;
pub use route::Route;
pub use router::{
    CompileError, Dispatch, Match, Pattern, RegisterError, RouteTable, Router, SharedRoutes,
};
