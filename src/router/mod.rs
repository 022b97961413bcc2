//! Request routing — map URL templates and HTTP methods to route payloads.
//!
//! Three segment kinds are supported in templates:
//!
//! | Template                     | Example match           | Bindings                        |
//! |------------------------------|-------------------------|---------------------------------|
//! | `/users`                     | `/users`                | *(none)*                        |
//! | `/users/$id`                 | `/users/42`             | `id → "42"`                     |
//! | `/files/$rest...`            | `/files/docs/readme.md` | `rest → ["docs", "readme.md"]`  |
//!
//! Trailing and repeated slashes are normalized on both templates and incoming
//! paths, so `/users/` and `/users` are treated as equivalent.
//!
//! When several templates could match the same path, the most specific one wins
//! regardless of registration order: literal templates first, then templates with
//! variables, then templates ending in a collector; shorter before longer; and
//! finally by template text. See [`priority`].
//!
//! [`RouteTable`] is the generic registry. [`Router`] layers the MVC payload
//! ([`Route`]) on top and resolves a request into a [`Dispatch`].

use tracing::debug;

use crate::context::Parameters;
use crate::http::Method;
use crate::route::Route;

pub mod matcher;
pub mod pattern;
pub mod priority;
pub mod shared;
pub mod table;

pub use matcher::{Bindings, Match, split_path};
pub use pattern::{CompileError, Pattern, Segment};
pub use priority::PriorityKey;
pub use shared::{Routes, SharedRoutes, SwapError};
pub use table::{DuplicatePolicy, RegisterError, RouteTable};

/// A route resolved for one request.
#[derive(Debug)]
pub struct Resolved<'r, C> {
    /// The template that matched.
    pub pattern: &'r Pattern,
    /// The route registered for the template and request method.
    pub route: &'r Route<C>,
    /// Route defaults merged with the values bound from the path.
    pub parameters: Parameters,
}

/// Outcome of [`Router::dispatch`].
#[derive(Debug)]
pub enum Dispatch<'r, C> {
    /// A route matched.
    Found(Resolved<'r, C>),
    /// The path matches at least one template, but none registered for the
    /// request method. `allowed` lists the methods that are.
    MethodNotAllowed { allowed: Vec<Method> },
    /// No template matches the path.
    NotFound,
}

impl<'r, C> Dispatch<'r, C> {
    /// The resolved route, if any.
    pub fn found(self) -> Option<Resolved<'r, C>> {
        match self {
            Dispatch::Found(resolved) => Some(resolved),
            _ => None,
        }
    }

    /// Returns `true` for [`Dispatch::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Dispatch::Found(_))
    }
}

/// MVC dispatch facade over a [`RouteTable`] of [`Route`] payloads.
///
/// `C` is the caller's controller reference (an enum, a function pointer, an
/// `Arc<dyn Trait>`), bound once at registration time.
///
/// # Examples
///
/// ```
/// use minimal::route::Route;
/// use minimal::router::{Dispatch, Router};
///
/// #[derive(Debug, PartialEq)]
/// enum Controller { Users }
///
/// let mut router = Router::new();
/// router.get("/users/$id", Route::new(Controller::Users).action("show")).unwrap();
/// router.freeze();
///
/// match router.dispatch(&"GET".into(), "/users/42") {
///     Dispatch::Found(resolved) => {
///         assert_eq!(resolved.route.controller(), &Controller::Users);
///         assert_eq!(resolved.route.action_name(), "show");
///         assert_eq!(resolved.parameters.get_str("id"), Some("42"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug)]
pub struct Router<C> {
    table: RouteTable<Route<C>>,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Router<C> {
    /// Create a new, empty `Router` that rejects duplicate registrations.
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
        }
    }

    /// Create a new, empty `Router` with the given duplicate-registration policy.
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            table: RouteTable::with_policy(policy),
        }
    }

    /// Register `route` for `method` requests matching `template`.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::register`].
    pub fn route(
        &mut self,
        method: Method,
        template: &str,
        route: Route<C>,
    ) -> Result<(), RegisterError> {
        self.table.register(template, method, route)
    }

    /// Register `route` for `GET` requests matching `template`.
    pub fn get(&mut self, template: &str, route: Route<C>) -> Result<(), RegisterError> {
        self.route(Method::Get, template, route)
    }

    /// Register `route` for `POST` requests matching `template`.
    pub fn post(&mut self, template: &str, route: Route<C>) -> Result<(), RegisterError> {
        self.route(Method::Post, template, route)
    }

    /// Register `route` for `PUT` requests matching `template`.
    pub fn put(&mut self, template: &str, route: Route<C>) -> Result<(), RegisterError> {
        self.route(Method::Put, template, route)
    }

    /// Register `route` for `DELETE` requests matching `template`.
    pub fn delete(&mut self, template: &str, route: Route<C>) -> Result<(), RegisterError> {
        self.route(Method::Delete, template, route)
    }

    /// Register `route` for `PATCH` requests matching `template`.
    pub fn patch(&mut self, template: &str, route: Route<C>) -> Result<(), RegisterError> {
        self.route(Method::Patch, template, route)
    }

    /// Register `route` for `OPTIONS` requests matching `template`.
    pub fn options(&mut self, template: &str, route: Route<C>) -> Result<(), RegisterError> {
        self.route(Method::Options, template, route)
    }

    /// Stop accepting registrations. See [`RouteTable::freeze`].
    pub fn freeze(&mut self) {
        self.table.freeze();
    }

    /// Return `true` once [`Router::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.table.is_frozen()
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Return `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The underlying route table.
    pub fn table(&self) -> &RouteTable<Route<C>> {
        &self.table
    }

    /// Resolve `method` and `raw_path` into a [`Dispatch`].
    ///
    /// On a match the route's default parameters are merged with the bound path
    /// values. When nothing matches for `method`, the table is asked which other
    /// methods would have matched so the caller can tell `404` from `405`.
    pub fn dispatch(&self, method: &Method, raw_path: &str) -> Dispatch<'_, C> {
        if let Some(hit) = self.table.lookup(method, raw_path) {
            let pattern = hit.pattern();
            let route = hit.payload();
            let parameters = Parameters::resolve(route.default_parameters(), hit.bindings());
            return Dispatch::Found(Resolved {
                pattern,
                route,
                parameters,
            });
        }

        let allowed = self.table.allowed_methods(raw_path);
        if allowed.is_empty() {
            Dispatch::NotFound
        } else {
            debug!(%method, path = raw_path, ?allowed, "method not allowed");
            Dispatch::MethodNotAllowed { allowed }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Controller {
        Index,
        Users,
        Files,
    }

    fn router() -> Router<Controller> {
        let mut router = Router::new();
        router.get("/", Route::new(Controller::Index)).unwrap();
        router
            .get("/users/$id", Route::new(Controller::Users).action("show"))
            .unwrap();
        router
            .delete("/users/$id", Route::new(Controller::Users).action("destroy"))
            .unwrap();
        router
            .get(
                "/files/$path...",
                Route::new(Controller::Files).parameter("disposition", "inline"),
            )
            .unwrap();
        router.freeze();
        router
    }

    #[test]
    fn router_starts_empty() {
        let router: Router<()> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
        assert!(Router::<()>::default().is_empty());
    }

    #[test]
    fn router_len_counts_every_method() {
        let mut router = Router::new();
        router.put("/r", Route::new(())).unwrap();
        router.patch("/r", Route::new(())).unwrap();
        router.post("/r", Route::new(())).unwrap();
        router.options("/r", Route::new(())).unwrap();
        assert_eq!(router.len(), 4);
        assert!(!router.is_empty());
        assert_eq!(router.table().patterns().count(), 1);
    }

    #[test]
    fn dispatch_found_resolves_action_and_parameters() {
        let router = router();
        let resolved = router.dispatch(&Method::Get, "/users/42").found().unwrap();
        assert_eq!(resolved.pattern.as_str(), "/users/$id");
        assert_eq!(*resolved.route.controller(), Controller::Users);
        assert_eq!(resolved.route.action_name(), "show");
        assert_eq!(resolved.parameters.get_str("id"), Some("42"));

        let resolved = router.dispatch(&Method::Delete, "/users/42").found().unwrap();
        assert_eq!(resolved.route.action_name(), "destroy");
    }

    #[test]
    fn dispatch_merges_defaults_with_collector() {
        let router = router();
        let resolved = router
            .dispatch(&Method::Get, "/files/a/b.txt?download=1")
            .found()
            .unwrap();
        assert_eq!(
            resolved.parameters.into_json(),
            json!({ "disposition": "inline", "path": ["a", "b.txt"] })
        );
    }

    #[test]
    fn dispatch_root() {
        let router = router();
        let resolved = router.dispatch(&Method::Get, "/").found().unwrap();
        assert_eq!(*resolved.route.controller(), Controller::Index);
        assert_eq!(resolved.route.action_name(), "index");
        assert!(resolved.parameters.is_empty());
    }

    #[test]
    fn dispatch_method_not_allowed() {
        let router = router();
        match router.dispatch(&Method::Post, "/users/42") {
            Dispatch::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, [Method::Get, Method::Delete]);
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn dispatch_not_found() {
        let router = router();
        assert!(matches!(
            router.dispatch(&Method::Get, "/users"),
            Dispatch::NotFound
        ));
        assert!(!router.dispatch(&Method::Get, "/missing").is_found());
    }

    #[test]
    fn register_after_freeze_fails() {
        let mut router = router();
        assert_eq!(
            router.get("/late", Route::new(Controller::Index)),
            Err(RegisterError::TableFrozen)
        );
    }
}
