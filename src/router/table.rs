//! The route table: compiled patterns, per-method payloads and their priority order.
//!
//! A table is filled by a single writer during bootstrap and then frozen. Once
//! frozen it is never mutated again and can be shared across threads (wrap it in
//! an `Arc`, or use [`SharedRoutes`](super::shared::SharedRoutes) to swap whole
//! tables at runtime).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::matcher::{Match, split_path};
use super::pattern::{CompileError, Pattern};
use crate::http::Method;

/// Errors returned by [`RouteTable::register`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("route table is frozen; no further routes can be registered")]
    TableFrozen,

    #[error("route {method} {template} is already registered")]
    DuplicateRoute { template: String, method: Method },
}

/// What [`RouteTable::register`] does when the (pattern, method) pair already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with [`RegisterError::DuplicateRoute`].
    #[default]
    Reject,
    /// Overwrite the previous payload.
    Replace,
}

// One distinct pattern and the payloads registered for it, keyed by method.
#[derive(Debug)]
struct Entry<T> {
    pattern: Pattern,
    methods: HashMap<Method, T>,
}

/// Registry of route templates and their payloads.
///
/// `T` is the caller's payload (a handler, a controller reference, an enum
/// variant); the table never inspects it.
///
/// # Examples
///
/// ```
/// use minimal::http::Method;
/// use minimal::router::RouteTable;
///
/// let mut table = RouteTable::new();
/// table.register("/users/list", Method::Get, "list").unwrap();
/// table.register("/users/$id", Method::Get, "show").unwrap();
/// table.freeze();
///
/// let hit = table.lookup(&Method::Get, "/users/list").unwrap();
/// assert_eq!(*hit.payload(), "list");
///
/// let hit = table.lookup(&Method::Get, "/users/7").unwrap();
/// assert_eq!(hit.bindings().get("id"), Some("7"));
///
/// assert!(table.lookup(&Method::Post, "/users/7").is_none());
/// ```
#[derive(Debug)]
pub struct RouteTable<T> {
    entries: Vec<Entry<T>>,
    // Normalized template → index into `entries`.
    index: HashMap<String, usize>,
    // Indices into `entries`, kept sorted by `Pattern::priority_key`.
    order: Vec<usize>,
    routes: usize,
    policy: DuplicatePolicy,
    frozen: bool,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    /// Create an empty table that rejects duplicate registrations.
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    /// Create an empty table with the given duplicate-registration policy.
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            order: Vec::new(),
            routes: 0,
            policy,
            frozen: false,
        }
    }

    /// Compile `template` and register `payload` for it under `method`.
    ///
    /// # Errors
    ///
    /// - [`RegisterError::TableFrozen`] — [`freeze`](Self::freeze) was already called.
    /// - [`RegisterError::Compile`] — the template is invalid.
    /// - [`RegisterError::DuplicateRoute`] — the pair exists and the policy is
    ///   [`DuplicatePolicy::Reject`].
    pub fn register(
        &mut self,
        template: &str,
        method: Method,
        payload: T,
    ) -> Result<(), RegisterError> {
        if self.frozen {
            return Err(RegisterError::TableFrozen);
        }

        let pattern = Pattern::compile(template)?;

        let slot = match self.index.get(pattern.as_str()).copied() {
            Some(slot) => slot,
            None => self.insert_pattern(pattern),
        };

        let entry = &mut self.entries[slot];
        if entry.methods.contains_key(&method) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(RegisterError::DuplicateRoute {
                        template: entry.pattern.as_str().to_owned(),
                        method,
                    });
                }
                DuplicatePolicy::Replace => {
                    warn!(%method, template = %entry.pattern, "replacing registered route");
                    entry.methods.insert(method, payload);
                    return Ok(());
                }
            }
        }

        debug!(%method, template = %entry.pattern, "route registered");
        entry.methods.insert(method, payload);
        self.routes += 1;
        Ok(())
    }

    // Add a new distinct pattern, keeping `order` sorted by priority.
    fn insert_pattern(&mut self, pattern: Pattern) -> usize {
        let slot = self.entries.len();
        let position = {
            let key = pattern.priority_key();
            self.order
                .partition_point(|&i| self.entries[i].pattern.priority_key() < key)
        };
        self.index.insert(pattern.as_str().to_owned(), slot);
        self.entries.push(Entry {
            pattern,
            methods: HashMap::new(),
        });
        self.order.insert(position, slot);
        slot
    }

    /// Mark the table read-only. Calling it again has no effect.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        debug_assert!(
            self.order.windows(2).all(|pair| {
                self.entries[pair[0]].pattern.priority_key()
                    < self.entries[pair[1]].pattern.priority_key()
            }),
            "priority order out of sync"
        );
        self.frozen = true;
        info!(
            routes = self.routes,
            patterns = self.entries.len(),
            "route table frozen"
        );
    }

    /// Returns `true` once [`freeze`](Self::freeze) has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The duplicate-registration policy of this table.
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Number of registered (pattern, method) routes.
    pub fn len(&self) -> usize {
        self.routes
    }

    /// Returns `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }

    /// Distinct patterns in priority order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.order.iter().map(|&i| &self.entries[i].pattern)
    }

    /// The payload registered for exactly this template and method.
    ///
    /// The template is normalized first, so `users/` finds `/users`. Invalid
    /// templates simply find nothing.
    pub fn get(&self, template: &str, method: &Method) -> Option<&T> {
        let pattern = Pattern::compile(template).ok()?;
        let &slot = self.index.get(pattern.as_str())?;
        self.entries[slot].methods.get(method)
    }

    /// Find the highest-priority pattern registered for `method` that matches
    /// `raw_path`.
    ///
    /// `raw_path` may carry a query string, a fragment and percent-escapes. `None`
    /// is the ordinary "not found" outcome.
    pub fn lookup(&self, method: &Method, raw_path: &str) -> Option<Match<'_, T>> {
        let path = split_path(raw_path);

        for &slot in &self.order {
            let entry = &self.entries[slot];
            let Some(payload) = entry.methods.get(method) else {
                continue;
            };
            if let Some(bindings) = entry.pattern.bind(&path) {
                debug!(%method, path = raw_path, template = %entry.pattern, "route matched");
                return Some(Match {
                    pattern: &entry.pattern,
                    payload,
                    bindings,
                });
            }
        }

        debug!(%method, path = raw_path, "no route matched");
        None
    }

    /// Methods registered on any pattern that structurally matches `raw_path`,
    /// sorted and without duplicates.
    ///
    /// An empty result means the path is unknown for every method.
    pub fn allowed_methods(&self, raw_path: &str) -> Vec<Method> {
        let path = split_path(raw_path);
        let mut allowed: Vec<Method> = self
            .order
            .iter()
            .map(|&slot| &self.entries[slot])
            .filter(|entry| entry.pattern.bind(&path).is_some())
            .flat_map(|entry| entry.methods.keys().cloned())
            .collect();
        allowed.sort();
        allowed.dedup();
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(routes: &[(&str, Method)]) -> RouteTable<String> {
        let mut table = RouteTable::new();
        for (template, method) in routes {
            table
                .register(template, method.clone(), format!("{method} {template}"))
                .unwrap();
        }
        table.freeze();
        table
    }

    fn matched(table: &RouteTable<String>, method: Method, path: &str) -> Option<String> {
        table
            .lookup(&method, path)
            .map(|m| m.pattern().as_str().to_owned())
    }

    // ── Registration ──────────────────────────────────────────────────────────

    #[test]
    fn table_starts_empty() {
        let table: RouteTable<()> = RouteTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(!table.is_frozen());
        assert_eq!(table.policy(), DuplicatePolicy::Reject);
    }

    #[test]
    fn len_counts_routes_not_patterns() {
        let table = table(&[
            ("/a", Method::Get),
            ("/a", Method::Post),
            ("/b", Method::Get),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.patterns().count(), 2);
    }

    #[test]
    fn register_after_freeze_fails() {
        let mut table = table(&[("/a", Method::Get)]);
        assert_eq!(
            table.register("/b", Method::Get, "b".to_owned()),
            Err(RegisterError::TableFrozen)
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn register_surfaces_compile_errors() {
        let mut table = RouteTable::new();
        let err = table.register("/a/$x.../b", Method::Get, ()).unwrap_err();
        assert!(matches!(
            err,
            RegisterError::Compile(CompileError::MisplacedCollector { .. })
        ));
        assert!(table.is_empty());
        assert_eq!(table.patterns().count(), 0);
    }

    #[test]
    fn percent_escaped_template_rejected() {
        let mut table = RouteTable::new();
        let err = table.register("/caf%C3%A9", Method::Get, ()).unwrap_err();
        assert!(matches!(
            err,
            RegisterError::Compile(CompileError::MalformedTemplate { .. })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn duplicate_rejected_by_default() {
        let mut table = RouteTable::new();
        table.register("/users", Method::Get, 1).unwrap();
        let err = table.register("users/", Method::Get, 2).unwrap_err();
        assert_eq!(
            err,
            RegisterError::DuplicateRoute {
                template: "/users".to_owned(),
                method: Method::Get,
            }
        );
        assert_eq!(table.get("/users", &Method::Get), Some(&1));
    }

    #[test]
    fn duplicate_replaced_under_replace_policy() {
        let mut table = RouteTable::with_policy(DuplicatePolicy::Replace);
        table.register("/users", Method::Get, 1).unwrap();
        table.register("/users/", Method::Get, 2).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("/users", &Method::Get), Some(&2));
    }

    #[test]
    fn same_pattern_different_methods_coexist() {
        let mut table = RouteTable::new();
        table.register("/users", Method::Get, "list").unwrap();
        table.register("/users", Method::Post, "create").unwrap();
        assert_eq!(table.get("/users", &Method::Get), Some(&"list"));
        assert_eq!(table.get("/users", &Method::Post), Some(&"create"));
        assert_eq!(table.get("/users", &Method::Put), None);
        assert_eq!(table.get("/a?b", &Method::Get), None);
    }

    #[test]
    fn freeze_is_idempotent() {
        let mut table: RouteTable<()> = RouteTable::new();
        table.freeze();
        table.freeze();
        assert!(table.is_frozen());
    }

    #[test]
    fn patterns_follow_priority_not_registration_order() {
        let table = table(&[
            ("/users/$id/posts/$rest...", Method::Get),
            ("/users/$id", Method::Get),
            ("/users", Method::Get),
            ("/", Method::Get),
        ]);
        let order: Vec<_> = table.patterns().map(Pattern::as_str).collect();
        assert_eq!(order, ["/", "/users", "/users/$id", "/users/$id/posts/$rest..."]);
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    #[test]
    fn specificity_beats_registration_order() {
        let table = table(&[("/users/$id", Method::Get), ("/users/list", Method::Get)]);
        assert_eq!(
            matched(&table, Method::Get, "/users/list").as_deref(),
            Some("/users/list")
        );
        assert_eq!(
            matched(&table, Method::Get, "/users/7").as_deref(),
            Some("/users/$id")
        );
    }

    #[test]
    fn variable_beats_collector() {
        let table = table(&[("/files/$rest...", Method::Get), ("/files/$name", Method::Get)]);
        assert_eq!(
            matched(&table, Method::Get, "/files/a").as_deref(),
            Some("/files/$name")
        );
        assert_eq!(
            matched(&table, Method::Get, "/files/a/b").as_deref(),
            Some("/files/$rest...")
        );
    }

    #[test]
    fn method_filters_candidates() {
        let table = table(&[("/users/list", Method::Post), ("/users/$id", Method::Get)]);
        // The literal pattern has no GET entry, so the variable one wins.
        let hit = table.lookup(&Method::Get, "/users/list").unwrap();
        assert_eq!(hit.pattern().as_str(), "/users/$id");
        assert_eq!(hit.bindings().get("id"), Some("list"));
        assert_eq!(hit.payload(), "GET /users/$id");
    }

    #[test]
    fn unknown_path_or_method_is_none() {
        let table = table(&[("/users", Method::Get)]);
        assert!(table.lookup(&Method::Get, "/missing").is_none());
        assert!(table.lookup(&Method::Delete, "/users").is_none());
        assert!(table.lookup(&Method::Custom("PURGE".into()), "/users").is_none());
    }

    #[test]
    fn lookup_on_empty_table() {
        let table: RouteTable<()> = RouteTable::new();
        assert!(table.lookup(&Method::Get, "/").is_none());
    }

    #[test]
    fn lookup_is_deterministic() {
        let table = table(&[
            ("/users/$id", Method::Get),
            ("/$section/$id", Method::Get),
            ("/$all...", Method::Get),
        ]);
        let first = table.lookup(&Method::Get, "/users/9?x=1");
        let second = table.lookup(&Method::Get, "/users/9?x=1");
        assert_eq!(first, second);
        assert_eq!(first.unwrap().pattern().as_str(), "/$section/$id");
    }

    #[test]
    fn decoded_literal_matches_encoded_request() {
        let table = table(&[("/café", Method::Get), ("/a b", Method::Get)]);
        assert_eq!(
            matched(&table, Method::Get, "/caf%C3%A9").as_deref(),
            Some("/café")
        );
        assert_eq!(matched(&table, Method::Get, "/a%20b").as_deref(), Some("/a b"));
        assert_eq!(matched(&table, Method::Get, "/a b").as_deref(), Some("/a b"));
    }

    #[test]
    fn lookup_works_before_freeze() {
        let mut table = RouteTable::new();
        table.register("/$id", Method::Get, "var").unwrap();
        table.register("/static", Method::Get, "lit").unwrap();
        assert_eq!(table.lookup(&Method::Get, "/static").unwrap().payload(), &"lit");
    }

    #[test]
    fn allowed_methods_lists_every_matching_pattern() {
        let table = table(&[
            ("/users/$id", Method::Get),
            ("/users/$id", Method::Delete),
            ("/users/list", Method::Post),
            ("/users/list", Method::Get),
        ]);
        assert_eq!(
            table.allowed_methods("/users/list"),
            [Method::Get, Method::Post, Method::Delete]
        );
        assert_eq!(table.allowed_methods("/users/3"), [Method::Get, Method::Delete]);
        assert!(table.allowed_methods("/nowhere").is_empty());
    }

    #[test]
    fn table_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RouteTable<String>>();
    }
}
