//! Atomic replacement of frozen route tables.
//!
//! Readers take a cheap snapshot with [`SharedRoutes::load`] and keep using it for
//! the rest of the request, even if a reload swaps in a new table meanwhile. A
//! table that is still being built can never be published.

use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;
use tracing::info;

use super::Router;
use super::table::RouteTable;

/// Errors returned when publishing a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("route table must be frozen before it can be shared")]
    NotFrozen,
}

/// Anything that can be published through [`SharedRoutes`].
pub trait Routes: Send + Sync {
    /// Returns `true` once no further routes can be registered.
    fn is_frozen(&self) -> bool;

    /// Number of registered routes.
    fn route_count(&self) -> usize;
}

impl<T: Send + Sync> Routes for RouteTable<T> {
    fn is_frozen(&self) -> bool {
        RouteTable::is_frozen(self)
    }

    fn route_count(&self) -> usize {
        self.len()
    }
}

impl<C: Send + Sync> Routes for Router<C> {
    fn is_frozen(&self) -> bool {
        Router::is_frozen(self)
    }

    fn route_count(&self) -> usize {
        self.len()
    }
}

/// A frozen route table (or [`Router`]) that can be replaced wholesale while
/// requests are in flight.
///
/// # Examples
///
/// ```
/// use minimal::http::Method;
/// use minimal::router::{RouteTable, SharedRoutes};
///
/// let mut v1 = RouteTable::new();
/// v1.register("/old", Method::Get, 1).unwrap();
/// v1.freeze();
/// let shared = SharedRoutes::new(v1).unwrap();
///
/// let snapshot = shared.load();
///
/// let mut v2 = RouteTable::new();
/// v2.register("/new", Method::Get, 2).unwrap();
/// v2.freeze();
/// shared.replace(v2).unwrap();
///
/// assert!(snapshot.lookup(&Method::Get, "/old").is_some());
/// assert!(shared.load().lookup(&Method::Get, "/new").is_some());
/// ```
pub struct SharedRoutes<R> {
    current: ArcSwap<R>,
}

impl<R: Routes> SharedRoutes<R> {
    /// Publish the first table.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::NotFrozen`] if `routes` is still open for registration.
    pub fn new(routes: R) -> Result<Self, SwapError> {
        if !routes.is_frozen() {
            return Err(SwapError::NotFrozen);
        }
        Ok(Self {
            current: ArcSwap::from_pointee(routes),
        })
    }

    /// Snapshot of the currently published table.
    pub fn load(&self) -> Arc<R> {
        self.current.load_full()
    }

    /// Atomically publish `routes`, returning the table it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::NotFrozen`] if `routes` is still open for
    /// registration; the current table stays in place.
    pub fn replace(&self, routes: R) -> Result<Arc<R>, SwapError> {
        if !routes.is_frozen() {
            return Err(SwapError::NotFrozen);
        }
        let count = routes.route_count();
        let previous = self.current.swap(Arc::new(routes));
        info!(
            routes = count,
            previous = previous.route_count(),
            "route table replaced"
        );
        Ok(previous)
    }
}

impl<R> std::fmt::Debug for SharedRoutes<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRoutes").finish_non_exhaustive()
    }
}
