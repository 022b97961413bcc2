//! Route manifests — declare routes in TOML and bind them to controllers at load time.
//!
//! ```toml
//! duplicate_policy = "reject"
//!
//! [[routes]]
//! path = "/users/$id"
//! controller = "users"
//! action = "show"
//!
//! [[routes]]
//! path = "/upload"
//! method = "POST"
//! controller = "files"
//! options = { max_file_uploads = 4 }
//! ```
//!
//! Controller names are resolved through a caller-supplied function when the
//! manifest is built, so an unknown name fails at startup rather than on the
//! first request that reaches it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::http::Method;
use crate::route::{BodyOptions, DEFAULT_ACTION, Route};
use crate::router::{DuplicatePolicy, RegisterError, Router};

/// Errors produced while loading or building a manifest.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown controllers: {}", .names.join(", "))]
    UnknownControllers { names: Vec<String> },

    #[error("cannot register {method} {path}: {source}")]
    Register {
        method: Method,
        path: String,
        #[source]
        source: RegisterError,
    },
}

/// Root of a route manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// What to do when a (template, method) pair appears twice.
    pub duplicate_policy: DuplicatePolicy,

    /// Route declarations, in any order.
    pub routes: Vec<RouteConfig>,
}

/// One route declaration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Route template, e.g. `/users/$id`.
    pub path: String,

    #[serde(default = "default_method")]
    pub method: Method,

    /// Controller name, resolved by [`RouterConfig::build`].
    pub controller: String,

    #[serde(default = "default_action")]
    pub action: String,

    #[serde(default)]
    pub model: Option<String>,

    /// Default parameters for the controller.
    #[serde(default)]
    pub parameters: Map<String, Value>,

    #[serde(default)]
    pub options: BodyOptions,
}

fn default_method() -> Method {
    Method::Get
}

fn default_action() -> String {
    DEFAULT_ACTION.to_owned()
}

impl RouterConfig {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Build a frozen [`Router`], resolving every controller name with `resolve`.
    ///
    /// All names are resolved before anything is registered, and every unknown
    /// name is reported at once.
    ///
    /// # Examples
    ///
    /// ```
    /// use minimal::config::RouterConfig;
    ///
    /// let config = RouterConfig::from_toml_str(r#"
    ///     [[routes]]
    ///     path = "/users/$id"
    ///     controller = "users"
    /// "#).unwrap();
    ///
    /// let router = config.build(|name| (name == "users").then_some(1u8)).unwrap();
    /// assert!(router.is_frozen());
    /// assert!(router.dispatch(&"GET".into(), "/users/3").is_found());
    /// ```
    pub fn build<C, F>(&self, resolve: F) -> Result<Router<C>, ConfigError>
    where
        F: Fn(&str) -> Option<C>,
    {
        let mut controllers = Vec::with_capacity(self.routes.len());
        let mut unknown = Vec::new();
        for route in &self.routes {
            match resolve(&route.controller) {
                Some(controller) => controllers.push(controller),
                None => unknown.push(route.controller.clone()),
            }
        }
        if !unknown.is_empty() {
            unknown.sort();
            unknown.dedup();
            return Err(ConfigError::UnknownControllers { names: unknown });
        }

        let mut router = Router::with_policy(self.duplicate_policy);
        for (config, controller) in self.routes.iter().zip(controllers) {
            let mut route = Route::new(controller)
                .action(config.action.clone())
                .parameters(config.parameters.clone())
                .options(config.options.clone());
            if let Some(model) = &config.model {
                route = route.model(model.clone());
            }
            router
                .route(config.method.clone(), &config.path, route)
                .map_err(|source| ConfigError::Register {
                    method: config.method.clone(),
                    path: config.path.clone(),
                    source,
                })?;
        }
        router.freeze();

        info!(routes = router.len(), "route manifest loaded");
        Ok(router)
    }
}
