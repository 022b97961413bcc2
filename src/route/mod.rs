//! Route payloads — what a matched template dispatches to.
//!
//! A [`Route`] binds a template to a caller-supplied controller reference at
//! registration time, together with the action to invoke, an optional model name,
//! default parameters and body-parsing limits. The router never calls the
//! controller; it hands the resolved [`Route`] back to the application.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action invoked when a route does not name one.
pub const DEFAULT_ACTION: &str = "index";

/// Body-parsing limits that accompany a route.
///
/// The application applies these when it decodes the request body of a matched
/// route. Unknown keys are rejected when the options come from a manifest.
///
/// # Examples
///
/// ```
/// use minimal::route::BodyOptions;
///
/// let options: BodyOptions = toml::from_str(r#"
///     post_max_size = "8M"
///     max_file_uploads = 4
/// "#).unwrap();
/// assert_eq!(options.max_file_uploads, Some(4));
///
/// assert!(toml::from_str::<BodyOptions>("memory_limit = 1").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodyOptions {
    /// Largest accepted body, e.g. `"8M"`.
    pub post_max_size: Option<String>,
    /// Maximum number of input variables.
    pub max_input_vars: Option<u32>,
    /// Maximum number of multipart body parts.
    pub max_multipart_body_parts: Option<u32>,
    /// Maximum number of uploaded files.
    pub max_file_uploads: Option<u32>,
    /// Largest accepted single upload, e.g. `"2M"`.
    pub upload_max_filesize: Option<String>,
}

impl BodyOptions {
    /// Returns `true` if no limit is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The payload registered for one (template, method) pair.
///
/// # Examples
///
/// ```
/// use minimal::route::Route;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Controller { Users }
///
/// let route = Route::new(Controller::Users)
///     .action("show")
///     .model("user")
///     .parameter("format", "json");
///
/// assert_eq!(route.controller(), &Controller::Users);
/// assert_eq!(route.action_name(), "show");
/// assert_eq!(route.model_name(), Some("user"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route<C> {
    controller: C,
    action: String,
    model: Option<String>,
    parameters: Map<String, Value>,
    options: BodyOptions,
}

impl<C> Route<C> {
    /// Create a route to `controller` using the [`DEFAULT_ACTION`].
    pub fn new(controller: C) -> Self {
        Self {
            controller,
            action: DEFAULT_ACTION.to_owned(),
            model: None,
            parameters: Map::new(),
            options: BodyOptions::default(),
        }
    }

    /// Set the action invoked on the controller.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Set the model handed to the controller.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add a default parameter. Values bound from the path override it.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Replace all default parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the body-parsing limits.
    #[must_use]
    pub fn options(mut self, options: BodyOptions) -> Self {
        self.options = options;
        self
    }

    /// The controller this route dispatches to.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// The action to invoke on the controller, `index` unless set.
    pub fn action_name(&self) -> &str {
        &self.action
    }

    /// Name of the model handed to the controller, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Parameters supplied when the path does not bind them.
    pub fn default_parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Body-parsing limits for requests on this route.
    pub fn body_options(&self) -> &BodyOptions {
        &self.options
    }
}
