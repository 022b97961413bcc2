//! Request parameters resolved from a matched route.
//!
//! Route defaults are applied first; values bound from the request path then
//! override them. Variables become JSON strings and a collector becomes a JSON
//! array of strings, so the whole map can be handed to a controller or
//! serialized as-is.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::router::Bindings;

/// Parameters handed to the controller of a matched route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters {
    map: Map<String, Value>,
}

impl Parameters {
    /// Create an empty parameters map.
    pub fn new() -> Self {
        Self { map: Map::new() }
    }

    /// Merge route `defaults` with path `bindings`; bindings win on conflict.
    ///
    /// # Examples
    ///
    /// ```
    /// use minimal::context::Parameters;
    /// use minimal::router::{split_path, Pattern};
    /// use serde_json::{json, Map};
    ///
    /// let pattern = Pattern::compile("/docs/$lang/$page...").unwrap();
    /// let bindings = pattern.bind(&split_path("/docs/en/a/b")).unwrap();
    ///
    /// let mut defaults = Map::new();
    /// defaults.insert("lang".into(), json!("fr"));
    /// defaults.insert("theme".into(), json!("dark"));
    ///
    /// let params = Parameters::resolve(&defaults, &bindings);
    /// assert_eq!(params.get_str("lang"), Some("en"));
    /// assert_eq!(params.get_str("theme"), Some("dark"));
    /// assert_eq!(params.get_list("page"), Some(vec!["a", "b"]));
    /// ```
    pub fn resolve(defaults: &Map<String, Value>, bindings: &Bindings) -> Self {
        let mut params = Self {
            map: defaults.clone(),
        };
        for (name, value) in bindings.variables() {
            params.insert(name.clone(), value.clone());
        }
        if let Some((name, values)) = bindings.collector() {
            params.insert(name, values.to_vec());
        }
        params
    }

    /// Insert a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.map.insert(key.into(), value.into());
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Get a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(Value::as_str)
    }

    /// Get a list of strings, as bound by a collector. `None` if the value is
    /// missing, not an array, or contains non-strings.
    pub fn get_list(&self, key: &str) -> Option<Vec<&str>> {
        self.map
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    /// Return `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert into a JSON object.
    pub fn into_json(self) -> Value {
        Value::Object(self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{Pattern, split_path};
    use serde_json::json;

    fn bindings(template: &str, path: &str) -> Bindings {
        Pattern::compile(template)
            .unwrap()
            .bind(&split_path(path))
            .unwrap()
    }

    #[test]
    fn starts_empty() {
        let params = Parameters::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
        assert_eq!(params.into_json(), json!({}));
    }

    #[test]
    fn bindings_override_defaults() {
        let mut defaults = Map::new();
        defaults.insert("id".to_owned(), json!(0));
        defaults.insert("format".to_owned(), json!("html"));

        let params = Parameters::resolve(&defaults, &bindings("/users/$id", "/users/42"));
        assert_eq!(params.get_str("id"), Some("42"));
        assert_eq!(params.get_str("format"), Some("html"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_collector_is_empty_array() {
        let params = Parameters::resolve(&Map::new(), &bindings("/files/$rest...", "/files"));
        assert_eq!(params.get("rest"), Some(&json!([])));
        assert_eq!(params.get_list("rest"), Some(vec![]));
    }

    #[test]
    fn get_list_rejects_non_string_arrays() {
        let mut params = Parameters::new();
        params.insert("mixed", json!(["a", 1]));
        params.insert("scalar", "a");
        assert_eq!(params.get_list("mixed"), None);
        assert_eq!(params.get_list("scalar"), None);
        assert_eq!(params.get_list("missing"), None);
    }

    #[test]
    fn insert_remove_contains() {
        let mut params = Parameters::new();
        params.insert("page", 2);
        assert!(params.contains("page"));
        assert_eq!(params.remove("page"), Some(json!(2)));
        assert!(!params.contains("page"));
    }

    #[test]
    fn serializes_as_plain_object() {
        let params =
            Parameters::resolve(&Map::new(), &bindings("/u/$id/$rest...", "/u/7/a/b"));
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, json!({ "id": "7", "rest": ["a", "b"] }));
        let pairs: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(pairs.len(), 2);
    }
}
