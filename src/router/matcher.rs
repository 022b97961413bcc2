//! Request-path normalization and segment-wise matching.
//!
//! Matching never backtracks: a literal mismatch rejects the candidate outright,
//! and ambiguity between candidates is settled entirely by the table's priority
//! order.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use super::pattern::{Pattern, Segment};

/// Split a raw request target into decoded path segments.
///
/// The query string and fragment are removed first, the remaining path is
/// percent-decoded (invalid UTF-8 is replaced), and empty components are
/// dropped. The root path yields no segments.
///
/// # Examples
///
/// ```
/// use minimal::router::split_path;
///
/// assert_eq!(split_path("/users/42/?tab=posts"), ["users", "42"]);
/// assert_eq!(split_path("/caf%C3%A9"), ["café"]);
/// assert!(split_path("/").is_empty());
/// ```
pub fn split_path(raw_path: &str) -> Vec<String> {
    let end = raw_path.find(['?', '#']).unwrap_or(raw_path.len());
    percent_decode_str(&raw_path[..end])
        .decode_utf8_lossy()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Values bound by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    variables: HashMap<String, String>,
    collector: Option<(String, Vec<String>)>,
}

impl Bindings {
    /// Value bound to the variable `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// All variable bindings.
    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Name of the collector and the segments it captured.
    pub fn collector(&self) -> Option<(&str, &[String])> {
        self.collector
            .as_ref()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns `true` if nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.collector.is_none()
    }
}

impl Pattern {
    /// Match already-split path segments against this pattern.
    ///
    /// Without a collector the segment counts must be equal. With a collector at
    /// position `k`, at least `k` segments are required and everything from `k`
    /// onwards is captured, possibly nothing.
    pub fn bind(&self, path: &[String]) -> Option<Bindings> {
        let segments = self.segments();
        let (fixed, counts_fit) = match self.collector() {
            Some(_) => (segments.len() - 1, path.len() + 1 >= segments.len()),
            None => (segments.len(), path.len() == segments.len()),
        };
        if !counts_fit {
            return None;
        }

        let mut bindings = Bindings::default();
        for (segment, value) in segments[..fixed].iter().zip(path) {
            match segment {
                Segment::Literal(text) => {
                    if text != value {
                        return None;
                    }
                }
                Segment::Variable(name) => {
                    bindings.variables.insert(name.clone(), value.clone());
                }
                Segment::Collector(_) => unreachable!("collector is always the last segment"),
            }
        }

        if let Some(name) = self.collector() {
            bindings.collector = Some((name.to_owned(), path[fixed..].to_vec()));
        }

        Some(bindings)
    }
}

/// A successful lookup: the matched pattern, the payload registered for the
/// request method, and the bound values.
#[derive(Debug)]
pub struct Match<'t, T> {
    pub(crate) pattern: &'t Pattern,
    pub(crate) payload: &'t T,
    pub(crate) bindings: Bindings,
}

impl<'t, T> Match<'t, T> {
    /// The pattern that matched.
    pub fn pattern(&self) -> &'t Pattern {
        self.pattern
    }

    /// The payload registered for the pattern and request method.
    pub fn payload(&self) -> &'t T {
        self.payload
    }

    /// Bound variables and collector values.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Consume the match, keeping only the bindings.
    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }
}

impl<T: PartialEq> PartialEq for Match<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.payload == other.payload
            && self.bindings == other.bindings
    }
}
