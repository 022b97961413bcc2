//! Route template compilation.
//!
//! A template such as `/users/$id/posts/$rest...` is split on `/` and every
//! component is classified once, at registration time:
//!
//! | Component    | Segment                 | Matches                         |
//! |--------------|-------------------------|---------------------------------|
//! | `users`      | [`Segment::Literal`]    | exactly `users`                 |
//! | `$id`        | [`Segment::Variable`]   | any one segment, bound to `id`  |
//! | `$rest...`   | [`Segment::Collector`]  | zero or more trailing segments  |
//!
//! Empty components are dropped, so `foo/bar/`, `/foo//bar` and `/foo/bar` all
//! compile to the same pattern. The root template `/` compiles to zero segments.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("collector `${name}...` must be the last segment of `{template}`")]
    MisplacedCollector { template: String, name: String },

    #[error("binding name `{name}` is used more than once in `{template}`")]
    DuplicateVariableName { template: String, name: String },

    #[error("malformed template `{template}`: {reason}")]
    MalformedTemplate {
        template: String,
        reason: &'static str,
    },
}

/// One `/`-delimited component of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches one path segment equal to the text.
    Literal(String),
    /// Matches any one path segment and binds it under the name.
    Variable(String),
    /// Matches every remaining path segment, possibly none, and binds them as a list.
    Collector(String),
}

impl Segment {
    // `$name` → Variable, `$name...` → Collector, anything else is literal text.
    fn classify(component: &str) -> Self {
        if let Some(body) = component.strip_prefix('$') {
            if let Some(name) = body.strip_suffix("...") {
                if is_binding_name(name) {
                    return Segment::Collector(name.to_owned());
                }
            } else if is_binding_name(body) {
                return Segment::Variable(body.to_owned());
            }
        }
        Segment::Literal(component.to_owned())
    }

    /// Returns the binding name for variables and collectors.
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Variable(name) | Segment::Collector(name) => Some(name),
        }
    }

    /// Returns `true` for [`Segment::Literal`].
    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }
}

// `[A-Za-z_][A-Za-z0-9_]*`
fn is_binding_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A compiled, immutable route template.
///
/// Equality and hashing use the normalized template string only, so two
/// templates that differ just in leading or trailing slashes are the same
/// pattern.
///
/// # Examples
///
/// ```
/// use minimal::router::{Pattern, Segment};
///
/// let pattern = Pattern::compile("users/$id/").unwrap();
/// assert_eq!(pattern.as_str(), "/users/$id");
/// assert_eq!(
///     pattern.segments(),
///     &[Segment::Literal("users".into()), Segment::Variable("id".into())]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    template: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile `template` into a pattern.
    ///
    /// # Errors
    ///
    /// - [`CompileError::MalformedTemplate`] — the template is empty or contains a
    ///   control character, `?`, `#` or a `%` escape.
    /// - [`CompileError::MisplacedCollector`] — a `$name...` component is not last.
    /// - [`CompileError::DuplicateVariableName`] — two bindings share a name.
    pub fn compile(template: &str) -> Result<Self, CompileError> {
        let malformed = |reason| CompileError::MalformedTemplate {
            template: template.to_owned(),
            reason,
        };

        if template.is_empty() {
            return Err(malformed("template is empty"));
        }
        if template.chars().any(char::is_control) {
            return Err(malformed("template contains a control character"));
        }
        if template.contains(['?', '#']) {
            return Err(malformed("query strings and fragments are not part of a path"));
        }
        // Request paths are decoded before matching, so an escape here could never match.
        if template.contains('%') {
            return Err(malformed(
                "percent-escapes are not allowed, write the decoded character instead",
            ));
        }

        let segments: Vec<Segment> = template
            .split('/')
            .filter(|component| !component.is_empty())
            .map(Segment::classify)
            .collect();

        let last = segments.len().saturating_sub(1);
        let mut names: Vec<&str> = Vec::new();
        for (position, segment) in segments.iter().enumerate() {
            if let Segment::Collector(name) = segment {
                if position != last {
                    return Err(CompileError::MisplacedCollector {
                        template: template.to_owned(),
                        name: name.clone(),
                    });
                }
            }
            if let Some(name) = segment.binding_name() {
                if names.contains(&name) {
                    return Err(CompileError::DuplicateVariableName {
                        template: template.to_owned(),
                        name: name.to_owned(),
                    });
                }
                names.push(name);
            }
        }

        let normalized = template
            .split('/')
            .filter(|component| !component.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self {
            template: format!("/{normalized}"),
            segments,
        })
    }

    /// The normalized template string, e.g. `/users/$id`.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// The compiled segments in path order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments, counting a trailing collector as one.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root pattern `/`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if every segment is literal.
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(Segment::is_literal)
    }

    /// Name of the trailing collector, if the pattern ends in one.
    pub fn collector(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Collector(name)) => Some(name),
            _ => None,
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for Pattern {}

impl std::hash::Hash for Pattern {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.template.hash(state);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl FromStr for Pattern {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}
