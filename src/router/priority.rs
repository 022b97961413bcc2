//! Precedence among templates that can match the same request path.
//!
//! Patterns are ranked by a composite key, most significant first:
//!
//! 1. fully literal templates before templates with any binding,
//! 2. templates without a collector before templates ending in one,
//! 3. fewer segments before more,
//! 4. the normalized template string, lexicographically.
//!
//! The last component makes the order total, so the outcome never depends on
//! registration order or sort stability.

use std::cmp::Ordering;

use super::pattern::Pattern;

/// Sort key for a [`Pattern`]; smaller keys are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey<'a> {
    dynamic: bool,
    collector: bool,
    segments: usize,
    template: &'a str,
}

impl Pattern {
    /// The precedence key used by the route table.
    pub fn priority_key(&self) -> PriorityKey<'_> {
        PriorityKey {
            dynamic: !self.is_static(),
            collector: self.collector().is_some(),
            segments: self.len(),
            template: self.as_str(),
        }
    }
}

/// Compare two patterns by precedence.
pub fn compare(a: &Pattern, b: &Pattern) -> Ordering {
    a.priority_key().cmp(&b.priority_key())
}

/// Return `patterns` in precedence order.
///
/// # Examples
///
/// ```
/// use minimal::router::{priority, Pattern};
///
/// let patterns = ["/users/$id", "/files/$rest...", "/users/list"]
///     .into_iter()
///     .map(|t| Pattern::compile(t).unwrap());
///
/// let ordered: Vec<_> = priority::order(patterns)
///     .iter()
///     .map(|p| p.as_str().to_owned())
///     .collect();
/// assert_eq!(ordered, ["/users/list", "/users/$id", "/files/$rest..."]);
/// ```
pub fn order(patterns: impl IntoIterator<Item = Pattern>) -> Vec<Pattern> {
    let mut patterns: Vec<Pattern> = patterns.into_iter().collect();
    patterns.sort_by(compare);
    patterns
}
