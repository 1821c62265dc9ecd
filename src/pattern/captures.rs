//! Values captured by a successful pattern match.

use std::collections::HashMap;

use serde::Serialize;

/// Named and positional captures of a match.
///
/// `named` holds `:name` captures, `stars` holds `*`/`**` captures (and the
/// trailing-slash catch-all) in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Captures {
    pub named: HashMap<String, String>,
    pub stars: Vec<String>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder helper, mostly for generation inputs.
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn with_star(mut self, value: impl Into<String>) -> Self {
        self.stars.push(value.into());
        self
    }

    /// Compose two results: named maps merge (right wins), stars concatenate.
    pub fn compose(mut self, other: Captures) -> Captures {
        self.merge(other);
        self
    }

    /// In-place form of [`Captures::compose`].
    pub fn merge(&mut self, other: Captures) {
        self.named.extend(other.named);
        self.stars.extend(other.stars);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn star(&self, index: usize) -> Option<&str> {
        self.stars.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.stars.is_empty()
    }
}
