//! Header map shared by request and response descriptors.

use std::collections::BTreeMap;

use serde::Serialize;

/// Header map keyed by lower-cased name.
///
/// Keys are normalized on every insert and lookup, so callers may pass names
/// in any case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    /// Set a header, replacing any previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(&name.to_ascii_lowercase())
    }

    /// Append comma-separated tokens to a list header, skipping tokens already
    /// present (compared case-insensitively).
    pub fn append_list(&mut self, name: &str, tokens: &str) {
        let entry = self.0.entry(name.to_ascii_lowercase()).or_default();
        for token in tokens.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let present = entry
                .split(',')
                .any(|existing| existing.trim().eq_ignore_ascii_case(token));
            if present {
                continue;
            }
            if !entry.is_empty() {
                entry.push_str(", ");
            }
            entry.push_str(token);
        }
    }

    /// Shorthand for `append_list("vary", ...)`.
    pub fn append_vary(&mut self, header: &str) {
        self.append_list("vary", header);
    }

    /// Merge `other` into `self`. `vary` is appended; everything else is set
    /// only when absent.
    pub fn merge_missing(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            if name == "vary" {
                self.append_vary(value);
            } else if !self.contains(name) {
                self.insert(name, value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}
