//! Route matching conditions.
//!
//! # Responsibilities
//! - Match the request resource against a resource pattern
//! - Match header values against header patterns
//! - Combine conditions with AND semantics, composing their captures
//!
//! # Design Decisions
//! - Header names are compared lower-cased (request headers already are)
//! - A missing header never matches, whatever the pattern
//! - Empty condition = always matches (wildcard)

use std::fmt;

use crate::http::RequestDescriptor;
use crate::pattern::{Captures, Pattern, ResourcePattern};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Captures produced by the condition, or `None` when it does not hold.
    fn capture(&self, req: &RequestDescriptor) -> Option<Captures>;

    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.capture(req).is_some()
    }
}

/// Matches the request resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceMatcher {
    /// `*`: every resource, nothing captured.
    Any,
    Pattern(ResourcePattern),
}

impl ResourceMatcher {
    /// Whether some resource under `prefix` could match.
    pub fn could_match_under(&self, prefix: &str) -> bool {
        match self {
            ResourceMatcher::Any => true,
            ResourceMatcher::Pattern(pattern) => pattern.could_match_under(prefix),
        }
    }
}

impl Matcher for ResourceMatcher {
    fn capture(&self, req: &RequestDescriptor) -> Option<Captures> {
        match self {
            ResourceMatcher::Any => Some(Captures::new()),
            ResourceMatcher::Pattern(pattern) => pattern.matches(&req.resource),
        }
    }
}

impl fmt::Display for ResourceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceMatcher::Any => f.write_str("*"),
            ResourceMatcher::Pattern(pattern) => fmt::Display::fmt(pattern, f),
        }
    }
}

/// Matches one request header against a value pattern.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: String,
    pattern: Pattern,
}

impl HeaderMatcher {
    /// The name is normalized to lowercase.
    pub fn new(name: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            pattern,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Matcher for HeaderMatcher {
    fn capture(&self, req: &RequestDescriptor) -> Option<Captures> {
        req.headers
            .get(&self.name)
            .and_then(|value| self.pattern.matches(value))
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AndMatcher {
    fn capture(&self, req: &RequestDescriptor) -> Option<Captures> {
        self.matchers
            .iter()
            .try_fold(Captures::new(), |acc, m| Some(acc.compose(m.capture(req)?)))
    }
}
