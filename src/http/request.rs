//! Request descriptor handed to the router.
//!
//! # Responsibilities
//! - Carry method, resource (`path?query#fragment`) and lower-cased headers
//! - Hold the captures the router writes before invoking a handler
//! - Carry the cancellation signal of the request
//!
//! # Design Decisions
//! - Header names are lower-cased on insert, never at lookup sites
//! - `params` is owned by the descriptor; the router snapshots it per route

use axum::http::Method;

use crate::http::headers::Headers;
use crate::lifecycle::Cancellation;
use crate::pattern::Captures;

/// Inbound request as seen by the routing engine.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub resource: String,
    pub headers: Headers,
    pub params: Captures,
    pub cancellation: Cancellation,
}

impl RequestDescriptor {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            headers: Headers::new(),
            params: Captures::new(),
            cancellation: Cancellation::never(),
        }
    }

    /// Add a header (builder style).
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Path portion of the resource, without query or fragment.
    pub fn path(&self) -> &str {
        let end = self
            .resource
            .find(['?', '#'])
            .unwrap_or(self.resource.len());
        &self.resource[..end]
    }

    /// Essence of the `content-type` header (`text/plain; charset=utf-8` →
    /// `text/plain`).
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get("content-type")
            .map(|ct| ct.split(';').next().unwrap_or("").trim())
            .filter(|ct| !ct.is_empty())
    }

    /// Whether the method can carry a body the router checks against a
    /// route's accepted media types.
    pub fn has_checked_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_strips_query_and_fragment() {
        let req = RequestDescriptor::new(Method::GET, "/a/b?x=1#top");
        assert_eq!(req.path(), "/a/b");
        assert_eq!(RequestDescriptor::new(Method::GET, "/a#f?x").path(), "/a");
    }

    #[test]
    fn test_content_type_essence() {
        let req = RequestDescriptor::new(Method::POST, "/x")
            .header("Content-Type", "application/json; charset=utf-8");
        assert_eq!(req.content_type(), Some("application/json"));
        assert!(req.has_checked_body());
        assert_eq!(RequestDescriptor::new(Method::POST, "/x").content_type(), None);
    }
}
