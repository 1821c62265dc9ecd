//! Per-request routing state and failure synthesis.
//!
//! # Responsibilities
//! - Accumulate why routes almost matched (would-have-matched)
//! - Collect response headers injected during dispatch (`vary`)
//! - Pick exactly one failure response when no handler responded
//!
//! # Design Decisions
//! - Failure priority: 405 > 415 > 406 > 426 > 404
//! - Every list is an ordered set in registration order
//! - Injected headers apply to handled and synthesized responses alike

use std::collections::BTreeMap;

use axum::http::{Method, StatusCode};

use crate::http::{Headers, RequestDescriptor, ResponseDescriptor};
use crate::negotiation::Dimension;

/// One negotiation dimension that failed for at least one route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unacceptable {
    /// The request's header value, if any.
    pub requested: Option<String>,
    pub available: Vec<String>,
}

/// Would-have-matched accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WouldHaveMatched {
    /// Methods of every route whose resource matched.
    pub allowed_methods: Vec<String>,
    pub method_mismatch: bool,
    /// Some resource-matching route allowed the request method.
    pub method_matched: bool,
    /// Accepted request media types of routes that refused the body.
    pub request_media_types: Vec<String>,
    pub unacceptable: BTreeMap<Dimension, Unacceptable>,
    pub upgrade: Option<String>,
}

impl WouldHaveMatched {
    pub fn record_resource_match(&mut self, method: Option<&Method>) {
        if let Some(method) = method {
            push_unique(&mut self.allowed_methods, method.as_str());
        }
    }

    pub fn record_method_mismatch(&mut self) {
        self.method_mismatch = true;
    }

    pub fn record_method_match(&mut self) {
        self.method_matched = true;
    }

    pub fn record_unsupported_body(&mut self, accepted: &[String]) {
        for media_type in accepted {
            push_unique(&mut self.request_media_types, media_type);
        }
    }

    pub fn record_unacceptable(&mut self, dimension: Dimension, requested: Option<&str>, available: &[String]) {
        let entry = self.unacceptable.entry(dimension).or_default();
        if entry.requested.is_none() {
            entry.requested = requested.map(str::to_string);
        }
        for option in available {
            push_unique(&mut entry.available, option);
        }
    }

    pub fn record_upgrade(&mut self, protocol: &str) {
        self.upgrade.get_or_insert_with(|| protocol.to_string());
    }

    /// The failure response for `request`.
    pub fn synthesize(&self, request: &RequestDescriptor) -> ResponseDescriptor {
        if self.method_mismatch && !self.method_matched {
            return ResponseDescriptor::new(StatusCode::METHOD_NOT_ALLOWED)
                .with_header("allow", self.allowed_methods.join(", "))
                .with_message(format!(
                    "The method {} is not allowed for {}. Allowed methods: {}.",
                    request.method,
                    request.path(),
                    self.allowed_methods.join(", ")
                ));
        }

        if !self.request_media_types.is_empty() {
            let header = match request.method {
                Method::POST => "accept-post",
                Method::PATCH => "accept-patch",
                _ => "accept",
            };
            let sent = request.content_type().unwrap_or("no content type");
            return ResponseDescriptor::new(StatusCode::UNSUPPORTED_MEDIA_TYPE)
                .with_header(header, self.request_media_types.join(", "))
                .with_message(format!(
                    "The request body media type ({sent}) is not supported. Supported media types: {}.",
                    self.request_media_types.join(", ")
                ));
        }

        if !self.unacceptable.is_empty() {
            let mut response = ResponseDescriptor::new(StatusCode::NOT_ACCEPTABLE);
            for (dimension, failure) in &self.unacceptable {
                response
                    .headers
                    .insert(dimension.available_header(), failure.available.join(", "));
            }
            return response.with_message(self.explain_unacceptable());
        }

        if let Some(protocol) = &self.upgrade {
            return ResponseDescriptor::new(StatusCode::UPGRADE_REQUIRED)
                .with_header("upgrade", protocol.clone())
                .with_header("connection", "upgrade")
                .with_message(format!(
                    "{} requires an upgrade to the {protocol} protocol.",
                    request.path()
                ));
        }

        ResponseDescriptor::new(StatusCode::NOT_FOUND)
            .with_message(format!("No resource matches {} {}.", request.method, request.path()))
    }

    fn explain_unacceptable(&self) -> String {
        let paragraphs: Vec<String> = self
            .unacceptable
            .iter()
            .map(|(dimension, failure)| {
                let requested = failure.requested.as_deref().unwrap_or("none");
                format!(
                    "None of the requested {} ({requested}) is available. Available {}: {}.",
                    dimension.label(),
                    dimension.label(),
                    failure.available.join(", ")
                )
            })
            .collect();

        if paragraphs.len() == 1 {
            paragraphs.into_iter().collect()
        } else {
            format!(
                "The resource is not available in an acceptable representation.\n\n{}",
                paragraphs.join("\n\n")
            )
        }
    }
}

fn push_unique(set: &mut Vec<String>, value: &str) {
    if !set.iter().any(|v| v == value) {
        set.push(value.to_string());
    }
}

/// Per-request dispatch state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchContext {
    pub would_have_matched: WouldHaveMatched,
    /// Headers added to whatever response the request ends with.
    pub injected: Headers,
}

impl DispatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject_vary(&mut self, header: &str) {
        self.injected.append_vary(header);
    }

    /// Apply injected headers to a response.
    pub fn finish(&self, mut response: ResponseDescriptor) -> ResponseDescriptor {
        response.headers.merge_missing(&self.injected);
        response
    }

    /// Synthesize the failure response and apply injected headers.
    pub fn synthesize(&self, request: &RequestDescriptor) -> ResponseDescriptor {
        self.finish(self.would_have_matched.synthesize(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_not_found_by_default() {
        let request = RequestDescriptor::new(Method::GET, "/missing?x=1");
        let response = WouldHaveMatched::default().synthesize(&request);
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.status_message.as_deref(), Some("No resource matches GET /missing."));
    }

    #[test]
    fn test_priority_order() {
        let request = RequestDescriptor::new(Method::PUT, "/x");
        let mut acc = WouldHaveMatched::default();
        acc.record_upgrade("websocket");
        assert_eq!(acc.synthesize(&request).status, StatusCode::UPGRADE_REQUIRED);

        acc.record_unacceptable(Dimension::Language, Some("de"), &options(&["en"]));
        assert_eq!(acc.synthesize(&request).status, StatusCode::NOT_ACCEPTABLE);

        acc.record_unsupported_body(&options(&["application/json"]));
        let response = acc.synthesize(&request);
        assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(response.headers.get("accept"), Some("application/json"));

        acc.record_resource_match(Some(&Method::GET));
        acc.record_method_mismatch();
        let response = acc.synthesize(&request);
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers.get("allow"), Some("GET"));
    }

    #[test]
    fn test_allowed_method_elsewhere_suppresses_405() {
        let request = RequestDescriptor::new(Method::GET, "/x");
        let mut acc = WouldHaveMatched::default();
        acc.record_resource_match(Some(&Method::POST));
        acc.record_method_mismatch();
        acc.record_resource_match(Some(&Method::GET));
        acc.record_method_match();
        assert_eq!(acc.synthesize(&request).status, StatusCode::NOT_FOUND);

        acc.record_unacceptable(Dimension::Language, Some("de"), &options(&["en"]));
        assert_eq!(acc.synthesize(&request).status, StatusCode::NOT_ACCEPTABLE);
    }

    #[test]
    fn test_not_acceptable_explains_every_dimension() {
        let request = RequestDescriptor::new(Method::GET, "/doc");
        let mut acc = WouldHaveMatched::default();
        acc.record_unacceptable(Dimension::Language, Some("de"), &options(&["en", "fr"]));
        acc.record_unacceptable(Dimension::Encoding, Some("zstd"), &options(&["br"]));
        acc.record_unacceptable(Dimension::Language, Some("de"), &options(&["fr", "es"]));

        let response = acc.synthesize(&request);
        assert_eq!(response.headers.get("available-languages"), Some("en, fr, es"));
        assert_eq!(response.headers.get("available-encodings"), Some("br"));
        let message = response.status_message.unwrap();
        assert_eq!(message.split("\n\n").count(), 3);
        assert!(message.contains("requested languages (de)"));
        assert!(message.contains("Available encodings: br."));
    }

    #[test]
    fn test_upgrade_headers() {
        let request = RequestDescriptor::new(Method::GET, "/ws");
        let mut acc = WouldHaveMatched::default();
        acc.record_upgrade("websocket");
        let response = acc.synthesize(&request);
        assert_eq!(response.headers.get("upgrade"), Some("websocket"));
        assert_eq!(response.headers.get("connection"), Some("upgrade"));
    }

    #[test]
    fn test_context_injects_vary() {
        let mut ctx = DispatchContext::new();
        ctx.inject_vary("accept");
        ctx.inject_vary("accept-language");
        let response = ctx.finish(ResponseDescriptor::ok().with_header("vary", "origin"));
        assert_eq!(response.headers.get("vary"), Some("origin, accept, accept-language"));
    }
}
