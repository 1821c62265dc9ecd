//! Route declarations.
//!
//! # Responsibilities
//! - Parse `"METHOD /resource"` endpoints and compile their patterns
//! - Hold the declared negotiation options, header patterns and upgrade
//! - Render the introspection description of a route
//!
//! # Design Decisions
//! - Every malformed declaration fails in `Route::build`, never per request
//! - Handlers receive owned values so their futures are `'static`

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use futures_util::future::BoxFuture;
use serde::Serialize;

use crate::http::{RequestDescriptor, ResponseDescriptor};
use crate::negotiation::{Dimension, Negotiated};
use crate::pattern::{Captures, CompileOptions, Pattern, ResourcePattern};
use crate::routing::error::{HandlerError, RouteError};
use crate::routing::matcher::{AndMatcher, HeaderMatcher, Matcher, ResourceMatcher};

/// Methods accepted in an endpoint declaration.
pub(crate) const KNOWN_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
    Method::PATCH,
];

/// `Ok(None)` declines the request; routing continues with the next route.
pub type HandlerResult = Result<Option<ResponseDescriptor>, HandlerError>;

/// What the router hands a handler besides the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteContext {
    /// Captures of this route only (also merged into `request.params`).
    pub params: Captures,
    pub negotiated: Negotiated,
}

/// Request handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: RequestDescriptor, context: RouteContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestDescriptor, RouteContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: RequestDescriptor, context: RouteContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(request, context))
    }
}

/// Method part of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Method),
}

impl MethodFilter {
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(expected) => expected == method,
        }
    }

    fn parse(token: &str) -> Result<Self, RouteError> {
        if token == "*" {
            return Ok(MethodFilter::Any);
        }
        KNOWN_METHODS
            .iter()
            .find(|m| m.as_str() == token)
            .map(|m| MethodFilter::Only(m.clone()))
            .ok_or_else(|| RouteError::UnknownMethod(token.to_string()))
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("*"),
            MethodFilter::Only(method) => f.write_str(method.as_str()),
        }
    }
}

/// Registration-time description of a route.
pub struct RouteSpec {
    endpoint: String,
    headers: Vec<(String, String)>,
    available_media_types: Vec<String>,
    available_languages: Vec<String>,
    available_versions: Vec<String>,
    available_encodings: Vec<String>,
    accepted_media_types: Vec<String>,
    upgrade: Option<String>,
    description: Option<String>,
    fallback: bool,
    handler: Arc<dyn Handler>,
}

impl RouteSpec {
    pub fn new(endpoint: impl Into<String>, handler: impl Handler) -> Self {
        Self::with_shared_handler(endpoint, Arc::new(handler))
    }

    pub fn with_shared_handler(endpoint: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers: Vec::new(),
            available_media_types: Vec::new(),
            available_languages: Vec::new(),
            available_versions: Vec::new(),
            available_encodings: Vec::new(),
            accepted_media_types: Vec::new(),
            upgrade: None,
            description: None,
            fallback: false,
            handler,
        }
    }

    /// Require a request header whose value matches `pattern`.
    pub fn header(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.headers.push((name.into(), pattern.into()));
        self
    }

    pub fn available(mut self, dimension: Dimension, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        match dimension {
            Dimension::MediaType => self.available_media_types = values,
            Dimension::Language => self.available_languages = values,
            Dimension::Version => self.available_versions = values,
            Dimension::Encoding => self.available_encodings = values,
        }
        self
    }

    pub fn available_media_types(self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available(Dimension::MediaType, values)
    }

    pub fn available_languages(self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available(Dimension::Language, values)
    }

    pub fn available_versions(self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available(Dimension::Version, values)
    }

    pub fn available_encodings(self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available(Dimension::Encoding, values)
    }

    /// Media types accepted as request bodies of POST, PUT and PATCH.
    pub fn accepted_media_types(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.accepted_media_types = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn upgrade(mut self, protocol: impl Into<String>) -> Self {
        self.upgrade = Some(protocol.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Only try this route after every ordinary route.
    pub fn fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

/// A compiled, immutable route.
pub struct Route {
    endpoint: String,
    method: MethodFilter,
    resource: ResourceMatcher,
    headers: AndMatcher,
    available_media_types: Vec<String>,
    available_languages: Vec<String>,
    available_versions: Vec<String>,
    available_encodings: Vec<String>,
    accepted_media_types: Vec<String>,
    upgrade: Option<String>,
    description: Option<String>,
    fallback: bool,
    handler: Arc<dyn Handler>,
}

impl Route {
    pub fn build(spec: RouteSpec) -> Result<Self, RouteError> {
        let (method, resource) = parse_endpoint(&spec.endpoint)?;

        let mut header_matchers: Vec<Box<dyn Matcher>> = Vec::with_capacity(spec.headers.len());
        for (name, pattern) in &spec.headers {
            let name = name.trim();
            if name.is_empty() {
                return Err(RouteError::EmptyHeaderName);
            }
            let pattern = Pattern::compile(pattern, CompileOptions::delimited(','));
            header_matchers.push(Box::new(HeaderMatcher::new(name, pattern)));
        }

        if let Some(protocol) = &spec.upgrade {
            let valid = !protocol.is_empty()
                && protocol
                    .bytes()
                    .all(|b| b.is_ascii_graphic() && b != b',' && b != b';');
            if !valid {
                return Err(RouteError::InvalidUpgrade(protocol.clone()));
            }
        }

        Ok(Self {
            endpoint: spec.endpoint,
            method,
            resource,
            headers: AndMatcher::new(header_matchers),
            available_media_types: spec.available_media_types,
            available_languages: spec.available_languages,
            available_versions: spec.available_versions,
            available_encodings: spec.available_encodings,
            accepted_media_types: spec.accepted_media_types,
            upgrade: spec.upgrade,
            description: spec.description,
            fallback: spec.fallback,
            handler: spec.handler,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> &MethodFilter {
        &self.method
    }

    pub fn resource(&self) -> &ResourceMatcher {
        &self.resource
    }

    pub fn headers(&self) -> &AndMatcher {
        &self.headers
    }

    pub fn available(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::MediaType => &self.available_media_types,
            Dimension::Language => &self.available_languages,
            Dimension::Version => &self.available_versions,
            Dimension::Encoding => &self.available_encodings,
        }
    }

    pub fn accepted_media_types(&self) -> &[String] {
        &self.accepted_media_types
    }

    pub fn upgrade(&self) -> Option<&str> {
        self.upgrade.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn is_for_web_socket(&self) -> bool {
        self.upgrade
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case("websocket"))
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Whether the request body media type is acceptable. Only POST, PUT and
    /// PATCH are checked, and only when the route declares accepted types.
    pub fn accepts_body_of(&self, request: &RequestDescriptor) -> bool {
        if self.accepted_media_types.is_empty() || !request.has_checked_body() {
            return true;
        }
        let Some(content_type) = request.content_type() else {
            return false;
        };
        Dimension::MediaType
            .negotiate(Some(content_type), &self.accepted_media_types)
            .is_some()
    }

    /// Whether the request asks for the protocol this route requires.
    pub fn upgrade_satisfied_by(&self, request: &RequestDescriptor) -> bool {
        let Some(required) = &self.upgrade else {
            return true;
        };
        let has_token = |name: &str, token: &str| {
            request
                .headers
                .get(name)
                .is_some_and(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
        };
        has_token("connection", "upgrade") && has_token("upgrade", required)
    }

    pub fn describe(&self) -> RouteDescription {
        RouteDescription {
            method: self.method.to_string(),
            resource: self.resource.to_string(),
            description: self.description.clone(),
            available_media_types: self.available_media_types.clone(),
            available_languages: self.available_languages.clone(),
            available_versions: self.available_versions.clone(),
            available_encodings: self.available_encodings.clone(),
            accepted_media_types: self.accepted_media_types.clone(),
            is_for_web_socket: self.is_for_web_socket(),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("endpoint", &self.endpoint)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Introspection view of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescription {
    pub method: String,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub available_media_types: Vec<String>,
    pub available_languages: Vec<String>,
    pub available_versions: Vec<String>,
    pub available_encodings: Vec<String>,
    pub accepted_media_types: Vec<String>,
    pub is_for_web_socket: bool,
}

fn parse_endpoint(endpoint: &str) -> Result<(MethodFilter, ResourceMatcher), RouteError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(RouteError::MissingEndpoint);
    }
    if endpoint == "*" {
        return Ok((MethodFilter::Any, ResourceMatcher::Any));
    }

    let mut tokens = endpoint.split_whitespace();
    let (Some(method), Some(resource), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(RouteError::InvalidEndpoint(endpoint.to_string()));
    };

    let method = MethodFilter::parse(method)?;
    let resource = match resource {
        "*" => ResourceMatcher::Any,
        r if r.starts_with('/') => ResourceMatcher::Pattern(ResourcePattern::compile(r)),
        r => return Err(RouteError::InvalidResource(r.to_string())),
    };
    Ok((method, resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn decline(_: RequestDescriptor, _: RouteContext) -> HandlerResult {
        Ok(None)
    }

    fn build(endpoint: &str) -> Result<Route, RouteError> {
        Route::build(RouteSpec::new(endpoint, decline))
    }

    #[test]
    fn test_endpoint_parsing() {
        let route = build("GET /users/:id").unwrap();
        assert_eq!(route.method(), &MethodFilter::Only(Method::GET));
        assert_eq!(route.resource().to_string(), "/users/:id");

        let any = build("*").unwrap();
        assert_eq!(any.method(), &MethodFilter::Any);
        assert_eq!(any.resource(), &ResourceMatcher::Any);

        assert_eq!(build("* /x").unwrap().method(), &MethodFilter::Any);
        assert_eq!(build("DELETE *").unwrap().resource(), &ResourceMatcher::Any);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(build("").unwrap_err(), RouteError::MissingEndpoint);
        assert_eq!(build("GET").unwrap_err(), RouteError::InvalidEndpoint("GET".into()));
        assert_eq!(build("FETCH /x").unwrap_err(), RouteError::UnknownMethod("FETCH".into()));
        assert_eq!(build("get /x").unwrap_err(), RouteError::UnknownMethod("get".into()));
        assert_eq!(build("GET x").unwrap_err(), RouteError::InvalidResource("x".into()));
        assert!(matches!(build("GET /x /y"), Err(RouteError::InvalidEndpoint(_))));

        let err = Route::build(RouteSpec::new("GET /x", decline).header(" ", "*")).unwrap_err();
        assert_eq!(err, RouteError::EmptyHeaderName);
        let err = Route::build(RouteSpec::new("GET /x", decline).upgrade("web socket")).unwrap_err();
        assert_eq!(err, RouteError::InvalidUpgrade("web socket".into()));
    }

    #[test]
    fn test_body_media_type_check() {
        let route = Route::build(
            RouteSpec::new("POST /x", decline).accepted_media_types(["application/json"]),
        )
        .unwrap();
        let json = RequestDescriptor::new(Method::POST, "/x").header("content-type", "application/json; charset=utf-8");
        let text = RequestDescriptor::new(Method::POST, "/x").header("content-type", "text/plain");
        let missing = RequestDescriptor::new(Method::POST, "/x");
        let get = RequestDescriptor::new(Method::GET, "/x");
        assert!(route.accepts_body_of(&json));
        assert!(!route.accepts_body_of(&text));
        assert!(!route.accepts_body_of(&missing));
        assert!(route.accepts_body_of(&get));
    }

    #[test]
    fn test_upgrade() {
        let route = Route::build(RouteSpec::new("GET /ws", decline).upgrade("websocket")).unwrap();
        assert!(route.is_for_web_socket());
        let plain = RequestDescriptor::new(Method::GET, "/ws");
        let upgrading = RequestDescriptor::new(Method::GET, "/ws")
            .header("connection", "keep-alive, Upgrade")
            .header("upgrade", "WebSocket");
        assert!(!route.upgrade_satisfied_by(&plain));
        assert!(route.upgrade_satisfied_by(&upgrading));
    }

    #[test]
    fn test_describe_serializes_camel_case() {
        let route = Route::build(
            RouteSpec::new("GET /docs", decline)
                .available_languages(["en"])
                .description("Documentation"),
        )
        .unwrap();
        let json = serde_json::to_value(route.describe()).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["resource"], "/docs");
        assert_eq!(json["availableLanguages"], serde_json::json!(["en"]));
        assert_eq!(json["isForWebSocket"], false);
        assert_eq!(json["description"], "Documentation");
    }
}
