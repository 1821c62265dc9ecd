//! Route registry and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Walk them per request: resource, method, body media type, headers,
//!   upgrade, negotiation, handler
//! - Return the first response, or the synthesized failure
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - First full match wins; a declining handler passes the request on
//! - Handlers run one at a time, raced against the request's cancellation
//! - Explicit `Resolution::Unmatched` rather than a silent default

use std::time::Instant;

use crate::config::{RouteConfig, ServerConfig};
use crate::http::{RequestDescriptor, ResponseDescriptor};
use crate::negotiation::{Dimension, Negotiated};
use crate::observability::metrics;
use crate::pattern::Captures;
use crate::routing::error::{DispatchError, RouteError};
use crate::routing::matcher::Matcher;
use crate::routing::options;
use crate::routing::outcome::DispatchContext;
use crate::routing::route::{MethodFilter, Route, RouteContext, RouteDescription, RouteSpec};
use crate::routing::static_response::StaticResponse;

/// Outcome of [`Router::resolve`].
#[derive(Debug)]
pub enum Resolution {
    Handled(ResponseDescriptor),
    /// No handler responded; the context explains why.
    Unmatched(DispatchContext),
}

/// Ordered, immutable route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    options_fallback: bool,
}

impl Router {
    pub fn new<I>(specs: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = RouteSpec>,
    {
        let routes = specs
            .into_iter()
            .map(Route::build)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(routes = routes.len(), "Route table compiled");
        Ok(Self {
            routes,
            options_fallback: false,
        })
    }

    /// Answer unmatched OPTIONS requests from the route table.
    pub fn with_options_fallback(mut self, enabled: bool) -> Self {
        self.options_fallback = enabled;
        self
    }

    /// Build the table of static-response routes declared in `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, RouteError> {
        let specs = config
            .routes
            .iter()
            .map(spec_from_config)
            .collect::<Result<Vec<_>, RouteError>>()?;

        Ok(Self::new(specs)?.with_options_fallback(config.routing.options_fallback))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn describe(&self) -> Vec<RouteDescription> {
        self.routes.iter().map(Route::describe).collect()
    }

    /// Routes whose resource could match some path under `prefix`.
    pub fn describe_under(&self, prefix: &str) -> Vec<RouteDescription> {
        self.routes
            .iter()
            .filter(|route| route.resource().could_match_under(prefix))
            .map(Route::describe)
            .collect()
    }

    /// Route the request, returning either a response or the unmatched
    /// context. Captures of the responding route are left in
    /// `request.params`.
    pub async fn resolve(&self, request: &mut RequestDescriptor) -> Result<Resolution, DispatchError> {
        let mut ctx = DispatchContext::new();

        let ordered = self
            .routes
            .iter()
            .filter(|r| !r.is_fallback())
            .chain(self.routes.iter().filter(|r| r.is_fallback()));

        for route in ordered {
            let Some((params, negotiated)) = self.evaluate(route, request, &mut ctx) else {
                continue;
            };

            tracing::debug!(
                endpoint = %route.endpoint(),
                resource = %request.resource,
                "Invoking handler"
            );

            let snapshot = request.params.clone();
            request.params.merge(params.clone());
            let pending = route
                .handler()
                .call(request.clone(), RouteContext { params, negotiated });

            let outcome = tokio::select! {
                biased;
                _ = request.cancellation.cancelled() => {
                    tracing::debug!(endpoint = %route.endpoint(), "Request cancelled during handler");
                    return Err(DispatchError::Cancelled);
                }
                outcome = pending => outcome,
            };

            match outcome {
                Ok(Some(response)) => return Ok(Resolution::Handled(ctx.finish(response))),
                Ok(None) => {
                    tracing::debug!(endpoint = %route.endpoint(), "Handler declined");
                    request.params = snapshot;
                }
                Err(e) => return Err(DispatchError::Handler(e)),
            }
        }

        if self.options_fallback {
            if let Some(response) = options::respond(&self.routes, request) {
                return Ok(Resolution::Handled(ctx.finish(response)));
            }
        }

        Ok(Resolution::Unmatched(ctx))
    }

    /// Route the request; unmatched requests get the synthesized failure.
    pub async fn dispatch(&self, request: &mut RequestDescriptor) -> Result<ResponseDescriptor, DispatchError> {
        let start = Instant::now();
        let response = match self.resolve(request).await? {
            Resolution::Handled(response) => response,
            Resolution::Unmatched(ctx) => {
                let response = ctx.synthesize(request);
                tracing::debug!(
                    method = %request.method,
                    resource = %request.resource,
                    status = response.status.as_u16(),
                    "No route responded"
                );
                metrics::record_unmatched(response.status.as_u16());
                response
            }
        };
        metrics::record_dispatch(request.method.as_str(), response.status.as_u16(), start);
        Ok(response)
    }

    /// Run every check before the handler. `None` skips the route, after
    /// folding what it learned into `ctx`.
    fn evaluate(
        &self,
        route: &Route,
        request: &RequestDescriptor,
        ctx: &mut DispatchContext,
    ) -> Option<(Captures, Negotiated)> {
        let mut params = route.resource().capture(request)?;

        let acc = &mut ctx.would_have_matched;
        acc.record_resource_match(match route.method() {
            MethodFilter::Only(method) => Some(method),
            MethodFilter::Any => None,
        });
        if !route.method().allows(&request.method) {
            acc.record_method_mismatch();
            return None;
        }
        acc.record_method_match();

        if !route.accepts_body_of(request) {
            acc.record_unsupported_body(route.accepted_media_types());
            return None;
        }

        params.merge(route.headers().capture(request)?);

        if !route.upgrade_satisfied_by(request) {
            if let Some(protocol) = route.upgrade() {
                acc.record_upgrade(protocol);
            }
            return None;
        }

        let mut negotiated = Negotiated::default();
        let mut acceptable = true;
        for dimension in Dimension::ALL {
            let available = route.available(dimension);
            if available.is_empty() {
                continue;
            }
            ctx.inject_vary(dimension.header());
            let requested = request.headers.get(dimension.header());
            match dimension.negotiate(requested, available) {
                Some(value) => negotiated.set(dimension, value),
                None => {
                    acceptable = false;
                    ctx.would_have_matched
                        .record_unacceptable(dimension, requested, available);
                }
            }
        }

        acceptable.then_some((params, negotiated))
    }
}

/// The static-response route declared by one `[[routes]]` entry.
pub fn spec_from_config(route: &RouteConfig) -> Result<RouteSpec, RouteError> {
    let handler = StaticResponse::from_config(&route.response)?;
    let mut spec = RouteSpec::new(route.endpoint.clone(), handler)
        .available_media_types(route.available_media_types.iter().cloned())
        .available_languages(route.available_languages.iter().cloned())
        .available_versions(route.available_versions.iter().cloned())
        .available_encodings(route.available_encodings.iter().cloned())
        .accepted_media_types(route.accepted_media_types.iter().cloned());
    for (name, pattern) in &route.headers {
        spec = spec.header(name.clone(), pattern.clone());
    }
    if let Some(protocol) = &route.upgrade {
        spec = spec.upgrade(protocol.clone());
    }
    if let Some(description) = &route.description {
        spec = spec.description(description.clone());
    }
    if route.fallback {
        spec = spec.fallback();
    }
    Ok(spec)
}
