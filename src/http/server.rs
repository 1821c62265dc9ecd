//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app with a single fallback handler
//! - Wire up middleware (tracing, request timeout)
//! - Convert between axum types and the routing descriptors
//! - Apply aliases before dispatch and association headers after
//! - Map dispatch errors to 500 / 503

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::{RequestDescriptor, ResponseDescriptor};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::pattern::{AliasTable, AssociationResolver};
use crate::routing::{DispatchError, RouteError, Router as ResourceRouter};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ResourceRouter>,
    pub aliases: Arc<AliasTable>,
    pub response_headers: Arc<AssociationResolver>,
    pub shutdown: Arc<Shutdown>,
}

/// HTTP server exposing a resource router.
pub struct HttpServer {
    app: Router,
    config: ServerConfig,
    shutdown: Arc<Shutdown>,
}

impl HttpServer {
    /// Serve `router` with the aliases and response headers of `config`.
    pub fn new(config: ServerConfig, router: ResourceRouter, shutdown: Arc<Shutdown>) -> Self {
        let aliases = AliasTable::new(config.aliases.iter().map(|a| (a.from.as_str(), a.to.as_str())));
        let response_headers = AssociationResolver::new(config.response_headers.iter().map(|entry| {
            let headers = entry
                .headers
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), Value::String(value.clone())))
                .collect();
            (entry.pattern.as_str(), Value::Object(headers))
        }));

        let state = AppState {
            router: Arc::new(router),
            aliases: Arc::new(aliases),
            response_headers: Arc::new(response_headers),
            shutdown: shutdown.clone(),
        };

        let app = Self::build_app(&config, state);
        Self {
            app,
            config,
            shutdown,
        }
    }

    /// Serve the static routes declared in `config`.
    pub fn from_config(config: ServerConfig, shutdown: Arc<Shutdown>) -> Result<Self, RouteError> {
        let router = ResourceRouter::from_config(&config)?;
        Ok(Self::new(config, router, shutdown))
    }

    /// Build the axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The axum app, for embedding or in-process testing.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until shutdown is triggered.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let stopping = self.shutdown.subscribe();
        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move { stopping.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Dispatch any request through the resource router.
async fn dispatch_handler(State(state): State<AppState>, request: Request<AxumBody>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let original = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), |pq| pq.as_str().to_string());
    let resource = match state.aliases.rewrite(&original) {
        Some(rewritten) => {
            tracing::debug!(from = %original, to = %rewritten, "Alias applied");
            rewritten
        }
        None => original,
    };

    let mut descriptor =
        RequestDescriptor::new(method.clone(), resource).with_cancellation(state.shutdown.subscribe());
    for (name, value) in request.headers() {
        let Ok(value) = value.to_str() else {
            tracing::debug!(header = %name, "Skipping non-ASCII header value");
            continue;
        };
        let joined = match descriptor.headers.get(name.as_str()) {
            Some(existing) => format!("{existing}, {value}"),
            None => value.to_string(),
        };
        descriptor.headers.insert(name.as_str(), joined);
    }

    match state.router.dispatch(&mut descriptor).await {
        Ok(mut response) => {
            if let Some(Value::Object(extra)) = state.response_headers.resolve(&descriptor.resource) {
                for (name, value) in extra {
                    if let (Some(value), false) = (value.as_str(), response.headers.contains(&name)) {
                        response.headers.insert(&name, value);
                    }
                }
            }
            into_response(response)
        }
        Err(DispatchError::Cancelled) => {
            tracing::warn!(method = %method, resource = %descriptor.resource, "Request cancelled by shutdown");
            metrics::record_dispatch(method.as_str(), 503, start);
            (StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down").into_response()
        }
        Err(DispatchError::Handler(e)) => {
            tracing::error!(method = %method, resource = %descriptor.resource, error = %e, "Handler failed");
            metrics::record_dispatch(method.as_str(), 500, start);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Convert a response descriptor into an axum response. The status message
/// becomes a text body when no body is set.
pub fn into_response(descriptor: ResponseDescriptor) -> Response {
    let ResponseDescriptor {
        status,
        status_message,
        headers,
        body,
        ..
    } = descriptor;

    let (content_type, bytes) = match body {
        _ if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED => (None, Vec::new()),
        Some(body) => (Some(body.content_type()), body.into_bytes()),
        None => match status_message {
            Some(message) => (Some("text/plain; charset=utf-8"), message.into_bytes()),
            None => (None, Vec::new()),
        },
    };

    let mut response = Response::new(AxumBody::from(bytes));
    *response.status_mut() = status;
    for (name, value) in headers.iter() {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }
    if let Some(content_type) = content_type {
        if !response.headers().contains_key(header::CONTENT_TYPE) {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
    }
    response
}
