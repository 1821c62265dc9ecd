//! Routing errors.

use thiserror::Error;

/// Boxed error returned by a handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Malformed route declaration, raised at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route endpoint is empty")]
    MissingEndpoint,

    #[error("route endpoint `{0}` must be `*` or `METHOD /resource`")]
    InvalidEndpoint(String),

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    #[error("resource `{0}` must start with `/` or `*`")]
    InvalidResource(String),

    #[error("header pattern has an empty name")]
    EmptyHeaderName,

    #[error("invalid upgrade protocol `{0}`")]
    InvalidUpgrade(String),

    #[error("invalid response status {0}")]
    InvalidStatus(u16),
}

/// Failure of a dispatch that is not a routing outcome.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request was cancelled while a handler was pending")]
    Cancelled,

    #[error("handler failed: {0}")]
    Handler(#[source] HandlerError),
}
