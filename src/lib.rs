//! Resource routing and content negotiation.
//!
//! Decides which handler serves a request from an ordered route table and,
//! when none does, synthesizes the 405/415/406/426/404 response explaining
//! why.

// Matching and negotiation core
pub mod negotiation;
pub mod pattern;
pub mod routing;

// Transport and process
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{Body, Headers, HttpServer, RequestDescriptor, ResponseDescriptor};
pub use lifecycle::{Cancellation, Shutdown};
pub use routing::{DispatchError, Handler, RouteContext, RouteError, RouteSpec, Router};
