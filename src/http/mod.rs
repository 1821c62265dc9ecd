//! HTTP descriptors and the transport adapter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum, timeout and trace layers)
//!     → alias rewrite, RequestDescriptor (request.rs, headers.rs)
//!     → routing::Router::dispatch
//!     → ResponseDescriptor (response.rs) + association headers
//!     → axum Response
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use headers::Headers;
pub use request::RequestDescriptor;
pub use response::{Body, ResponseDescriptor};
pub use server::HttpServer;
