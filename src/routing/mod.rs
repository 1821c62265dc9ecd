//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (method, resource, headers)
//!     → router.rs (walk routes in registration order)
//!     → matcher.rs (resource and header conditions, captures)
//!     → negotiation (per declared dimension, Vary injected)
//!     → handler: response | decline (next route)
//!     → outcome.rs (nothing responded: 405 / 415 / 406 / 426 / 404)
//!
//! Route Compilation (at startup):
//!     RouteSpec[] / config routes
//!     → route.rs (parse endpoint, compile patterns)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same request always takes the same path
//! - First match wins (registration order), fallback routes last
//! - No-match outcomes are ordinary responses, not errors

pub mod error;
pub mod matcher;
pub mod options;
pub mod outcome;
pub mod route;
pub mod router;
pub mod static_response;

pub use error::{DispatchError, HandlerError, RouteError};
pub use matcher::{AndMatcher, HeaderMatcher, Matcher, ResourceMatcher};
pub use outcome::{DispatchContext, WouldHaveMatched};
pub use route::{Handler, HandlerResult, MethodFilter, Route, RouteContext, RouteDescription, RouteSpec};
pub use router::{spec_from_config, Resolution, Router};
pub use static_response::StaticResponse;
