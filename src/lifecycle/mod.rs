//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every Cancellation handed out by subscribe() fires
//!             → server stops accepting, in-flight handlers are cancelled
//!
//! Cancellation (cancellation.rs):
//!     carried on each RequestDescriptor, raced against the handler future
//! ```
//!
//! # Design Decisions
//! - One watch channel; a late subscriber still observes an earlier trigger
//! - Requests built outside the server use `Cancellation::never()`

pub mod cancellation;
pub mod shutdown;
pub mod signals;

pub use cancellation::Cancellation;
pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
