//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Accept* header ("en-US;q=1, fr;q=0.5")
//!     → accept.rs (parse entries, stable sort by quality)
//!     → dimension.rs (score every accepted × available pair)
//!     → winning available option, or None (406)
//! ```
//!
//! # Design Decisions
//! - One algorithm, four dimensions (media type, language, version, encoding)
//! - Absent header means the server's first option, not a wildcard match
//! - Scanning follows the server's declared order so ties go to the server

pub mod accept;
pub mod dimension;

pub use accept::{parse_accept, AcceptEntry};
pub use dimension::{Dimension, Negotiated};
