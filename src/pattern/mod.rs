//! Pattern matching subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration ("/users/:id?tab=*#section")
//!     → resource.rs (split path / query / fragment)
//!     → compiler.rs (one Pattern per part)
//!     → segment.rs (token list + backtracking alignment)
//!
//! Request resource ("/users/42?tab=posts")
//!     → resource.rs (decode path, parse query)
//!     → compiler.rs (align, repackage groups)
//!     → Captures { named, stars }
//! ```
//!
//! # Design Decisions
//! - Patterns compile once at startup and are immutable afterwards
//! - Alignment is an explicit choice-point stack, never recursion
//! - Shortest successful skip wins; on failure the longest partial
//!   alignment is reported for introspection
//! - No regex

pub mod association;
pub mod captures;
pub mod compiler;
pub mod resource;
pub mod segment;

pub use association::{AliasTable, AssociationResolver};
pub use captures::Captures;
pub use compiler::{CompileOptions, Part, Pattern, PatternError};
pub use resource::ResourcePattern;
pub use segment::{Alignment, Group, SegmentMatcher, Token};
