//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route table lookup)
//!     → matcher.rs (template matching, parameter binding)
//!     → Return: matched entry + params, or NoMatch
//!
//! Route Registration (at startup):
//!     RouteEntry[]
//!     → Parse templates
//!     → Insert per (template, method), first wins
//!     → Freeze as immutable table inside the Application
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - Exact literal match beats any parameterized match

pub mod matcher;
pub mod router;

pub use matcher::{match_path, MatchResult, Params, RouteTemplate, TemplateError};
pub use router::{Registration, Resolved, RouteTable};
