//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → role → store/broker → dispatcher or proxy → listener
//!
//! Shutdown (shutdown.rs):
//!     Trigger → stop accepting → drain in-flight requests → kill children → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store, then listeners
//! - Children are tied to the primary's lifetime (killed on drop)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_application, LaunchError, Mode};
