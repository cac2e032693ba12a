//! Simple CRUD API
//!
//! A small HTTP application framework (path matcher, dispatcher, middleware,
//! validators, JSON envelopes) serving a `users` resource, with an optional
//! multi-process cluster mode.
//!
//! # Architecture Overview
//!
//! ```text
//!  single mode:
//!     client ──▶ http::server ──▶ http::dispatcher ──▶ users ──▶ store::LocalBroker ──▶ Database
//!
//!  multi mode:
//!     client ──▶ primary (cluster::proxy, round-robin)
//!                   │
//!                   ├──▶ worker 1 ─┐
//!                   ├──▶ worker 2 ─┼─ StoreRequest ──▶ primary (cluster::relay) ──▶ store process
//!                   └──▶ worker N ─┘                                   ◀── StoreReply ──┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod store;
pub mod users;

// Multi-process deployment
pub mod cluster;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::{Application, HttpServer};
pub use lifecycle::Shutdown;
