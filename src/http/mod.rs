//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum transport, request ID, body buffering)
//!     → dispatcher.rs (transport check, route match)
//!     → middleware/ (body parsing)
//!     → route.rs (validator, then handler)
//!     → response.rs / error.rs (envelope)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod route;
pub mod server;

pub use dispatcher::Application;
pub use error::ApiError;
pub use request::{InboundRequest, RequestContext, X_REQUEST_ID};
pub use response::{Envelope, Reply};
pub use route::{Handler, HandlerResult, Middleware, RouteEntry, Validator};
pub use server::HttpServer;
