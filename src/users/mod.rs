//! The users resource.
//!
//! # Routes
//! ```text
//! GET    /api/users      → 200 all users
//! GET    /api/users/:id  → 200 user | 404
//! POST   /api/users      → 201 created user
//! PUT    /api/users/:id  → 200 merged user | 404
//! DELETE /api/users/:id  → 204 | 404
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::http::Method;

use crate::http::request::RequestContext;
use crate::http::route::{HandlerResult, RouteEntry};
use crate::store::{Repository, StoreBroker};

pub mod handlers;
pub mod validator;

pub const USERS_PATH: &str = "/api/users";
pub const USER_BY_ID_PATH: &str = "/api/users/:id";

/// Store collection holding users.
pub const COLLECTION: &str = "users";

/// Every field a user may carry; all are required on create.
pub const USER_FIELDS: [&str; 3] = ["username", "age", "hobbies"];

/// Route entries for the users resource, backed by `broker`.
pub fn routes(broker: Arc<dyn StoreBroker>) -> Vec<RouteEntry> {
    let repo = Repository::new(COLLECTION, broker);

    vec![
        RouteEntry::new(Method::GET, USER_BY_ID_PATH, with_repo(&repo, handlers::get_by_id))
            .with_validator(validator::validate_user_id),
        RouteEntry::new(Method::GET, USERS_PATH, with_repo(&repo, handlers::get_all)),
        RouteEntry::new(Method::POST, USERS_PATH, with_repo(&repo, handlers::create))
            .with_validator(validator::validate_create_user),
        RouteEntry::new(Method::PUT, USER_BY_ID_PATH, with_repo(&repo, handlers::update))
            .with_validator(validator::validate_update_user),
        RouteEntry::new(Method::DELETE, USER_BY_ID_PATH, with_repo(&repo, handlers::delete))
            .with_validator(validator::validate_user_id),
    ]
}

fn with_repo<F, Fut>(
    repo: &Repository,
    handler: F,
) -> impl Fn(RequestContext) -> Fut + Send + Sync + 'static
where
    F: Fn(Repository, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let repo = repo.clone();
    move |ctx| handler(repo.clone(), ctx)
}
