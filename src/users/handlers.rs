//! Users route handlers.
//!
//! Each handler assumes its validator already passed.

use serde_json::Value;

use crate::http::error::ApiError;
use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::http::route::HandlerResult;
use crate::store::{Fields, Repository};
use crate::users::validator::user_id;

const ENTITY: &str = "User";

pub async fn get_all(repo: Repository, _ctx: RequestContext) -> HandlerResult {
    let users = repo.find().await?;
    Reply::ok(&users)
}

pub async fn get_by_id(repo: Repository, ctx: RequestContext) -> HandlerResult {
    let id = user_id(&ctx)?;
    match repo.find_one(id).await? {
        Some(user) => Reply::ok(&user),
        None => Err(ApiError::entity_not_found(ENTITY)),
    }
}

pub async fn create(repo: Repository, ctx: RequestContext) -> HandlerResult {
    let user = repo.create(into_fields(ctx.body)?).await?;
    tracing::debug!(user_id = %user.id, "User created");
    Reply::created(&user)
}

pub async fn update(repo: Repository, ctx: RequestContext) -> HandlerResult {
    let id = user_id(&ctx)?;
    match repo.update(id, into_fields(ctx.body)?).await? {
        Some(user) => Reply::ok(&user),
        None => Err(ApiError::entity_not_found(ENTITY)),
    }
}

pub async fn delete(repo: Repository, ctx: RequestContext) -> HandlerResult {
    let id = user_id(&ctx)?;
    match repo.delete(id).await? {
        Some(_) => {
            tracing::debug!(user_id = %id, "User deleted");
            Ok(Reply::no_content())
        }
        None => Err(ApiError::entity_not_found(ENTITY)),
    }
}

fn into_fields(body: Value) -> Result<Fields, ApiError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ApiError::malformed_json()),
    }
}
