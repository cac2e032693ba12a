//! Data store subsystem.
//!
//! # Data Flow
//! ```text
//! Handler
//!     → repository.rs (typed collection API)
//!     → StoreBroker (LocalBroker in-process | IpcBroker over the primary)
//!     → memory.rs (Database::apply, single owner)
//! ```
//!
//! # Design Decisions
//! - One owner of the collections per deployment, reached only by messages
//! - Operations and results are plain serde data so they cross process boundaries unchanged

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub mod local;
pub mod memory;
pub mod repository;

pub use local::LocalBroker;
pub use memory::Database;
pub use repository::Repository;

/// Domain fields of an entity (everything except `id`).
pub type Fields = Map<String, Value>;

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Fields,
}

/// One store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Operation {
    Find { collection: String },
    FindOne { collection: String, id: Uuid },
    Create { collection: String, fields: Fields },
    Update { collection: String, id: Uuid, fields: Fields },
    Delete { collection: String, id: Uuid },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Find { .. } => "find",
            Operation::FindOne { .. } => "findOne",
            Operation::Create { .. } => "create",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Operation::Find { collection }
            | Operation::FindOne { collection, .. }
            | Operation::Create { collection, .. }
            | Operation::Update { collection, .. }
            | Operation::Delete { collection, .. } => collection,
        }
    }
}

/// Result of a successfully applied operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum OpResult {
    Many(Vec<Entity>),
    One(Option<Entity>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("store rejected operation: {0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected store reply for {0}")]
    UnexpectedReply(&'static str),
}

/// Asynchronous access to the single store owner.
pub trait StoreBroker: Send + Sync {
    fn execute(&self, op: Operation) -> BoxFuture<'_, Result<OpResult, StoreError>>;
}
