//! Store IPC message types.
//!
//! One JSON object per line. A worker sends `StoreRequest`s; the primary
//! relays them unchanged to the store process and relays each `StoreReply`
//! back to the worker that owns its `id`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{OpResult, Operation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRequest {
    /// Correlation id, minted by the requesting worker.
    pub id: Uuid,
    pub op: Operation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreReply {
    pub id: Uuid,
    pub result: Result<OpResult, String>,
}

impl StoreReply {
    pub fn failure(id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id,
            result: Err(message.into()),
        }
    }
}
