//! Typed access to one collection through a broker.

use std::sync::Arc;

use uuid::Uuid;

use crate::store::{Entity, Fields, OpResult, Operation, StoreBroker, StoreError};

#[derive(Clone)]
pub struct Repository {
    collection: String,
    broker: Arc<dyn StoreBroker>,
}

impl Repository {
    pub fn new(collection: impl Into<String>, broker: Arc<dyn StoreBroker>) -> Self {
        Self {
            collection: collection.into(),
            broker,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn find(&self) -> Result<Vec<Entity>, StoreError> {
        match self
            .broker
            .execute(Operation::Find {
                collection: self.collection.clone(),
            })
            .await?
        {
            OpResult::Many(entities) => Ok(entities),
            OpResult::One(_) => Err(StoreError::UnexpectedReply("find")),
        }
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Option<Entity>, StoreError> {
        self.one(
            "findOne",
            Operation::FindOne {
                collection: self.collection.clone(),
                id,
            },
        )
        .await
    }

    pub async fn create(&self, fields: Fields) -> Result<Entity, StoreError> {
        self.one(
            "create",
            Operation::Create {
                collection: self.collection.clone(),
                fields,
            },
        )
        .await?
        .ok_or(StoreError::UnexpectedReply("create"))
    }

    pub async fn update(&self, id: Uuid, fields: Fields) -> Result<Option<Entity>, StoreError> {
        self.one(
            "update",
            Operation::Update {
                collection: self.collection.clone(),
                id,
                fields,
            },
        )
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Option<Entity>, StoreError> {
        self.one(
            "delete",
            Operation::Delete {
                collection: self.collection.clone(),
                id,
            },
        )
        .await
    }

    async fn one(&self, kind: &'static str, op: Operation) -> Result<Option<Entity>, StoreError> {
        match self.broker.execute(op).await? {
            OpResult::One(entity) => Ok(entity),
            OpResult::Many(_) => Err(StoreError::UnexpectedReply(kind)),
        }
    }
}
