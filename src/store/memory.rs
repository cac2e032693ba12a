//! In-memory collections.
//!
//! # Responsibilities
//! - Hold every declared collection as an insertion-ordered list
//! - Apply one `Operation` at a time
//!
//! # Design Decisions
//! - Synchronous and `&mut self`: exclusivity comes from the single owner
//! - Ids are minted here, never accepted from callers

use std::collections::HashMap;

use uuid::Uuid;

use crate::store::{Entity, Fields, OpResult, Operation, StoreError};

#[derive(Debug, Default)]
pub struct Database {
    collections: HashMap<String, Vec<Entity>>,
}

impl Database {
    /// Create a database with the given (empty) collections.
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: collections
                .into_iter()
                .map(|name| (name.into(), Vec::new()))
                .collect(),
        }
    }

    pub fn apply(&mut self, op: Operation) -> Result<OpResult, StoreError> {
        match op {
            Operation::Find { collection } => Ok(OpResult::Many(self.find(&collection)?)),
            Operation::FindOne { collection, id } => {
                Ok(OpResult::One(self.find_one(&collection, id)?))
            }
            Operation::Create { collection, fields } => {
                Ok(OpResult::One(Some(self.create(&collection, fields)?)))
            }
            Operation::Update {
                collection,
                id,
                fields,
            } => Ok(OpResult::One(self.update(&collection, id, fields)?)),
            Operation::Delete { collection, id } => {
                Ok(OpResult::One(self.delete(&collection, id)?))
            }
        }
    }

    pub fn find(&self, collection: &str) -> Result<Vec<Entity>, StoreError> {
        Ok(self.collection(collection)?.clone())
    }

    pub fn find_one(&self, collection: &str, id: Uuid) -> Result<Option<Entity>, StoreError> {
        Ok(self
            .collection(collection)?
            .iter()
            .find(|entity| entity.id == id)
            .cloned())
    }

    pub fn create(&mut self, collection: &str, mut fields: Fields) -> Result<Entity, StoreError> {
        let entities = self.collection_mut(collection)?;
        fields.remove("id");
        let entity = Entity {
            id: Uuid::new_v4(),
            fields,
        };
        entities.push(entity.clone());
        Ok(entity)
    }

    /// Shallow merge of `fields` over the stored entity.
    pub fn update(
        &mut self,
        collection: &str,
        id: Uuid,
        fields: Fields,
    ) -> Result<Option<Entity>, StoreError> {
        let entities = self.collection_mut(collection)?;
        let Some(entity) = entities.iter_mut().find(|entity| entity.id == id) else {
            return Ok(None);
        };
        for (key, value) in fields {
            if key != "id" {
                entity.fields.insert(key, value);
            }
        }
        Ok(Some(entity.clone()))
    }

    pub fn delete(&mut self, collection: &str, id: Uuid) -> Result<Option<Entity>, StoreError> {
        let entities = self.collection_mut(collection)?;
        Ok(entities
            .iter()
            .position(|entity| entity.id == id)
            .map(|index| entities.remove(index)))
    }

    fn collection(&self, name: &str) -> Result<&Vec<Entity>, StoreError> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Vec<Entity>, StoreError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }
}
