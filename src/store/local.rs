//! In-process store broker.
//!
//! A spawned task owns the `Database`; callers send `(Operation, reply)`
//! pairs over an mpsc channel and await the oneshot reply.

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};

use crate::observability::metrics;
use crate::store::{Database, OpResult, Operation, StoreBroker, StoreError};

type Job = (Operation, oneshot::Sender<Result<OpResult, StoreError>>);

const QUEUE_DEPTH: usize = 256;

#[derive(Clone)]
pub struct LocalBroker {
    jobs: mpsc::Sender<Job>,
}

impl LocalBroker {
    /// Move `db` into a new owner task. Must be called inside a Tokio runtime.
    pub fn spawn(db: Database) -> Self {
        let (jobs, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(own_database(db, rx));
        Self { jobs }
    }
}

async fn own_database(mut db: Database, mut rx: mpsc::Receiver<Job>) {
    while let Some((op, reply)) = rx.recv().await {
        let kind = op.kind();
        let result = db.apply(op);
        metrics::record_store_op(kind, result.is_ok());
        // Caller may have given up (deadline); the mutation still stands.
        let _ = reply.send(result);
    }
    tracing::debug!("Local store task stopped");
}

impl StoreBroker for LocalBroker {
    fn execute(&self, op: Operation) -> BoxFuture<'_, Result<OpResult, StoreError>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.jobs
                .send((op, tx))
                .await
                .map_err(|_| StoreError::Unavailable("store task stopped".into()))?;
            rx.await
                .map_err(|_| StoreError::Unavailable("store task dropped reply".into()))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_operations_are_serialized_through_owner() {
        let broker = Arc::new(LocalBroker::spawn(Database::new(["users"])));

        let mut handles = Vec::new();
        for i in 0..20 {
            let broker = broker.clone();
            handles.push(tokio::spawn(async move {
                broker
                    .execute(Operation::Create {
                        collection: "users".into(),
                        fields: json!({"n": i}).as_object().cloned().unwrap(),
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let all = broker
            .execute(Operation::Find { collection: "users".into() })
            .await
            .unwrap();
        let OpResult::Many(entities) = all else {
            panic!("find returns many");
        };
        assert_eq!(entities.len(), 20);
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let broker = LocalBroker::spawn(Database::new(["users"]));
        let err = broker
            .execute(Operation::Find { collection: "nope".into() })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownCollection("nope".into()));
    }
}
