//! Worker-side store broker over the primary's IPC channel.
//!
//! # Responsibilities
//! - Tag every operation with a fresh correlation id
//! - Park the caller on a oneshot until the matching reply arrives
//! - Fail every parked caller once the channel closes
//!
//! # Design Decisions
//! - Correlation by id, not by arrival order: replies may come back in any order
//! - A caller that gives up (deadline) removes its own pending entry

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

use crate::cluster::ipc::{spawn_writer, FrameReader};
use crate::cluster::protocol::{StoreReply, StoreRequest};
use crate::store::{OpResult, Operation, StoreBroker, StoreError};

type ReplySlot = oneshot::Sender<Result<OpResult, String>>;
type Pending = Arc<DashMap<Uuid, ReplySlot>>;

pub struct IpcBroker {
    outbound: mpsc::UnboundedSender<StoreRequest>,
    pending: Pending,
    closed: Arc<watch::Sender<bool>>,
}

impl IpcBroker {
    /// Start the reader and writer tasks over the given stream halves.
    pub fn spawn<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let outbound = spawn_writer(writer, "worker->primary");
        let pending: Pending = Arc::new(DashMap::new());
        let closed = Arc::new(watch::Sender::new(false));

        tokio::spawn(read_replies(
            FrameReader::new(reader, "primary->worker"),
            pending.clone(),
            closed.clone(),
        ));

        Self {
            outbound,
            pending,
            closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the reply channel has closed.
    pub async fn wait_closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

async fn read_replies<R: AsyncRead + Unpin>(
    mut frames: FrameReader<R>,
    pending: Pending,
    closed: Arc<watch::Sender<bool>>,
) {
    loop {
        match frames.next::<StoreReply>().await {
            Ok(Some(reply)) => match pending.remove(&reply.id) {
                Some((_, slot)) => {
                    let _ = slot.send(reply.result);
                }
                None => tracing::debug!(correlation_id = %reply.id, "Reply for abandoned operation"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Store reply channel failed");
                break;
            }
        }
    }

    tracing::warn!(pending = pending.len(), "Store reply channel closed");
    closed.send_replace(true);
    // Dropping the slots wakes every waiter with a receive error.
    pending.clear();
}

/// Removes the pending entry when the caller stops waiting.
struct PendingGuard<'a> {
    pending: &'a DashMap<Uuid, ReplySlot>,
    id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}

impl StoreBroker for IpcBroker {
    fn execute(&self, op: Operation) -> BoxFuture<'_, Result<OpResult, StoreError>> {
        Box::pin(async move {
            let id = Uuid::new_v4();
            let (tx, rx) = oneshot::channel();
            self.pending.insert(id, tx);
            let _guard = PendingGuard {
                pending: &self.pending,
                id,
            };

            // Checked after insert so the reader's final clear cannot miss us.
            if self.is_closed() {
                return Err(StoreError::Unavailable("store channel closed".into()));
            }

            self.outbound
                .send(StoreRequest { id, op })
                .map_err(|_| StoreError::Unavailable("store channel writer stopped".into()))?;

            match rx.await {
                Ok(Ok(result)) => Ok(result),
                Ok(Err(message)) => Err(StoreError::Rejected(message)),
                Err(_) => Err(StoreError::Unavailable("store channel closed".into())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ipc::write_frame;
    use crate::store::Fields;
    use std::time::Duration;

    #[tokio::test]
    async fn test_out_of_order_replies_reach_their_callers() {
        let (worker_out, primary_in) = tokio::io::duplex(4096);
        let (mut primary_out, worker_in) = tokio::io::duplex(4096);
        let broker = Arc::new(IpcBroker::spawn(worker_in, worker_out));

        let first = {
            let broker = broker.clone();
            tokio::spawn(async move { broker.execute(Operation::Find { collection: "a".into() }).await })
        };
        let second = {
            let broker = broker.clone();
            tokio::spawn(async move { broker.execute(Operation::Find { collection: "b".into() }).await })
        };

        let mut frames = FrameReader::new(primary_in, "test");
        let r1: StoreRequest = frames.next().await.unwrap().unwrap();
        let r2: StoreRequest = frames.next().await.unwrap().unwrap();

        // Answer in reverse order, tagging each reply with its collection.
        for request in [r2, r1] {
            let marker = request.op.collection().to_string();
            let reply = StoreReply::failure(request.id, marker);
            write_frame(&mut primary_out, &reply).await.unwrap();
        }

        assert_eq!(first.await.unwrap(), Err(StoreError::Rejected("a".into())));
        assert_eq!(second.await.unwrap(), Err(StoreError::Rejected("b".into())));
        assert_eq!(broker.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_closed_channel_fails_waiters() {
        let (worker_out, _primary_in) = tokio::io::duplex(4096);
        let (primary_out, worker_in) = tokio::io::duplex(4096);
        let broker = Arc::new(IpcBroker::spawn(worker_in, worker_out));

        let waiting = {
            let broker = broker.clone();
            tokio::spawn(async move {
                broker
                    .execute(Operation::Create {
                        collection: "users".into(),
                        fields: Fields::new(),
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(primary_out);

        assert!(matches!(waiting.await.unwrap(), Err(StoreError::Unavailable(_))));
        broker.wait_closed().await;
        assert!(broker.is_closed());
        assert!(matches!(
            broker.execute(Operation::Find { collection: "users".into() }).await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_call_clears_pending() {
        let (worker_out, _primary_in) = tokio::io::duplex(4096);
        let (_primary_out, worker_in) = tokio::io::duplex(4096);
        let broker = IpcBroker::spawn(worker_in, worker_out);

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            broker.execute(Operation::Find { collection: "users".into() }),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(broker.pending_len(), 0);
    }
}
