//! Primary-side store relay.
//!
//! # Data Flow
//! ```text
//! worker i stdout → pump_worker(i) → pending[id] = i → store stdin
//! store stdout → pump_store → pending.remove(id) → worker i stdin
//! ```
//!
//! # Design Decisions
//! - The relay never inspects operations; it only routes by correlation id
//! - If the store is gone, workers get an error reply instead of silence

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::cluster::ipc::FrameReader;
use crate::cluster::protocol::{StoreReply, StoreRequest};

const STORE_GONE: &str = "store process unavailable";

pub struct Relay {
    pending: DashMap<Uuid, usize>,
    to_store: mpsc::UnboundedSender<StoreRequest>,
    to_workers: Vec<mpsc::UnboundedSender<StoreReply>>,
    store_closed: AtomicBool,
}

impl Relay {
    pub fn new(
        to_store: mpsc::UnboundedSender<StoreRequest>,
        to_workers: Vec<mpsc::UnboundedSender<StoreReply>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            pending: DashMap::new(),
            to_store,
            to_workers,
            store_closed: AtomicBool::new(false),
        })
    }

    /// Move requests from worker `worker` to the store until the worker's stream ends.
    pub async fn pump_worker<R: AsyncRead + Unpin>(self: Arc<Self>, worker: usize, mut frames: FrameReader<R>) {
        loop {
            match frames.next::<StoreRequest>().await {
                Ok(Some(request)) => self.forward_request(worker, request),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(worker, error = %e, "Worker IPC channel failed");
                    break;
                }
            }
        }
        self.pending.retain(|_, owner| *owner != worker);
        tracing::warn!(worker, "Worker IPC channel closed");
    }

    /// Move replies from the store to their workers until the store's stream ends.
    pub async fn pump_store<R: AsyncRead + Unpin>(self: Arc<Self>, mut frames: FrameReader<R>) {
        loop {
            match frames.next::<StoreReply>().await {
                Ok(Some(reply)) => self.route_reply(reply),
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Store IPC channel failed");
                    break;
                }
            }
        }

        self.store_closed.store(true, Ordering::SeqCst);
        tracing::error!(pending = self.pending.len(), "Store IPC channel closed");

        let orphaned: Vec<Uuid> = self.pending.iter().map(|entry| *entry.key()).collect();
        for id in orphaned {
            if let Some((_, worker)) = self.pending.remove(&id) {
                self.reply_to(worker, StoreReply::failure(id, STORE_GONE));
            }
        }
    }

    pub fn forward_request(&self, worker: usize, request: StoreRequest) {
        let id = request.id;
        self.pending.insert(id, worker);

        if self.store_closed.load(Ordering::SeqCst) || self.to_store.send(request).is_err() {
            self.pending.remove(&id);
            self.reply_to(worker, StoreReply::failure(id, STORE_GONE));
        }
    }

    pub fn route_reply(&self, reply: StoreReply) {
        match self.pending.remove(&reply.id) {
            Some((_, worker)) => self.reply_to(worker, reply),
            None => tracing::warn!(correlation_id = %reply.id, "Dropping store reply with unknown id"),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn reply_to(&self, worker: usize, reply: StoreReply) {
        let sent = self
            .to_workers
            .get(worker)
            .map(|tx| tx.send(reply).is_ok())
            .unwrap_or(false);
        if !sent {
            tracing::warn!(worker, "Worker IPC channel unavailable, reply dropped");
        }
    }
}
