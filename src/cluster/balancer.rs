//! Round-robin worker selection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One spawned worker's HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRegistration {
    pub addr: SocketAddr,
}

impl WorkerRegistration {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

/// Rotates through a fixed worker list.
///
/// No health filtering: a dead worker keeps its turn.
#[derive(Debug)]
pub struct RoundRobin {
    workers: Vec<Arc<WorkerRegistration>>,
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new(workers: Vec<WorkerRegistration>) -> Self {
        Self {
            workers: workers.into_iter().map(Arc::new).collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn next_worker(&self) -> Option<Arc<WorkerRegistration>> {
        if self.workers.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        Some(self.workers[index].clone())
    }

    pub fn workers(&self) -> &[Arc<WorkerRegistration>] {
        &self.workers
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
