//! Multi-process clustering subsystem.
//!
//! # Data Flow
//! ```text
//! client → primary (proxy.rs, balancer.rs pick worker)
//!        → worker HTTP listener (full dispatcher pipeline)
//!        → broker.rs (StoreRequest over worker stdout)
//!        → primary relay.rs → store process (store_process.rs)
//!        → StoreReply back along the same path
//! ```
//!
//! # Design Decisions
//! - Every process is the same executable; `--role` selects its behavior
//! - IPC is newline-delimited JSON on child stdin/stdout (ipc.rs, protocol.rs)
//! - The primary never touches data; the store process is the single owner

pub mod balancer;
pub mod broker;
pub mod ipc;
pub mod protocol;
pub mod proxy;
pub mod relay;
pub mod store_process;
pub mod supervisor;

pub use balancer::{RoundRobin, WorkerRegistration};
pub use broker::IpcBroker;
pub use relay::Relay;

/// What a process does in the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    /// Single process: HTTP plus an in-process store.
    Standalone,
    /// Public listener forwarding to workers; relays store traffic.
    Primary,
    /// HTTP listener whose store lives behind the primary.
    Worker,
    /// Owner of all collections, driven over stdin/stdout.
    Store,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standalone => "standalone",
            Role::Primary => "primary",
            Role::Worker => "worker",
            Role::Store => "store",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
