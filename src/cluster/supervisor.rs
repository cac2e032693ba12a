//! Child process management for the primary.
//!
//! # Responsibilities
//! - Spawn the store process and N worker processes from the current executable
//! - Wire their stdin/stdout into the relay
//! - Log child exits; kill children on shutdown
//!
//! # Design Decisions
//! - Children are never restarted
//! - stderr is inherited so child logs reach the operator's terminal

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::cluster::balancer::WorkerRegistration;
use crate::cluster::ipc::{spawn_writer, FrameReader};
use crate::cluster::relay::Relay;
use crate::cluster::Role;
use crate::config::AppConfig;
use crate::lifecycle::Shutdown;

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("cannot locate current executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("failed to spawn {role} process: {source}")]
    Spawn {
        role: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} process has no piped stdio")]
    MissingPipe(&'static str),

    #[error("invalid worker host {host:?}: {reason}")]
    WorkerHost { host: String, reason: String },
}

/// The running set of children, as seen by the primary.
pub struct Cluster {
    pub workers: Vec<WorkerRegistration>,
    pub relay: Arc<Relay>,
}

struct Spawned {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

/// Spawn the store and all workers and start relaying between them.
pub fn launch(
    config: &AppConfig,
    config_path: Option<&Path>,
    shutdown: &Shutdown,
) -> Result<Cluster, SpawnError> {
    let exe = std::env::current_exe().map_err(SpawnError::CurrentExe)?;
    let host: IpAddr = config
        .cluster
        .worker_host
        .parse()
        .map_err(|e: std::net::AddrParseError| SpawnError::WorkerHost {
            host: config.cluster.worker_host.clone(),
            reason: e.to_string(),
        })?;

    let store = spawn_child(&exe, Role::Store, None, config_path)?;
    tracing::info!(pid = store.child.id(), "Store process started");

    let count = config.cluster.worker_count();
    let mut workers = Vec::with_capacity(count);
    let mut worker_stdin = Vec::with_capacity(count);
    let mut worker_stdout = Vec::with_capacity(count);
    let mut children = vec![(Role::Store.as_str(), store.child)];

    for index in 0..count {
        // Validation guarantees port + count fits in u16.
        let port = config.listener.port.saturating_add(index as u16 + 1);
        let spawned = spawn_child(&exe, Role::Worker, Some(port), config_path)?;
        let addr = SocketAddr::new(host, port);
        let registration = WorkerRegistration::new(addr);
        tracing::info!(
            worker = index,
            pid = spawned.child.id(),
            address = %registration.addr,
            "Worker process started"
        );

        workers.push(registration);
        worker_stdin.push(spawn_writer(spawned.stdin, "primary->worker"));
        worker_stdout.push(spawned.stdout);
        children.push((Role::Worker.as_str(), spawned.child));
    }

    let relay = Relay::new(spawn_writer(store.stdin, "primary->store"), worker_stdin);
    tokio::spawn(relay.clone().pump_store(FrameReader::new(store.stdout, "store->primary")));
    for (index, stdout) in worker_stdout.into_iter().enumerate() {
        tokio::spawn(
            relay
                .clone()
                .pump_worker(index, FrameReader::new(stdout, "worker->primary")),
        );
    }

    for (role, child) in children {
        tokio::spawn(watch_child(role, child, shutdown.subscribe()));
    }

    Ok(Cluster { workers, relay })
}

fn spawn_child(
    exe: &Path,
    role: Role,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<Spawned, SpawnError> {
    let mut command = Command::new(exe);
    command.args(child_args(role, port, config_path));
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| SpawnError::Spawn {
        role: role.as_str(),
        source,
    })?;
    let stdin = child.stdin.take().ok_or(SpawnError::MissingPipe(role.as_str()))?;
    let stdout = child.stdout.take().ok_or(SpawnError::MissingPipe(role.as_str()))?;
    Ok(Spawned {
        child,
        stdin,
        stdout,
    })
}

/// Command line for a child of the given role.
pub fn child_args(role: Role, port: Option<u16>, config_path: Option<&Path>) -> Vec<String> {
    let mut args = vec!["--role".to_string(), role.as_str().to_string()];
    if let Some(port) = port {
        args.push("--port".to_string());
        args.push(port.to_string());
    }
    if let Some(path) = config_path {
        args.push("--config".to_string());
        args.push(path.display().to_string());
    }
    args
}

async fn watch_child(
    role: &'static str,
    mut child: Child,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    let pid = child.id();
    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => tracing::warn!(role, pid, %status, "Child process exited"),
            Err(e) => tracing::error!(role, pid, error = %e, "Failed to wait on child process"),
        },
        _ = shutdown.recv() => {
            if let Err(e) = child.kill().await {
                tracing::warn!(role, pid, error = %e, "Failed to stop child process");
            } else {
                tracing::debug!(role, pid, "Child process stopped");
            }
        }
    }
}
