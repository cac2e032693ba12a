//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the dispatcher with its middleware and routes
//! - Start the process for its role: standalone, primary, worker or store
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The primary binds its public port before spawning children
//! - A worker stops when its channel to the primary closes

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::cluster::ipc::IpcError;
use crate::cluster::proxy::{proxy_router, ProxyState};
use crate::cluster::store_process::serve_store;
use crate::cluster::supervisor::{self, SpawnError};
use crate::cluster::{IpcBroker, Role, RoundRobin};
use crate::config::{AppConfig, ConfigError};
use crate::http::middleware::BodyParser;
use crate::http::{Application, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::routing::TemplateError;
use crate::store::{Database, LocalBroker, StoreBroker};
use crate::users;

/// Deployment mode selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// One process serving HTTP with an in-process store.
    #[default]
    Single,
    /// A primary, one worker per core and a store process.
    Multi,
}

impl Mode {
    /// Role of the process started directly by the operator.
    pub fn role(self) -> Role {
        match self {
            Mode::Single => Role::Standalone,
            Mode::Multi => Role::Primary,
        }
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route table: {0}")]
    Routes(#[from] TemplateError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Ipc(#[from] IpcError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(String),

    #[error("HTTP server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Dispatcher with the body parser and every resource's routes.
pub fn build_application(
    config: &AppConfig,
    broker: Arc<dyn StoreBroker>,
) -> Result<Application, TemplateError> {
    let mut app = Application::new(Duration::from_secs(config.timeouts.request_secs));
    app.use_middleware(BodyParser);
    app.register_routes(users::routes(broker))?;
    Ok(app)
}

/// Run this process in `role` until shutdown.
pub async fn run(role: Role, config: AppConfig, config_path: Option<&Path>) -> Result<(), LaunchError> {
    let shutdown = Arc::new(Shutdown::new());
    signals::trigger_on_signal(shutdown.clone());

    let result = match role {
        Role::Standalone => {
            let listener = bind(&config.listener.bind_address()).await?;
            serve_standalone(listener, &config, shutdown.clone()).await
        }
        Role::Primary => {
            let listener = bind(&config.listener.bind_address()).await?;
            serve_primary(listener, &config, config_path, shutdown.clone()).await
        }
        Role::Worker => run_worker(&config, shutdown.clone()).await,
        Role::Store => run_store(&config, shutdown.clone()).await,
    };

    // Stop anything still subscribed (child watchers, store loop).
    shutdown.trigger();
    result
}

pub async fn bind(addr: &str) -> Result<TcpListener, LaunchError> {
    TcpListener::bind(addr).await.map_err(|source| LaunchError::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Single-process mode: dispatcher plus an in-process store.
pub async fn serve_standalone(
    listener: TcpListener,
    config: &AppConfig,
    shutdown: Arc<Shutdown>,
) -> Result<(), LaunchError> {
    let broker = Arc::new(LocalBroker::spawn(Database::new(
        config.store.collections.iter().cloned(),
    )));
    let app = build_application(config, broker)?;

    tracing::info!(
        request_timeout_secs = config.timeouts.request_secs,
        "Standalone server ready"
    );
    HttpServer::application(Arc::new(app), config)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(LaunchError::Server)
}

/// Cluster primary: spawn children, then forward traffic to workers.
pub async fn serve_primary(
    listener: TcpListener,
    config: &AppConfig,
    config_path: Option<&Path>,
    shutdown: Arc<Shutdown>,
) -> Result<(), LaunchError> {
    let cluster = supervisor::launch(config, config_path, &shutdown)?;
    let balancer = Arc::new(RoundRobin::new(cluster.workers));
    tracing::info!(workers = balancer.len(), "Cluster started");

    serve_proxy(listener, balancer, config, shutdown).await
}

/// Forward every request on `listener` to `balancer`'s workers.
pub async fn serve_proxy(
    listener: TcpListener,
    balancer: Arc<RoundRobin>,
    config: &AppConfig,
    shutdown: Arc<Shutdown>,
) -> Result<(), LaunchError> {
    let state = ProxyState::new(balancer, Duration::from_secs(config.timeouts.request_secs));
    HttpServer::new(proxy_router(state))
        .run(listener, shutdown.subscribe())
        .await
        .map_err(LaunchError::Server)
}

async fn run_worker(config: &AppConfig, shutdown: Arc<Shutdown>) -> Result<(), LaunchError> {
    let addr = format!("{}:{}", config.cluster.worker_host, config.listener.port);
    let listener = bind(&addr).await?;

    let broker = Arc::new(IpcBroker::spawn(tokio::io::stdin(), tokio::io::stdout()));
    {
        let broker = broker.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            broker.wait_closed().await;
            tracing::warn!("Primary channel closed, stopping worker");
            shutdown.trigger();
        });
    }

    let app = build_application(config, broker)?;
    tracing::info!(address = %addr, pid = std::process::id(), "Worker ready");
    HttpServer::application(Arc::new(app), config)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(LaunchError::Server)
}

async fn run_store(config: &AppConfig, shutdown: Arc<Shutdown>) -> Result<(), LaunchError> {
    let db = Database::new(config.store.collections.iter().cloned());
    let mut stop = shutdown.subscribe();
    tracing::info!(
        pid = std::process::id(),
        collections = ?config.store.collections,
        "Store ready"
    );

    tokio::select! {
        result = serve_store(tokio::io::stdin(), tokio::io::stdout(), db) => result?,
        _ = stop.recv() => tracing::info!("Store stopping"),
    }
    Ok(())
}
