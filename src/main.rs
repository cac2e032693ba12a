use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use simple_crud_api::cluster::Role;
use simple_crud_api::config::loader::{finalize, load_config};
use simple_crud_api::lifecycle::startup::{self, LaunchError, Mode};
use simple_crud_api::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "simple-crud-api")]
#[command(version, about = "In-memory CRUD HTTP API with optional multi-process clustering", long_about = None)]
struct Cli {
    /// single: one process; multi: primary + one worker per core + store
    #[arg(value_enum, default_value_t = Mode::Single)]
    mode: Mode,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener port (overrides the config file and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Worker count in multi mode (defaults to the number of CPUs)
    #[arg(long)]
    workers: Option<usize>,

    /// Internal: role of a spawned child process
    #[arg(long, value_enum, hide = true)]
    role: Option<Role>,
}

#[tokio::main]
async fn main() -> Result<(), LaunchError> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    let role = match cli.role {
        Some(role) => role,
        None if config.cluster.enabled => Role::Primary,
        None => cli.mode.role(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(workers) = cli.workers {
        config.cluster.workers = Some(workers);
    }
    config.cluster.enabled = role == Role::Primary;
    let config = finalize(config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        role = %role,
        version = env!("CARGO_PKG_VERSION"),
        "simple-crud-api starting"
    );

    // Only the externally visible process exports metrics.
    if config.observability.metrics_enabled && matches!(role, Role::Standalone | Role::Primary) {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| LaunchError::Metrics(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr).map_err(LaunchError::Metrics)?;
    }

    if role == Role::Primary || role == Role::Standalone {
        tracing::info!(
            bind_address = %config.listener.bind_address(),
            request_timeout_secs = config.timeouts.request_secs,
            "Configuration loaded"
        );
    }

    startup::run(role, config, cli.config.as_deref()).await?;

    tracing::info!(role = %role, "Shutdown complete");
    Ok(())
}
