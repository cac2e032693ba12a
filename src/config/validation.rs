//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports fit)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("http.max_body_size must be greater than 0")]
    ZeroBodyLimit,

    #[error("cluster.workers must be at least 1")]
    NoWorkers,

    #[error("worker ports overflow: port {port} + {workers} workers exceeds 65535")]
    WorkerPortOverflow { port: u16, workers: usize },

    #[error("cluster.worker_host must be an IP address: {0}")]
    WorkerHost(String),

    #[error("store.collections must not be empty")]
    NoCollections,

    #[error("invalid metrics address: {0}")]
    MetricsAddress(String),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.http.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.cluster.enabled {
        let workers = config.cluster.worker_count();
        if workers == 0 {
            errors.push(ValidationError::NoWorkers);
        } else if usize::from(config.listener.port) + workers > usize::from(u16::MAX) {
            errors.push(ValidationError::WorkerPortOverflow {
                port: config.listener.port,
                workers,
            });
        }
        if config.cluster.worker_host.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::WorkerHost(config.cluster.worker_host.clone()));
        }
    }

    if config.store.collections.is_empty() {
        errors.push(ValidationError::NoCollections);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
