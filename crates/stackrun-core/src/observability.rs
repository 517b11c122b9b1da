//! Logging setup.
//!
//! The handler logs through `tracing` macros. Binaries call `init_tracing`
//! once; it installs a global subscriber with an `EnvFilter` and either a
//! JSON or a human-readable fmt layer.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::{LogConfig, LogFormat};

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("invalid log filter {filter:?}: {message}")]
    Filter { filter: String, message: String },

    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

pub fn init_tracing(config: &LogConfig) -> Result<(), TracingError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|e| TracingError::Filter {
        filter: config.filter.clone(),
        message: e.to_string(),
    })?;

    let registry = tracing_subscriber::registry();
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_filter(filter),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_filter(filter),
            )
            .try_init(),
    };
    result.map_err(|_| TracingError::AlreadyInstalled)
}
