//! Errors raised while assembling a scheduler.

use crate::config::ConfigError;
use thiserror::Error;

/// Startup failures; a running cycle never returns an error.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
