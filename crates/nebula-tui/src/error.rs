//! Startup and runtime errors.

use std::{io, path::PathBuf};

use nebula_client::ConfigError;
use thiserror::Error;

use crate::terminal::TerminalError;

/// Errors that end the client.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Invalid server endpoints.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Terminal or socket failure.
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    /// Log file could not be opened.
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        /// Requested path
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },
}
