//! Terminal UI for Nebula
//!
//! A thin shell over [`nebula_app::Driver`] that provides terminal-specific
//! I/O. All connection and state logic lives in the generic
//! [`nebula_app::Runtime`]; this crate owns the screen, the command line and
//! the galaxy map and battle replay views.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
mod error;
pub mod input;
pub mod terminal;
pub mod ui;
pub mod views;

use std::{fs::File, path::Path, sync::Mutex};

pub use error::RuntimeError;
pub use input::{InputState, KeyInput};
use nebula_app::Runtime;
use nebula_client::ClientConfig;
use nebula_core::ConnectionConfig;
use nebula_render::galaxy::overlay::OverlayConfig;
pub use terminal::{TerminalDriver, TerminalError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Everything the client needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Server endpoints.
    pub client: ClientConfig,
    /// Socket reconnect policy.
    pub connection: ConnectionConfig,
    /// Galaxy map activity timing.
    pub overlay: OverlayConfig,
    /// Battle to open on startup.
    pub battle: Option<String>,
}

/// Send logs to `path`. The terminal belongs to the UI.
///
/// `RUST_LOG` overrides `level`.
///
/// # Errors
///
/// Returns `RuntimeError::LogFile` if the file cannot be created.
pub fn init_logging(path: &Path, level: &str) -> Result<(), RuntimeError> {
    let file = File::create(path)
        .map_err(|source| RuntimeError::LogFile { path: path.to_path_buf(), source })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

/// Run the client until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or fails mid-session.
pub async fn run(settings: Settings) -> Result<(), RuntimeError> {
    let Settings { client, connection, overlay, battle } = settings;
    let ws_url = client.ws_url.clone();
    tracing::info!(http = %client.http_url, ws = %ws_url, "starting client");

    let mut driver = TerminalDriver::new(client, overlay)?;
    if let Some(battle_id) = battle {
        driver.open_battle(battle_id);
    }

    Runtime::new(driver, ws_url, connection).run().await?;
    tracing::info!("client stopped");
    Ok(())
}
