//! Nebula TUI entry point.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use nebula_client::ClientConfig;
use nebula_core::ConnectionConfig;
use nebula_render::galaxy::overlay::OverlayConfig;
use nebula_tui::Settings;

/// Nebula terminal client
#[derive(Parser, Debug)]
#[command(name = "nebula-tui")]
#[command(about = "Terminal client for the Nebula space game")]
#[command(version)]
struct Args {
    /// Game server base URL
    #[arg(long, env = "NEBULA_HTTP_URL", default_value = "http://localhost:8080")]
    http_url: String,

    /// WebSocket URL (derived from the base URL if not set)
    #[arg(long, env = "NEBULA_WS_URL")]
    ws_url: Option<String>,

    /// Open this battle's replay on startup
    #[arg(long)]
    battle: Option<String>,

    /// Seconds between galaxy map refreshes
    #[arg(long, default_value = "30")]
    map_refresh_secs: u64,

    /// Upper bound on the reconnect delay, in seconds
    #[arg(long, default_value = "30")]
    max_reconnect_secs: u64,

    /// Log file (the terminal is used by the UI)
    #[arg(long, default_value = "nebula-tui.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    nebula_tui::init_logging(&args.log_file, &args.log_level)?;

    let client = ClientConfig::new(&args.http_url, args.ws_url.as_deref())?
        .with_map_refresh(Duration::from_secs(args.map_refresh_secs.max(1)));
    let connection = ConnectionConfig {
        max_delay: Duration::from_secs(args.max_reconnect_secs.max(1)),
        ..ConnectionConfig::default()
    };

    let settings = Settings {
        client,
        connection,
        overlay: OverlayConfig::default(),
        battle: args.battle,
    };
    Ok(nebula_tui::run(settings).await?)
}
