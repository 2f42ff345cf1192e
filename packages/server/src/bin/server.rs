//! beango chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin beango-server
//! cargo run --bin beango-server -- --host 0.0.0.0 --port 3000 --config beango.toml
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use beango_server::{
    config::{AppConfig, CONFIG_FILEPATH_ENV, config_path},
    ui::{AppState, Server},
};
use beango_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "beango-server")]
#[command(about = "Chat server with session auth and Server-Sent Events", long_about = None)]
struct Args {
    /// Host address to bind the server to (overrides the config file)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port number to bind the server to (overrides the config file)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Path to a TOML config file (falls back to $BEANGO_CONFIG_FILEPATH)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let path = config_path(args.config, std::env::var(CONFIG_FILEPATH_ENV).ok());
    let config = match AppConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.logger.default_level);
    if path.is_none() {
        tracing::info!(
            "No config file given (--config or {}), using defaults",
            CONFIG_FILEPATH_ENV
        );
    }

    // Initialize dependencies in order:
    // 1. Repositories, SSE registry and UseCases (AppState)
    // 2. Route table (Server)
    let session_ttl = chrono::Duration::seconds(i64::from(config.session.seconds_until_expiry));
    let check_interval = match config.sse.session_check_interval_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let state = AppState::in_memory(Arc::new(SystemClock), session_ttl, check_interval);

    let server = match Server::new(state) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to build routes: {}", e);
            std::process::exit(1);
        }
    };

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    if let Err(e) = server.run(&host, port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
