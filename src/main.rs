//! CMDB API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                   GATEWAY                     │
//!                        │                                               │
//!     Client Request     │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!     ───────────────────┼─▶│  http  │──▶│  legacy  │──▶│   domain   │  │
//!                        │  │ server │   │translator│   │   tables   │  │
//!                        │  └────────┘   └──────────┘   └─────┬──────┘  │
//!                        │                                    │ miss    │
//!                        │                              ┌─────▼──────┐  │
//!                        │                              │  fallback  │  │
//!                        │                              │  matcher   │  │
//!                        │                              └─────┬──────┘  │
//!     Client Response    │  ┌────────┐                        │         │
//!     ◀──────────────────┼──│  http  │◀───── upstream ◀───────┘         │──── topo / host /
//!                        │  │ client │                                  │     proc / ...
//!                        │  └────────┘                                  │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use cmdb_gateway::config::{load_config, watcher::ConfigWatcher, GatewayConfig};
use cmdb_gateway::lifecycle::{wait_for_signal, Shutdown};
use cmdb_gateway::observability::{logging, metrics};
use cmdb_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "cmdb-gateway")]
#[command(about = "Front door that routes platform API calls to their backend services", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if args.check {
        println!("configuration ok");
        return Ok(());
    }

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cmdb-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        upstreams = config.upstreams.len(),
        fallback_routes = config.fallback_routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Keep the watcher handle alive for the lifetime of the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config).run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
