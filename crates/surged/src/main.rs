//! surged — the surge daemon.
//!
//! One binary, two processes:
//! - `surged serve`: the compute service (request log + HTTP API)
//! - `surged monitor`: the migration monitor loop
//!
//! # Usage
//!
//! ```text
//! surged serve --port 5000
//! surged monitor --config surge.toml
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use surge_core::config::{self, MonitorConfig, ServerConfig, SurgeConfig};

#[derive(Parser)]
#[command(name = "surged", about = "Surge daemon — compute service and migration monitor")]
struct Cli {
    /// Path to surge.toml. Built-in defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the compute service.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the migration monitor.
    Monitor {
        /// Compute service address to poll (overrides config).
        #[arg(long)]
        metrics_addr: Option<String>,

        /// Request-rate threshold (overrides config).
        #[arg(long)]
        threshold: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,surged=debug,surge=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SurgeConfig::from_file(path)?,
        None => SurgeConfig::default(),
    };

    match cli.command {
        Command::Serve { port } => {
            let mut server = config.server;
            if let Some(port) = port {
                server.port = port;
            }
            run_serve(server).await
        }
        Command::Monitor {
            metrics_addr,
            threshold,
        } => {
            let mut monitor = config.monitor;
            if let Some(addr) = metrics_addr {
                monitor.metrics_addr = addr;
            }
            if let Some(threshold) = threshold {
                monitor.rpm_threshold = threshold;
            }
            run_monitor(monitor).await
        }
    }
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("surge compute service starting");

    let window = config::parse_duration(&config.window).unwrap_or(surge_metrics::DEFAULT_WINDOW);
    let log = Arc::new(surge_metrics::RequestLog::new(window));
    let router = surge_api::build_router(log);

    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, window_secs = window.as_secs(), "compute service listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("compute service stopped");
    Ok(())
}

async fn run_monitor(config: MonitorConfig) -> anyhow::Result<()> {
    info!("migration monitor starting");

    let poll_interval =
        config::parse_duration(&config.poll_interval).unwrap_or(Duration::from_secs(10));
    let http_timeout =
        config::parse_duration(&config.http_timeout).unwrap_or(Duration::from_secs(5));

    let source = surge_monitor::HttpMetricsSource::new(
        &config.metrics_addr,
        &config.metrics_endpoint,
        http_timeout,
    );
    let launcher = surge_monitor::AwsCliLauncher::new(&config.instance_id, &config.region);
    let monitor = surge_monitor::MigrationMonitor::new(
        Box::new(source),
        Box::new(launcher),
        config.rpm_threshold,
        poll_interval,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    monitor.run(shutdown_rx).await?;

    info!("migration monitor stopped");
    Ok(())
}
