//! endbug log server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use endbug_log_server::{DEFAULT_CONFIG_FILE, LogServer, Overrides, ServerConfig, load_file};

/// Endbug debug log server.
#[derive(Debug, Parser)]
#[command(name = "endbug-server", version, about)]
struct Args {
    /// Port to listen on (default: 3000)
    #[arg(long)]
    port: Option<i64>,

    /// Allow external connections (default: off)
    #[arg(long)]
    remote: bool,

    /// Max request body size in KB (default: 5.0)
    #[arg(long = "max-body")]
    max_body: Option<f64>,

    /// Path to config file (default: endbug.config.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let file = load_file(&config_path);
    let overrides = Overrides {
        port: args.port,
        remote: args.remote,
        max_body_kb: args.max_body,
    };
    // A configuration fault aborts here, before anything binds.
    let config = ServerConfig::resolve(&overrides, &file)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting endbug log server"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))?;

    tracing::info!("goodbye");
    Ok(())
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let server = LogServer::new(config);

    let signal_server = Arc::clone(&server);
    tokio::spawn(async move {
        let reason = shutdown_signal().await;
        tracing::info!("received {reason}, shutting down server");
        signal_server.shutdown();
    });

    server.run().await?;
    Ok(())
}

/// Waits for an interrupt or termination signal and names it.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "interrupt"
    }
}
