use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use policyscan::config::load_runtime_config;
use policyscan::Pipeline;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use policyscan_server::{router, telemetry, AppState};

#[derive(Parser)]
#[command(name = "policyscan")]
#[command(about = "Extracts insurance policy fields from uploaded PDFs")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, env = "POLICYSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_runtime_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind.to_string();
    }

    telemetry::init(&config.logging).context("Failed to initialize logging")?;
    info!("Starting policyscan v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
    let app = router(AppState::new(pipeline), &config.server);

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!(
        address = %config.server.bind_address,
        strategy = config.extraction.strategy.as_str(),
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}
