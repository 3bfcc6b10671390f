use anyhow::{Context, Result};
use clap::Parser;
use hostscope::api::{router, AppState};
use hostscope::Config;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hostscope", version, about = "Serve host telemetry over HTTP")]
struct Cli {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Config file, then environment, then flags. Also returns the ignored
/// environment overrides so they can be logged once logging is up.
fn load_config(cli: &Cli) -> Result<(Config, Vec<String>)> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ignored = config.apply_env();

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    Ok((config, ignored))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, ignored) = load_config(&cli)?;
    hostscope::init_logging(&config.log_level);
    for message in &ignored {
        warn!("{}", message);
    }

    let state = AppState::from_config(&config);
    let app = router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("hostscope {} listening on http://{}", env!("CARGO_PKG_VERSION"), address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}
