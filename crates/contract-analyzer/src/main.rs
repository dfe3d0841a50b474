mod config;
mod error;
mod rate_limit;
mod server;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use contract_common::extract::DocumentReader;
use contract_common::rules::RuleSet;

use config::Config;
use rate_limit::RateLimiter;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config first: the debug flag decides the default log level.
    let config = Config::from_env()?;

    let level = if config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting contract-analyzer");
    info!(
        host = %config.host,
        port = config.port,
        debug = config.debug,
        rules_path = ?config.rules_path,
        max_upload_bytes = config.max_upload_bytes,
        "configuration loaded"
    );

    let rules = match &config.rules_path {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::standard(),
    };
    info!(
        rules = rules.len(),
        fingerprint = %rules.fingerprint(),
        "ruleset loaded"
    );

    let limiter = config.rate_limit_rps.map(RateLimiter::new);
    match &limiter {
        Some(limiter) => info!(rps = limiter.rps(), "rate limiting enabled"),
        None => info!("rate limiting disabled"),
    }

    let state = AppState::new(Arc::new(rules), DocumentReader::pdf(), limiter);
    let app = server::router(state, config.max_upload_bytes);

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(listen_addr = %addr, "HTTP server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
        })?;
    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
