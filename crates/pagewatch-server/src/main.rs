// Pagewatch Server - binary entry point

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pagewatch_server::config::ServerConfig;
use pagewatch_server::history::PgHistoryStore;
use pagewatch_server::{create_router, db, AppState};
use pagewatch_token::TokenService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = %format!("{:#}", e), "Server terminated with error");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    config.validate().context("Invalid server configuration")?;

    let secret = config.download_secret();
    if secret.is_insecure_default() {
        tracing::warn!(
            "JWT_SECRET is not set; download tokens are signed with the insecure development secret"
        );
    }

    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        db::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let tokens = Arc::new(TokenService::new(&secret).with_max_ttl(config.token_max_ttl));
    let history = Arc::new(PgHistoryStore::new(pool));
    let state = AppState::new(tokens, history, config.download_root.clone(), config.token_ttl);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        download_root = %config.download_root.display(),
        token_ttl = config.token_ttl,
        "Server listening"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
