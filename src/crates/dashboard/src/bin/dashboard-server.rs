//! Dashboard server binary
//!
//! Standalone server for the SQLancer bug dashboard, providing the JSON
//! API for issues, bug reports, and summary charts.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dashboard::api::routes::create_router;
use dashboard::classify::Classifier;
use dashboard::config::DashboardConfig;
use dashboard::db::DatabaseConnection;
use dashboard::github::GitHubClient;
use dashboard::sync::{bug_reports, SyncService};
use llm::remote::OpenAiClient;
use llm::RemoteLlmConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing/logging
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    // Load configuration from dashboard-server.toml
    tracing::info!("Loading server configuration...");
    let config = match DashboardConfig::load() {
        Ok(Some(cfg)) => {
            tracing::info!("Configuration loaded successfully");
            cfg
        }
        Ok(None) => {
            tracing::info!("No configuration file found; using defaults");
            DashboardConfig::default()
        }
        Err(e) => {
            tracing::warn!("Failed to load configuration file: {}. Using defaults.", e);
            DashboardConfig::default()
        }
    };

    tracing::info!("Server name: {}", config.server.name);
    tracing::info!("Database path: {}", config.database.path);
    tracing::info!("Classifier model: {}", config.classifier.model);

    // Bind address from configuration, overridable via environment
    let port = match std::env::var("PORT") {
        Ok(port) => port.parse::<u16>()?,
        Err(_) => config.server.port,
    };
    let host = std::env::var("HOST").unwrap_or_else(|_| config.server.host.clone());
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    // Initialize database connection
    let database_url = config.database_url();
    tracing::info!("Connecting to database: {}", database_url);
    let db = DatabaseConnection::new(&database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations");
    db.run_migrations().await?;

    // Health check the database
    tracing::info!("Performing database health check");
    db.health_check().await?;

    // GitHub client; unauthenticated requests hit a much lower rate limit
    let github_token = std::env::var("GITHUB_TOKEN").ok();
    if github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; GitHub API rate limits will be severe");
    }
    let github = GitHubClient::new(github_token);

    // One-time import of the upstream SQLancer bug list
    match bug_reports::import_bug_reports(&github, db.pool()).await {
        Ok(0) => {}
        Ok(count) => tracing::info!("Imported {} bug reports from sqlancer/bugs", count),
        Err(e) => tracing::warn!("Bug report import failed: {}", e),
    }

    // Classifier over the hosted model API
    let llm_config = RemoteLlmConfig::from_env(
        "OPENAI_API_KEY",
        config.classifier.base_url.clone(),
        config.classifier.model.clone(),
    )?;
    let classifier = Classifier::new(OpenAiClient::new(llm_config))
        .with_batch_size(config.classifier.batch_size)
        .with_batch_interval(Duration::from_secs(config.classifier.batch_interval_secs));

    let sync = Arc::new(SyncService::new(
        github,
        classifier,
        config.github.search_term.clone(),
    ));

    // Build the router
    tracing::info!("Building API router");
    let app = create_router(db, sync);

    // Create server
    tracing::info!("Starting dashboard server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Run server with graceful shutdown
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Dashboard server shut down gracefully");
    Ok(())
}

/// Signal for graceful shutdown (Ctrl-C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
