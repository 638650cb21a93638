//! judge-server - human-judgement study service
//!
//! Loads configuration, opens the database, and either serves the study API
//! or runs an administrative subcommand.

use anyhow::{Context, Result};
use clap::Parser;
use judge_common::config::{load_toml_config, ServerConfig, DEFAULT_LOG_LEVEL};
use judge_common::db::{create_user, init_database, purge_expired_sessions};
use judge_common::{CriteriaSet, ScenarioCatalog};
use judge_server::cli::{Cli, Command};
use judge_server::{build_router, logging, AppState};
use sqlx::SqlitePool;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Installed first so config loading can log
    let log_filter = logging::init(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));

    let file = load_toml_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let config =
        ServerConfig::resolve(cli.overrides(), file).context("Invalid configuration")?;
    logging::set_level(&log_filter, &config.log_level);

    // Log build identification immediately after tracing init
    info!(
        "Starting judge-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::AddUser { username, password } => {
            let guid = create_user(&pool, &username, &password)
                .await
                .with_context(|| format!("Failed to create user {}", username))?;
            info!("Created user {} ({})", username, guid);
            Ok(())
        }
        Command::Serve => serve(config, pool).await,
    }
}

async fn serve(config: ServerConfig, pool: SqlitePool) -> Result<()> {
    let study = &config.study;

    // Fail fast on unreadable resources; requests re-read them anyway
    let criteria = CriteriaSet::load(&study.data_root, &study.criteria_set)
        .await
        .context("Failed to load criteria set")?;
    let catalog = ScenarioCatalog::load(&study.data_root, &study.dataset, study.max_scenarios)
        .await
        .context("Failed to load dataset")?;
    info!(
        "Study: {} criteria from {}, {} scenarios from {} (max {})",
        criteria.len(),
        study.criteria_set,
        catalog.len(),
        study.dataset,
        study.max_scenarios
    );

    match purge_expired_sessions(&pool, chrono::Utc::now().timestamp()).await {
        Ok(0) => {}
        Ok(n) => info!("Purged {} expired sessions", n),
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    let addr = format!("{}:{}", config.bind, config.port);
    let state = AppState::new(pool, config.study.clone(), config.session_ttl_hours);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("judge-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
