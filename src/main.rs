//! OCPP 1.6 Central System entry point.
//!
//! Reads configuration from TOML (`$OCPP_CONFIG` or the user config dir),
//! runs the telemetry migrations and serves chargers and the supervisory
//! UI on one WebSocket port.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use ocpp_central::config::AppConfig;
use ocpp_central::registry::Registry;
use ocpp_central::storage::{init_database, migrator::Migrator, DatabaseConfig, SqlTelemetry};
use ocpp_central::support::shutdown::{listen_for_shutdown_signals, ShutdownSignal};
use ocpp_central::{default_config_path, OcppServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("OCPP_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_logging(&cfg.logging.level);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_logging(&cfg.logging.level);
            warn!(
                "No config at {} ({}); using defaults",
                config_path.display(),
                e
            );
            cfg
        }
    };

    info!("Starting OCPP Central System...");

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: config.database.url.clone(),
    };
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    let telemetry = Arc::new(SqlTelemetry::new(db.clone()));

    // ── Shutdown handling ──────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    // ── Serve ──────────────────────────────────────────────────
    let registry = Registry::shared();
    let server = OcppServer::new(config.server.clone(), registry, telemetry)
        .with_shutdown(shutdown.clone());

    if let Err(e) = server.run().await {
        error!("WebSocket server error: {}", e);
    }

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    }

    info!("OCPP Central System shutdown complete");
    Ok(())
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}
