//! Telemetry persistence.
//!
//! Three append-only tables record what the chargers report: meter samples,
//! connector status history and transaction lifecycle events. Handlers talk
//! to a `TelemetrySink` trait so the dispatcher can be exercised without a
//! database; the production implementation inserts single rows through
//! SeaORM. Insert failures are logged and never abort a session.

pub mod entities;
pub mod migrator;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use tracing::{debug, error, info};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./ocpp_central.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./ocpp_central.db?mode=rwc".to_string(),
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(&config.url).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// One accepted `sampledValue` of a MeterValues request.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterSampleRow {
    pub charger_id: i32,
    pub connector: i32,
    pub transaction_id: i64,
    pub timestamp: String,
    pub value: String,
    pub unit: String,
    pub measurand: String,
    pub context: String,
}

/// One StatusNotification report.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorStateRow {
    pub charger_id: i32,
    pub connector: i32,
    pub status: String,
    pub timestamp: String,
    pub error_code: String,
}

/// One transaction lifecycle event ("Start" or "Stop").
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEventRow {
    pub charger_id: i32,
    pub event: String,
    pub connector: i32,
    pub timestamp: String,
    pub reason: String,
}

impl TransactionEventRow {
    pub fn start(charger_id: i32, connector: i32, timestamp: String) -> Self {
        Self {
            charger_id,
            event: "Start".to_string(),
            connector,
            timestamp,
            reason: String::new(),
        }
    }

    pub fn stop(charger_id: i32, connector: i32, timestamp: String, reason: String) -> Self {
        Self {
            charger_id,
            event: "Stop".to_string(),
            connector,
            timestamp,
            reason,
        }
    }
}

/// Append-only telemetry sink.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record_meter_sample(&self, row: MeterSampleRow);
    async fn record_connector_state(&self, row: ConnectorStateRow);
    async fn record_transaction_event(&self, row: TransactionEventRow);
}

/// SeaORM-backed sink.
pub struct SqlTelemetry {
    db: DatabaseConnection,
}

impl SqlTelemetry {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TelemetrySink for SqlTelemetry {
    async fn record_meter_sample(&self, row: MeterSampleRow) {
        let model = entities::meter_value::ActiveModel {
            charger_id: Set(row.charger_id),
            connector: Set(row.connector),
            transaccio: Set(row.transaction_id),
            hora: Set(row.timestamp),
            valor: Set(row.value),
            unit: Set(row.unit),
            measurand: Set(row.measurand),
            context: Set(row.context),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(_) => debug!("meter sample stored"),
            Err(e) => error!("failed to store meter sample: {}", e),
        }
    }

    async fn record_connector_state(&self, row: ConnectorStateRow) {
        let model = entities::connector_state::ActiveModel {
            charger_id: Set(row.charger_id),
            connector: Set(row.connector),
            estat: Set(row.status),
            hora: Set(row.timestamp),
            error_code: Set(row.error_code),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(_) => debug!("connector state stored"),
            Err(e) => error!("failed to store connector state: {}", e),
        }
    }

    async fn record_transaction_event(&self, row: TransactionEventRow) {
        let model = entities::transaction_event::ActiveModel {
            charger_id: Set(row.charger_id),
            estat: Set(row.event),
            connector: Set(row.connector),
            hora: Set(row.timestamp),
            motiu: Set(row.reason),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(_) => debug!("transaction event stored"),
            Err(e) => error!("failed to store transaction event: {}", e),
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory sink for dispatcher tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingSink {
        pub meter_samples: Mutex<Vec<MeterSampleRow>>,
        pub connector_states: Mutex<Vec<ConnectorStateRow>>,
        pub transaction_events: Mutex<Vec<TransactionEventRow>>,
    }

    #[async_trait]
    impl TelemetrySink for RecordingSink {
        async fn record_meter_sample(&self, row: MeterSampleRow) {
            self.meter_samples.lock().unwrap().push(row);
        }

        async fn record_connector_state(&self, row: ConnectorStateRow) {
            self.connector_states.lock().unwrap().push(row);
        }

        async fn record_transaction_event(&self, row: TransactionEventRow) {
            self.transaction_events.lock().unwrap().push(row);
        }
    }
}
