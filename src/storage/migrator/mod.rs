//! Database migrations for the telemetry tables.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_meter_values;
mod m20240101_000002_create_connector_states;
mod m20240101_000003_create_transaction_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_meter_values::Migration),
            Box::new(m20240101_000002_create_connector_states::Migration),
            Box::new(m20240101_000003_create_transaction_events::Migration),
        ]
    }
}
