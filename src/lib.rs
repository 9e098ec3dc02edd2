//! # OCPP Central System
//!
//! OCPP 1.6-J Central System: accepts WebSocket connections from EV charge
//! points, validates every message against the OCPP taxonomy, tracks
//! per-charger state and drives operator-initiated requests from a
//! supervisory web client.
//!
//! ## Architecture
//!
//! - **support**: Cross-cutting utilities (OCPP-J framing, shutdown, time)
//! - **domain**: Protocol enums, constants, per-charger session record
//! - **protocol**: The five-violation validation kit
//! - **handlers**: Inbound dispatcher + one handler per charge-point action
//! - **commands**: Outbound caller (operator → charger) with the
//!   one-in-flight pending-call slot
//! - **registry**: Fixed slot table (slot 0 is the supervisory UI)
//! - **gateway**: Operator gateway (handshake, commands, snapshots)
//! - **storage**: SeaORM telemetry tables (meter values, connector states,
//!   transaction events)
//! - **config**: Application configuration (TOML-based)

pub mod commands;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod storage;
pub mod support;

// Re-export commonly used types at crate root
pub use config::{default_config_path, AppConfig};
pub use registry::{Registry, SharedRegistry};
pub use server::OcppServer;
pub use storage::{init_database, SqlTelemetry, TelemetrySink};
