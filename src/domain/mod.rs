//! Core protocol vocabulary and per-charger state.

pub mod authorization;
pub mod session;
pub mod types;

pub use session::{ChargerSession, NO_CHARGING, NO_TRANSACTION};
pub use types::{
    AuthorizationStatus, AvailabilityStatus, AvailabilityType, BootStatus, ChargePointErrorCode,
    ClearCacheStatus, ConfigKey, ConnectorStatus, DataTransferStatus, Location, Measurand, Phase,
    ReadingContext, RemoteStartStopStatus, ResetStatus, ResetType, StopReason, UnitOfMeasure,
    UnlockStatus, ValueFormat,
};

/// Connectors per charge point; index 0 addresses the charge point itself.
pub const NUM_CONNECTORS: usize = 2;

/// Charger slots in the registry; slot 0 is reserved for the operator UI.
pub const MAX_CHARGERS: usize = 5;

/// Heartbeat interval handed out in a successful BootNotification (seconds).
pub const HEARTBEAT_INTERVAL: i64 = 86_400;

/// Retry interval handed out when a BootNotification is rejected (seconds).
pub const RESEND_BOOT_NOTIFICATION_INTERVAL: i64 = 300;

/// Ceiling for an outbound call awaiting its response (seconds).
pub const CALL_TIMEOUT_SECS: u64 = 10;

/// Maximum idTag length set by the protocol.
pub const ID_TAG_LEN: usize = 20;
