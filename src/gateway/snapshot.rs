//! Compact state snapshots pushed to the operator UI.
//!
//! Two shapes exist: an 8-field frame describing connectors and active
//! transactions, and a boot frame describing registration state. Connector
//! and boot statuses travel as the numeric ordinals the web client renders.

use serde_json::{json, Value};

use crate::domain::types::BootStatus;
use crate::domain::{ChargerSession, ConnectorStatus, NO_CHARGING, NO_TRANSACTION};

/// Connector/transaction snapshot. Every snapshot describes the session it
/// was taken from, never another slot.
pub fn state(kind: &str, session: &ChargerSession) -> Value {
    json!({
        "charger": session.charger_id.to_string(),
        "type": kind,
        "connector1": session.connectors[1].ordinal(),
        "connector2": session.connectors[2].ordinal(),
        "idTag1": session.active_id_tags[1],
        "idTag2": session.active_id_tags[2],
        "transactionId1": session.active_transactions[1],
        "transactionId2": session.active_transactions[2],
    })
}

/// Boot state snapshot.
pub fn boot(session: &ChargerSession) -> Value {
    json!({
        "charger": session.charger_id.to_string(),
        "type": "bootNotification",
        "general": session.boot_status.ordinal(),
        "vendor": session.vendor,
        "model": session.model,
    })
}

/// Synthetic pair describing a slot with no charger behind it, used to
/// prime the UI for empty slots and to clear it when a charger disconnects.
pub fn offline_pair(charger_id: usize) -> (Value, Value) {
    let stop = json!({
        "charger": charger_id.to_string(),
        "type": "stopTransaction",
        "connector1": ConnectorStatus::Unknown.ordinal(),
        "connector2": ConnectorStatus::Unknown.ordinal(),
        "idTag1": NO_CHARGING,
        "idTag2": NO_CHARGING,
        "transactionId1": NO_TRANSACTION,
        "transactionId2": NO_TRANSACTION,
    });
    let boot = json!({
        "charger": charger_id.to_string(),
        "type": "bootNotification",
        "general": BootStatus::Rejected.ordinal(),
        "vendor": "",
        "model": "",
    });
    (stop, boot)
}
