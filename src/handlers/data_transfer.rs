//! DataTransfer handler (charge point → Central System)
//!
//! No vendor-specific semantics are implemented, so every well-formed
//! request is answered with `UnknownMessageId`.

use serde_json::{json, Value};

use super::{call_result, ChargerHandler};
use crate::domain::types::DataTransferStatus;
use crate::protocol::{bounded, payload_object, Checked, Violation, TYPE_FAULT_MARKER};
use crate::support::ocpp_frame::OcppFrame;

pub async fn handle(_handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    if let Err(violation) = parse(payload) {
        return violation.to_frame(unique_id);
    }
    let token: &'static str = DataTransferStatus::UnknownMessageId.into();
    call_result(unique_id, json!({"status": token}))
}

fn parse(payload: &Value) -> Checked<()> {
    let obj = payload_object(payload)?;

    // Presence of the only required field.
    match obj.get("vendorId") {
        None | Some(Value::Null) => return Err(Violation::Protocol),
        Some(Value::String(s)) if s.is_empty() => return Err(Violation::Protocol),
        _ => {}
    }

    // Types before properties: every present field must be a string.
    for key in ["vendorId", "messageId", "data"] {
        match obj.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s == TYPE_FAULT_MARKER => {
                return Err(Violation::TypeConstraint)
            }
            Some(Value::String(_)) => {}
            Some(_) => return Err(Violation::TypeConstraint),
        }
    }

    // Optional fields present but empty.
    for key in ["messageId", "data"] {
        if matches!(obj.get(key), Some(Value::String(s)) if s.is_empty()) {
            return Err(Violation::PropertyConstraint);
        }
    }

    // Length bounds.
    if let Some(Value::String(vendor_id)) = obj.get("vendorId") {
        bounded(vendor_id, 255)?;
    }
    if let Some(Value::String(message_id)) = obj.get("messageId") {
        bounded(message_id, 50)?;
    }

    Ok(())
}
