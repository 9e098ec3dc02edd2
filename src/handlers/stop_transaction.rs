//! StopTransaction handler
//!
//! The connector being stopped is resolved by idTag match or transactionId
//! match; either may succeed. A request without an idTag is accepted
//! unconditionally and answered with an empty confirmation.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{call_result, ChargerHandler};
use crate::domain::authorization::id_tag_authorized;
use crate::domain::types::{AuthorizationStatus, StopReason};
use crate::domain::ID_TAG_LEN;
use crate::protocol::{
    payload_object, require_timestamp, Checked, Violation, TYPE_FAULT_MARKER,
};
use crate::storage::TransactionEventRow;
use crate::support::ocpp_frame::OcppFrame;
use crate::support::time::now_rfc3339;

#[derive(Debug)]
struct StopRequest<'a> {
    transaction_id: i64,
    id_tag: Option<&'a str>,
    reason: Option<StopReason>,
}

pub async fn handle(handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    let request = match parse(payload) {
        Ok(request) => request,
        Err(violation) => return violation.to_frame(unique_id),
    };

    let mut session = handler.session.lock().await;
    let connector = session.resolve_stop_connector(request.id_tag, request.transaction_id);
    if connector.is_none() {
        debug!(
            charger_id = handler.charger_id,
            transaction_id = request.transaction_id,
            "no connector matches this stop"
        );
    }

    // With an idTag present the reply carries a verdict; without one the
    // stop is accepted as-is and the confirmation stays empty.
    let reply = match request.id_tag {
        Some(id_tag) => {
            let accepted = id_tag_authorized(id_tag)
                && connector.is_some_and(|c| {
                    c > 0 && session.active_id_tags[c].eq_ignore_ascii_case(id_tag)
                })
                && session.last_authorized_id_tag.eq_ignore_ascii_case(id_tag);
            let status = if accepted {
                debug!(charger_id = handler.charger_id, "StopTransaction: Accepted");
                AuthorizationStatus::Accepted
            } else {
                warn!(
                    charger_id = handler.charger_id,
                    id_tag, "StopTransaction: Invalid idTag"
                );
                AuthorizationStatus::Invalid
            };
            let token: &'static str = status.into();
            json!({"idTagInfo": {"status": token}})
        }
        None => {
            debug!(charger_id = handler.charger_id, "StopTransaction: Accepted");
            json!({})
        }
    };

    if let Some(connector) = connector.filter(|c| *c > 0) {
        session.clear_connector(connector);
        let reason: &'static str = request.reason.map(Into::into).unwrap_or("");
        handler
            .telemetry
            .record_transaction_event(TransactionEventRow::stop(
                handler.charger_id as i32,
                connector as i32,
                now_rfc3339(),
                reason.to_string(),
            ))
            .await;
    }

    call_result(unique_id, reply)
}

fn parse(payload: &Value) -> Checked<StopRequest<'_>> {
    let obj = payload_object(payload)?;

    // Presence of the three required fields.
    for key in ["meterStop", "timestamp", "transactionId"] {
        match obj.get(key) {
            None | Some(Value::Null) => return Err(Violation::Protocol),
            Some(Value::String(s)) if s.is_empty() => return Err(Violation::Protocol),
            _ => {}
        }
    }

    // Types.
    if !matches!(obj["meterStop"].as_i64(), Some(n) if n >= 0) {
        return Err(Violation::TypeConstraint);
    }
    let transaction_id = match obj["transactionId"].as_i64() {
        Some(n) if n >= 0 => n,
        _ => return Err(Violation::TypeConstraint),
    };
    let timestamp = match &obj["timestamp"] {
        Value::String(s) if s == TYPE_FAULT_MARKER => return Err(Violation::TypeConstraint),
        Value::String(s) => s,
        _ => return Err(Violation::TypeConstraint),
    };
    match obj.get("idTag") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => return Err(Violation::TypeConstraint),
    }
    if matches!(obj.get("idTag"), Some(Value::String(s)) if s == TYPE_FAULT_MARKER) {
        return Err(Violation::TypeConstraint);
    }
    match obj.get("reason") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => return Err(Violation::TypeConstraint),
    }
    if matches!(obj.get("reason"), Some(Value::String(s)) if s == TYPE_FAULT_MARKER) {
        return Err(Violation::TypeConstraint);
    }

    // Properties.
    require_timestamp(timestamp)?;
    if matches!(obj.get("idTag"), Some(Value::String(s)) if s.is_empty()) {
        return Err(Violation::PropertyConstraint);
    }
    let reason = match obj.get("reason") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(
            s.parse::<StopReason>()
                .map_err(|_| Violation::PropertyConstraint)?,
        ),
        Some(_) => return Err(Violation::TypeConstraint),
    };

    // Occurrence.
    let id_tag = obj.get("idTag").and_then(Value::as_str);
    if id_tag.is_some_and(|tag| tag.len() > ID_TAG_LEN) {
        return Err(Violation::OccurrenceConstraint);
    }

    // Optional transactionData carries the same nested shape as
    // MeterValues and is validated, though not persisted.
    if let Some(value) = obj.get("transactionData") {
        if !value.is_null() {
            let entries = value.as_array().ok_or(Violation::TypeConstraint)?;
            for entry in entries {
                let entry = entry.as_object().ok_or(Violation::Formation)?;
                validate_transaction_datum(entry)?;
            }
        }
    }

    Ok(StopRequest {
        transaction_id,
        id_tag,
        reason,
    })
}

fn validate_transaction_datum(entry: &Map<String, Value>) -> Checked<()> {
    let timestamp = match entry.get("timestamp") {
        None | Some(Value::Null) => return Err(Violation::Protocol),
        Some(Value::String(s)) if s.is_empty() => return Err(Violation::Protocol),
        Some(Value::String(s)) if s == TYPE_FAULT_MARKER => {
            return Err(Violation::TypeConstraint)
        }
        Some(Value::String(s)) => s,
        Some(_) => return Err(Violation::TypeConstraint),
    };
    require_timestamp(timestamp)?;

    let samples = match entry.get("sampledValue") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Violation::TypeConstraint),
    };
    for sample in samples {
        let sample = sample.as_object().ok_or(Violation::Formation)?;

        match sample.get("value") {
            None | Some(Value::Null) => return Err(Violation::Protocol),
            Some(Value::String(s)) if s.is_empty() => return Err(Violation::Protocol),
            Some(Value::String(s)) if s == TYPE_FAULT_MARKER => {
                return Err(Violation::TypeConstraint)
            }
            Some(Value::String(_)) => {}
            Some(_) => return Err(Violation::TypeConstraint),
        }

        for key in ["context", "format", "measurand", "phase", "location", "unit"] {
            match sample.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) if s == TYPE_FAULT_MARKER => {
                    return Err(Violation::TypeConstraint)
                }
                Some(Value::String(_)) => {}
                Some(_) => return Err(Violation::TypeConstraint),
            }
        }

        use crate::domain::types::{Location, Measurand, Phase, ReadingContext, UnitOfMeasure, ValueFormat};
        decode_token::<ReadingContext>(sample, "context")?;
        decode_token::<ValueFormat>(sample, "format")?;
        decode_token::<Measurand>(sample, "measurand")?;
        decode_token::<Phase>(sample, "phase")?;
        decode_token::<Location>(sample, "location")?;
        decode_token::<UnitOfMeasure>(sample, "unit")?;
    }
    Ok(())
}

fn decode_token<T: std::str::FromStr>(obj: &Map<String, Value>, key: &str) -> Checked<()> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) => s
            .parse::<T>()
            .map(|_| ())
            .map_err(|_| Violation::PropertyConstraint),
        Some(_) => Err(Violation::TypeConstraint),
    }
}
