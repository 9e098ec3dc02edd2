//! MeterValues handler
//!
//! The whole payload is validated first — nested `meterValue[]` and
//! `sampledValue[]` included — and only then is every sample appended to
//! the telemetry store, so a fault anywhere in the request persists
//! nothing.

use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::debug;

use super::{call_result, ChargerHandler};
use crate::domain::types::{Location, Measurand, Phase, ReadingContext, UnitOfMeasure, ValueFormat};
use crate::protocol::{
    payload_object, require_timestamp, Checked, Violation, TYPE_FAULT_MARKER,
};
use crate::storage::MeterSampleRow;
use crate::support::ocpp_frame::OcppFrame;

/// Enumerated, optional fields of a sampledValue.
const SAMPLE_ENUM_KEYS: [&str; 6] = ["context", "format", "measurand", "phase", "location", "unit"];

#[derive(Debug)]
struct ParsedSample {
    timestamp: String,
    value: String,
    unit: &'static str,
    measurand: &'static str,
    context: &'static str,
}

pub async fn handle(handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    let (connector_id, transaction_id, samples) = match parse(payload) {
        Ok(parsed) => parsed,
        Err(violation) => return violation.to_frame(unique_id),
    };

    debug!(
        charger_id = handler.charger_id,
        connector = connector_id,
        samples = samples.len(),
        "meter values accepted"
    );

    for sample in samples {
        handler
            .telemetry
            .record_meter_sample(MeterSampleRow {
                charger_id: handler.charger_id as i32,
                connector: connector_id as i32,
                transaction_id,
                timestamp: sample.timestamp,
                value: sample.value,
                unit: sample.unit.to_string(),
                measurand: sample.measurand.to_string(),
                context: sample.context.to_string(),
            })
            .await;
    }

    call_result(unique_id, serde_json::json!({}))
}

fn parse(payload: &Value) -> Checked<(i64, i64, Vec<ParsedSample>)> {
    let obj = payload_object(payload)?;

    // Presence: connectorId and a non-empty meterValue list.
    if matches!(obj.get("connectorId"), None | Some(Value::Null)) {
        return Err(Violation::Protocol);
    }
    let entries = match obj.get("meterValue") {
        None | Some(Value::Null) => return Err(Violation::Protocol),
        Some(Value::Array(items)) if items.is_empty() => return Err(Violation::Protocol),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Violation::TypeConstraint),
    };

    // Types.
    let connector_id = match obj["connectorId"].as_i64() {
        Some(n) if n >= 0 => n,
        _ => return Err(Violation::TypeConstraint),
    };
    let transaction_id = match obj.get("transactionId") {
        None | Some(Value::Null) => 0,
        Some(value) => match value.as_i64() {
            Some(n) if n >= 0 => n,
            _ => return Err(Violation::TypeConstraint),
        },
    };

    let mut samples = Vec::new();
    for entry in entries {
        let entry = entry.as_object().ok_or(Violation::Formation)?;

        // Presence within the entry.
        let timestamp_field = entry.get("timestamp");
        if matches!(timestamp_field, None | Some(Value::Null))
            || matches!(timestamp_field, Some(Value::String(s)) if s.is_empty())
        {
            return Err(Violation::Protocol);
        }
        let sampled = match entry.get("sampledValue") {
            None | Some(Value::Null) => return Err(Violation::Protocol),
            Some(Value::Array(items)) if items.is_empty() => return Err(Violation::Protocol),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(Violation::TypeConstraint),
        };

        // Type, then property, for the entry timestamp.
        let timestamp = match timestamp_field {
            Some(Value::String(s)) if s != TYPE_FAULT_MARKER => s,
            _ => return Err(Violation::TypeConstraint),
        };
        require_timestamp(timestamp)?;

        for sample in sampled {
            let sample = sample.as_object().ok_or(Violation::Formation)?;
            samples.push(parse_sample(sample, timestamp)?);
        }
    }

    Ok((connector_id, transaction_id, samples))
}

fn parse_sample(sample: &Map<String, Value>, timestamp: &str) -> Checked<ParsedSample> {
    // Presence: value is the only required field.
    let value = match sample.get("value") {
        None | Some(Value::Null) => return Err(Violation::Protocol),
        Some(Value::String(s)) if s.is_empty() => return Err(Violation::Protocol),
        Some(Value::String(s)) => s,
        Some(_) => return Err(Violation::TypeConstraint),
    };

    // Types: the value marker and every enum field's JSON type.
    if value == TYPE_FAULT_MARKER {
        return Err(Violation::TypeConstraint);
    }
    for key in SAMPLE_ENUM_KEYS {
        match sample.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s == TYPE_FAULT_MARKER => {
                return Err(Violation::TypeConstraint)
            }
            Some(Value::String(_)) => {}
            Some(_) => return Err(Violation::TypeConstraint),
        }
    }

    // Properties: each present token must decode.
    let context = parse_token::<ReadingContext>(sample, "context")?;
    parse_token::<ValueFormat>(sample, "format")?;
    let measurand = parse_token::<Measurand>(sample, "measurand")?;
    parse_token::<Phase>(sample, "phase")?;
    parse_token::<Location>(sample, "location")?;
    let unit = parse_token::<UnitOfMeasure>(sample, "unit")?;

    Ok(ParsedSample {
        timestamp: timestamp.to_string(),
        value: value.clone(),
        unit: unit.map(Into::into).unwrap_or(""),
        measurand: measurand.map(Into::into).unwrap_or(""),
        context: context.map(Into::into).unwrap_or(""),
    })
}

/// Decode a token already known to be a string (or absent).
fn parse_token<T: FromStr + Into<&'static str>>(
    obj: &Map<String, Value>,
    key: &str,
) -> Checked<Option<T>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(|_| Violation::PropertyConstraint),
        Some(_) => Err(Violation::TypeConstraint),
    }
}
