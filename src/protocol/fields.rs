//! Tagged field extraction over `serde_json` values.
//!
//! Absent, wrong-type and out-of-range are distinct outcomes, each mapped
//! to its `Violation`, so handlers never confuse a missing field with a
//! malformed one.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use super::{Checked, Violation};

/// Charge point conformance tools mark a deliberate type fault by sending
/// the literal string "err" in place of a correctly typed value.
pub const TYPE_FAULT_MARKER: &str = "err";

/// The payload of a CALL or CALLRESULT must be a JSON object.
pub fn payload_object(payload: &Value) -> Checked<&Map<String, Value>> {
    payload.as_object().ok_or(Violation::Formation)
}

/// Required string: absent or empty is a protocol error, a non-string (or
/// the "err" marker) a type violation.
pub fn require_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Checked<&'a str> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(Violation::Protocol),
        Some(Value::String(s)) if s == TYPE_FAULT_MARKER => Err(Violation::TypeConstraint),
        Some(Value::String(s)) if s.is_empty() => Err(Violation::Protocol),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Violation::TypeConstraint),
    }
}

/// Optional string: present-but-empty violates a property constraint.
pub fn optional_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Checked<Option<&'a str>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s == TYPE_FAULT_MARKER => Err(Violation::TypeConstraint),
        Some(Value::String(s)) if s.is_empty() => Err(Violation::PropertyConstraint),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(Violation::TypeConstraint),
    }
}

/// Required non-negative integer.
pub fn require_int(obj: &Map<String, Value>, key: &str) -> Checked<i64> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(Violation::Protocol),
        Some(value) => match value.as_i64() {
            Some(n) if n >= 0 => Ok(n),
            _ => Err(Violation::TypeConstraint),
        },
    }
}

/// Optional non-negative integer.
pub fn optional_int(obj: &Map<String, Value>, key: &str) -> Checked<Option<i64>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_i64() {
            Some(n) if n >= 0 => Ok(Some(n)),
            _ => Err(Violation::TypeConstraint),
        },
    }
}

/// Required non-empty array.
pub fn require_array<'a>(obj: &'a Map<String, Value>, key: &str) -> Checked<&'a Vec<Value>> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(Violation::Protocol),
        Some(Value::Array(items)) if items.is_empty() => Err(Violation::Protocol),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(Violation::TypeConstraint),
    }
}

/// Required enum token: a well-typed but unrecognised token violates a
/// property constraint.
pub fn require_enum<T: FromStr>(obj: &Map<String, Value>, key: &str) -> Checked<T> {
    let token = require_str(obj, key)?;
    token.parse().map_err(|_| Violation::PropertyConstraint)
}

/// Optional enum token.
pub fn optional_enum<T: FromStr>(obj: &Map<String, Value>, key: &str) -> Checked<Option<T>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s == TYPE_FAULT_MARKER => Err(Violation::TypeConstraint),
        Some(Value::String(s)) => s
            .parse()
            .map(Some)
            .map_err(|_| Violation::PropertyConstraint),
        Some(_) => Err(Violation::TypeConstraint),
    }
}

/// RFC 3339 timestamp with a `Z` or `±HH:MM` suffix.
pub fn require_timestamp(raw: &str) -> Checked<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).map_err(|_| Violation::PropertyConstraint)
}

/// String length bound from the OCPP field tables.
pub fn bounded(value: &str, max: usize) -> Checked<()> {
    if value.len() > max {
        Err(Violation::OccurrenceConstraint)
    } else {
        Ok(())
    }
}
