//! Heartbeat handler

use serde_json::{json, Value};

use super::{call_result, ChargerHandler};
use crate::protocol::{Checked, Violation};
use crate::support::ocpp_frame::OcppFrame;
use crate::support::time::now_rfc3339;

pub async fn handle(_handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    if let Err(violation) = parse(payload) {
        return violation.to_frame(unique_id);
    }
    call_result(unique_id, json!({"currentTime": now_rfc3339()}))
}

/// A Heartbeat carries no fields at all.
fn parse(payload: &Value) -> Checked<()> {
    let obj = payload.as_object().ok_or(Violation::Formation)?;
    if !obj.is_empty() {
        return Err(Violation::Protocol);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_empty_object_is_accepted() {
        assert!(parse(&json!({})).is_ok());
        assert_eq!(parse(&json!({"extra": 1})).unwrap_err(), Violation::Protocol);
        assert_eq!(parse(&json!([])).unwrap_err(), Violation::Formation);
        assert_eq!(parse(&json!(null)).unwrap_err(), Violation::Formation);
    }
}
