//! StatusNotification handler
//!
//! Tracks connector state and drives the transaction binding rules:
//! `Available` releases whatever the connector was doing, `Charging` binds
//! the most recently minted transaction id to the connector.

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::{call_result, ChargerHandler};
use crate::domain::types::{ChargePointErrorCode, ConnectorStatus};
use crate::domain::NUM_CONNECTORS;
use crate::protocol::{payload_object, Checked, Violation, TYPE_FAULT_MARKER};
use crate::storage::{ConnectorStateRow, TransactionEventRow};
use crate::support::ocpp_frame::OcppFrame;
use crate::support::time::now_rfc3339;

#[derive(Debug)]
struct StatusReport {
    connector_id: usize,
    status: ConnectorStatus,
    error_code: ChargePointErrorCode,
}

pub async fn handle(handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    let report = match parse(payload) {
        Ok(report) => report,
        Err(violation) => return violation.to_frame(unique_id),
    };

    let mut session = handler.session.lock().await;
    session.connectors[report.connector_id] = report.status;

    info!(
        charger_id = handler.charger_id,
        connector = report.connector_id,
        status = report.status.token(),
        "status updated"
    );

    let now = now_rfc3339();
    let error_token: &'static str = report.error_code.into();
    handler
        .telemetry
        .record_connector_state(ConnectorStateRow {
            charger_id: handler.charger_id as i32,
            connector: report.connector_id as i32,
            status: report.status.token().to_string(),
            timestamp: now.clone(),
            error_code: error_token.to_string(),
        })
        .await;

    match report.status {
        ConnectorStatus::Available => {
            session.clear_connector(report.connector_id);
        }
        ConnectorStatus::Charging => {
            // The transaction minted by the preceding StartTransaction
            // becomes bound to this connector.
            session.active_transactions[report.connector_id] = session.current_transaction_id();
            debug!(
                charger_id = handler.charger_id,
                connector = report.connector_id,
                transaction_id = session.current_transaction_id(),
                "transaction bound"
            );
            handler
                .telemetry
                .record_transaction_event(TransactionEventRow::start(
                    handler.charger_id as i32,
                    report.connector_id as i32,
                    now,
                ))
                .await;
        }
        _ => {}
    }

    call_result(unique_id, json!({}))
}

fn parse(payload: &Value) -> Checked<StatusReport> {
    let obj = payload_object(payload)?;

    // Presence of required fields.
    for key in ["connectorId", "status", "errorCode"] {
        if matches!(obj.get(key), None | Some(Value::Null)) {
            return Err(Violation::Protocol);
        }
    }

    // Types: connectorId integral, everything else a string.
    let connector_id = match obj["connectorId"].as_i64() {
        Some(n) if n >= 0 => n,
        _ => return Err(Violation::TypeConstraint),
    };
    for key in ["status", "errorCode", "info", "vendorId", "vendorErrorCode", "timestamp"] {
        check_string_type(obj, key)?;
    }

    // Properties: connector range, enum tokens, empty optionals.
    if connector_id as usize > NUM_CONNECTORS {
        return Err(Violation::PropertyConstraint);
    }
    let status = obj["status"]
        .as_str()
        .and_then(ConnectorStatus::from_token)
        .ok_or(Violation::PropertyConstraint)?;
    let error_code = obj["errorCode"]
        .as_str()
        .and_then(|token| token.parse::<ChargePointErrorCode>().ok())
        .ok_or(Violation::PropertyConstraint)?;
    for key in ["info", "vendorId", "vendorErrorCode", "timestamp"] {
        if matches!(obj.get(key), Some(Value::String(s)) if s.is_empty()) {
            return Err(Violation::PropertyConstraint);
        }
    }

    // Occurrence bounds on the optional strings.
    for (key, max) in [("info", 50), ("vendorId", 255), ("vendorErrorCode", 50)] {
        if let Some(Value::String(s)) = obj.get(key) {
            if s.len() > max {
                return Err(Violation::OccurrenceConstraint);
            }
        }
    }

    Ok(StatusReport {
        connector_id: connector_id as usize,
        status,
        error_code,
    })
}

fn check_string_type(obj: &Map<String, Value>, key: &str) -> Checked<()> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) if s == TYPE_FAULT_MARKER => Err(Violation::TypeConstraint),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(Violation::TypeConstraint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Value {
        json!({"connectorId": 1, "status": "Available", "errorCode": "NoError"})
    }

    #[test]
    fn minimal_report_parses() {
        let report = parse(&valid()).unwrap();
        assert_eq!(report.connector_id, 1);
        assert_eq!(report.status, ConnectorStatus::Available);
        assert_eq!(report.error_code, ChargePointErrorCode::NoError);
    }

    #[test]
    fn connector_zero_addresses_the_charge_point() {
        let mut payload = valid();
        payload["connectorId"] = json!(0);
        assert_eq!(parse(&payload).unwrap().connector_id, 0);
    }

    #[test]
    fn taxonomy() {
        assert_eq!(parse(&json!({})).unwrap_err(), Violation::Protocol);

        let mut payload = valid();
        payload["connectorId"] = json!(-3);
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);

        let mut payload = valid();
        payload["status"] = json!("err");
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);

        let mut payload = valid();
        payload["connectorId"] = json!(NUM_CONNECTORS + 1);
        assert_eq!(parse(&payload).unwrap_err(), Violation::PropertyConstraint);

        // "Unknown" is a local sentinel, not an acceptable wire token.
        let mut payload = valid();
        payload["status"] = json!("Unknown");
        assert_eq!(parse(&payload).unwrap_err(), Violation::PropertyConstraint);

        let mut payload = valid();
        payload["info"] = json!("");
        assert_eq!(parse(&payload).unwrap_err(), Violation::PropertyConstraint);

        let mut payload = valid();
        payload["vendorId"] = json!("v".repeat(256));
        assert_eq!(parse(&payload).unwrap_err(), Violation::OccurrenceConstraint);

        let mut payload = valid();
        payload["info"] = json!("i".repeat(50));
        assert!(parse(&payload).is_ok());
    }
}
