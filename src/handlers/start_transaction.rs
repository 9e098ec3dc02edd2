//! StartTransaction handler
//!
//! A transaction id is minted on every branch, accepted or not; the
//! binding of that id to the connector happens on the StatusNotification
//! `Charging` that follows an accepted start.

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{call_result, ChargerHandler};
use crate::domain::authorization::id_tag_authorized;
use crate::domain::types::{AuthorizationStatus, ConnectorStatus};
use crate::domain::{ID_TAG_LEN, NO_TRANSACTION, NUM_CONNECTORS};
use crate::protocol::{payload_object, require_timestamp, Checked, Violation, TYPE_FAULT_MARKER};
use crate::support::ocpp_frame::OcppFrame;

#[derive(Debug)]
struct StartRequest<'a> {
    connector_id: usize,
    id_tag: &'a str,
}

pub async fn handle(handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    let request = match parse(payload) {
        Ok(request) => request,
        Err(violation) => return violation.to_frame(unique_id),
    };

    let mut session = handler.session.lock().await;
    let transaction_id = session.mint_transaction_id();

    let status = if !id_tag_authorized(request.id_tag)
        || !request
            .id_tag
            .eq_ignore_ascii_case(&session.last_authorized_id_tag)
    {
        warn!(
            charger_id = handler.charger_id,
            id_tag = request.id_tag,
            "StartTransaction: idTag not valid"
        );
        AuthorizationStatus::Invalid
    } else if session.active_transactions[request.connector_id] != NO_TRANSACTION
        || session.id_tag_in_use(request.id_tag)
    {
        warn!(
            charger_id = handler.charger_id,
            connector = request.connector_id,
            "StartTransaction: concurrentTx"
        );
        AuthorizationStatus::ConcurrentTx
    } else if session.connectors[0] == ConnectorStatus::Unavailable
        || !session.connectors[request.connector_id].chargeable()
    {
        warn!(
            charger_id = handler.charger_id,
            connector = request.connector_id,
            "StartTransaction: connector not available"
        );
        AuthorizationStatus::Invalid
    } else {
        // The idTag occupies the connector now; the transaction binds on
        // the upcoming Charging status report.
        session.active_id_tags[request.connector_id] = request.id_tag.to_string();
        debug!(charger_id = handler.charger_id, transaction_id, "StartTransaction: Accepted");
        AuthorizationStatus::Accepted
    };

    let token: &'static str = status.into();
    call_result(
        unique_id,
        json!({
            "transactionId": transaction_id,
            "idTagInfo": {"status": token},
        }),
    )
}

fn parse(payload: &Value) -> Checked<StartRequest<'_>> {
    let obj = payload_object(payload)?;

    // Presence of the four required fields; empty strings count as absent.
    for key in ["connectorId", "idTag", "meterStart", "timestamp"] {
        match obj.get(key) {
            None | Some(Value::Null) => return Err(Violation::Protocol),
            Some(Value::String(s)) if s.is_empty() => return Err(Violation::Protocol),
            _ => {}
        }
    }

    // Types.
    let connector_id = match obj["connectorId"].as_i64() {
        Some(n) if n >= 0 => n,
        _ => return Err(Violation::TypeConstraint),
    };
    if !matches!(obj["meterStart"].as_i64(), Some(n) if n >= 0) {
        return Err(Violation::TypeConstraint);
    }
    for key in ["idTag", "timestamp"] {
        match &obj[key] {
            Value::String(s) if s == TYPE_FAULT_MARKER => return Err(Violation::TypeConstraint),
            Value::String(_) => {}
            _ => return Err(Violation::TypeConstraint),
        }
    }
    match obj.get("reservationId") {
        None | Some(Value::Null) => {}
        Some(value) => {
            if !matches!(value.as_i64(), Some(n) if n >= 0) {
                return Err(Violation::TypeConstraint);
            }
        }
    }

    // Properties: connector 0 (the charge point itself) cannot host a
    // transaction, nor can a connector beyond the configured count.
    if connector_id == 0 || connector_id as usize > NUM_CONNECTORS {
        return Err(Violation::PropertyConstraint);
    }
    let timestamp = obj["timestamp"].as_str().unwrap_or_default();
    require_timestamp(timestamp)?;

    // Occurrence.
    let id_tag = obj["idTag"].as_str().unwrap_or_default();
    if id_tag.len() > ID_TAG_LEN {
        return Err(Violation::OccurrenceConstraint);
    }

    Ok(StartRequest {
        connector_id: connector_id as usize,
        id_tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Value {
        json!({
            "connectorId": 1,
            "idTag": "12345",
            "meterStart": 0,
            "timestamp": "2024-01-01T00:00:00Z",
        })
    }

    #[test]
    fn minimal_request_parses() {
        let payload = valid();
        let request = parse(&payload).unwrap();
        assert_eq!(request.connector_id, 1);
        assert_eq!(request.id_tag, "12345");
    }

    #[test]
    fn reservation_id_is_optional_but_typed() {
        let mut payload = valid();
        payload["reservationId"] = json!(7);
        assert!(parse(&payload).is_ok());
        payload["reservationId"] = json!(-1);
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);
        payload["reservationId"] = json!("7");
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);
    }

    #[test]
    fn taxonomy() {
        for key in ["connectorId", "idTag", "meterStart", "timestamp"] {
            let mut payload = valid();
            payload.as_object_mut().unwrap().remove(key);
            assert_eq!(parse(&payload).unwrap_err(), Violation::Protocol, "{key}");
        }

        let mut payload = valid();
        payload["meterStart"] = json!(-5);
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);

        let mut payload = valid();
        payload["idTag"] = json!("err");
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);

        // Connector bounds: 0 and N+1 violate a property, 1..=N are fine.
        for (connector, expect_ok) in [(0, false), (1, true), (NUM_CONNECTORS as i64, true)] {
            let mut payload = valid();
            payload["connectorId"] = json!(connector);
            assert_eq!(parse(&payload).is_ok(), expect_ok, "connector {connector}");
        }
        let mut payload = valid();
        payload["connectorId"] = json!(NUM_CONNECTORS + 1);
        assert_eq!(parse(&payload).unwrap_err(), Violation::PropertyConstraint);

        let mut payload = valid();
        payload["timestamp"] = json!("not-a-time");
        assert_eq!(parse(&payload).unwrap_err(), Violation::PropertyConstraint);

        let mut payload = valid();
        payload["timestamp"] = json!("2024-01-01T00:00:00+02:00");
        assert!(parse(&payload).is_ok());

        let mut payload = valid();
        payload["idTag"] = json!("t".repeat(21));
        assert_eq!(parse(&payload).unwrap_err(), Violation::OccurrenceConstraint);
    }
}
