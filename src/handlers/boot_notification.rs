//! BootNotification handler
//!
//! The only action accepted from an unbooted charger. A successful boot
//! flips the session to `Accepted` and records vendor and model.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{call_result, ChargerHandler};
use crate::domain::authorization::{model_known, vendor_known, ENFORCE_BOOT_ALLOW_LIST};
use crate::domain::types::BootStatus;
use crate::domain::{HEARTBEAT_INTERVAL, ID_TAG_LEN, RESEND_BOOT_NOTIFICATION_INTERVAL};
use crate::protocol::{payload_object, Checked, Violation, TYPE_FAULT_MARKER};
use crate::support::ocpp_frame::OcppFrame;
use crate::support::time::now_rfc3339;

const REQUIRED: [&str; 2] = ["chargePointVendor", "chargePointModel"];
const OPTIONAL: [&str; 7] = [
    "chargePointSerialNumber",
    "chargeBoxSerialNumber",
    "firmwareVersion",
    "iccid",
    "imsi",
    "meterType",
    "meterSerialNumber",
];

pub async fn handle(handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    let (vendor, model) = match parse(payload) {
        Ok(fields) => fields,
        Err(violation) => return violation.to_frame(unique_id),
    };

    let mut session = handler.session.lock().await;

    // Vendor/model allow-listing is an opt-in policy; by default every
    // well-formed boot is accepted.
    let accepted = !ENFORCE_BOOT_ALLOW_LIST || (vendor_known(vendor) && model_known(model));

    let (status, interval) = if accepted {
        session.boot_status = BootStatus::Accepted;
        session.vendor = vendor.to_string();
        session.model = model.to_string();
        info!(charger_id = handler.charger_id, vendor, model, "boot accepted");
        (BootStatus::Accepted, HEARTBEAT_INTERVAL)
    } else {
        warn!(charger_id = handler.charger_id, vendor, model, "boot rejected by allow-list");
        (BootStatus::Rejected, RESEND_BOOT_NOTIFICATION_INTERVAL)
    };

    call_result(
        unique_id,
        json!({
            "currentTime": now_rfc3339(),
            "interval": interval,
            "status": status.token(),
        }),
    )
}

fn parse(payload: &Value) -> Checked<(&str, &str)> {
    let obj = payload_object(payload)?;

    // Required fields must be present and non-empty before anything else
    // is diagnosed.
    for key in REQUIRED {
        match obj.get(key) {
            None | Some(Value::Null) => return Err(Violation::Protocol),
            Some(Value::String(s)) if s.is_empty() => return Err(Violation::Protocol),
            _ => {}
        }
    }

    // Every present field must be a string.
    for key in REQUIRED.into_iter().chain(OPTIONAL) {
        check_string_type(obj, key)?;
    }

    // Optional fields, when present, must be non-empty.
    for key in OPTIONAL {
        if matches!(obj.get(key), Some(Value::String(s)) if s.is_empty()) {
            return Err(Violation::PropertyConstraint);
        }
    }

    // Every field shares the 20-character bound.
    for key in REQUIRED.into_iter().chain(OPTIONAL) {
        if let Some(Value::String(s)) = obj.get(key) {
            if s.len() > ID_TAG_LEN {
                return Err(Violation::OccurrenceConstraint);
            }
        }
    }

    let vendor = obj["chargePointVendor"].as_str().unwrap_or_default();
    let model = obj["chargePointModel"].as_str().unwrap_or_default();
    Ok((vendor, model))
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
        json!({
            "chargePointVendor": "MicroOcpp",
            "chargePointModel": "MicroOcpp Simulator",
        })
    }

    #[test]
    fn minimal_and_full_payloads_parse() {
        assert_eq!(
            parse(&valid()).unwrap(),
            ("MicroOcpp", "MicroOcpp Simulator")
        );
        let full = json!({
            "chargePointVendor": "MicroOcpp",
            "chargePointModel": "MicroOcpp Simulator",
            "chargePointSerialNumber": "cp-001",
            "chargeBoxSerialNumber": "box-001",
            "firmwareVersion": "1.2.3",
            "iccid": "891004234814455936",
            "imsi": "310150123456789",
            "meterType": "energy",
            "meterSerialNumber": "m-001",
        });
        assert!(parse(&full).is_ok());
    }

    #[test]
    fn missing_required_fields_are_protocol_errors() {
        assert_eq!(parse(&json!({})).unwrap_err(), Violation::Protocol);
        assert_eq!(
            parse(&json!({"chargePointVendor": "MicroOcpp"})).unwrap_err(),
            Violation::Protocol
        );
        assert_eq!(
            parse(&json!({"chargePointVendor": "", "chargePointModel": "m"})).unwrap_err(),
            Violation::Protocol
        );
    }

    #[test]
    fn type_faults_win_over_later_checks() {
        let mut payload = valid();
        payload["chargePointVendor"] = json!("err");
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);

        // A type fault in an optional field beats its own emptiness check.
        let mut payload = valid();
        payload["firmwareVersion"] = json!(12);
        assert_eq!(parse(&payload).unwrap_err(), Violation::TypeConstraint);
    }

    #[test]
    fn missing_required_field_wins_over_a_type_fault_elsewhere() {
        let payload = json!({"chargePointModel": "err"});
        assert_eq!(parse(&payload).unwrap_err(), Violation::Protocol);
    }

    #[test]
    fn empty_optional_fields_violate_a_property() {
        let mut payload = valid();
        payload["iccid"] = json!("");
        assert_eq!(parse(&payload).unwrap_err(), Violation::PropertyConstraint);
    }

    #[test]
    fn oversized_fields_violate_occurrence() {
        let mut payload = valid();
        payload["chargePointModel"] = json!("m".repeat(21));
        assert_eq!(parse(&payload).unwrap_err(), Violation::OccurrenceConstraint);
    }
}
