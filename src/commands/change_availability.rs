//! ChangeAvailability command

use serde_json::Value;

use super::OutboundAction;
use crate::domain::types::{AvailabilityStatus, AvailabilityType};
use crate::protocol::{payload_object, require_enum, require_int, Checked};

pub(crate) fn prepare(payload: &Value) -> Option<(OutboundAction, Value)> {
    let obj = payload.as_object()?;
    require_int(obj, "connectorId").ok()?;
    require_enum::<AvailabilityType>(obj, "type").ok()?;
    Some((OutboundAction::ChangeAvailability, payload.clone()))
}

pub(crate) fn validate_response(payload: &Value) -> Checked<()> {
    let obj = payload_object(payload)?;
    require_enum::<AvailabilityStatus>(obj, "status")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Violation;
    use serde_json::json;

    #[test]
    fn request_requires_connector_and_type() {
        assert!(prepare(&json!({"connectorId": 1, "type": "Inoperative"})).is_some());
        assert!(prepare(&json!({"connectorId": 1})).is_none());
        assert!(prepare(&json!({"type": "Operative"})).is_none());
        assert!(prepare(&json!({"connectorId": 1, "type": "Broken"})).is_none());
        assert!(prepare(&json!("text")).is_none());
    }

    #[test]
    fn response_status_is_checked() {
        let mut session = crate::domain::ChargerSession::new(1);
        let action = OutboundAction::ChangeAvailability;
        assert!(super::super::validate_response(
            &action,
            &json!({"status": "Scheduled"}),
            &mut session
        )
        .is_ok());
        assert_eq!(
            validate_response(&json!({})).unwrap_err(),
            Violation::Protocol
        );
        assert_eq!(
            validate_response(&json!({"status": 3})).unwrap_err(),
            Violation::TypeConstraint
        );
        assert_eq!(
            validate_response(&json!({"status": "Maybe"})).unwrap_err(),
            Violation::PropertyConstraint
        );
    }
}
