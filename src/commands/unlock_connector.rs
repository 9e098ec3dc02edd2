//! UnlockConnector command

use serde_json::Value;

use super::OutboundAction;
use crate::domain::types::UnlockStatus;
use crate::protocol::{payload_object, require_enum, require_int, Checked};

pub(crate) fn prepare(payload: &Value) -> Option<(OutboundAction, Value)> {
    let obj = payload.as_object()?;
    require_int(obj, "connectorId").ok()?;
    Some((OutboundAction::UnlockConnector, payload.clone()))
}

pub(crate) fn validate_response(payload: &Value) -> Checked<()> {
    let obj = payload_object(payload)?;
    require_enum::<UnlockStatus>(obj, "status")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_requires_connector_id() {
        assert!(prepare(&json!({"connectorId": 1})).is_some());
        assert!(prepare(&json!({})).is_none());
        assert!(prepare(&json!({"connectorId": -1})).is_none());
    }

    #[test]
    fn response_accepts_all_unlock_statuses() {
        for status in ["Unlocked", "UnlockFailed", "NotSupported"] {
            assert!(validate_response(&json!({"status": status})).is_ok());
        }
    }
}
