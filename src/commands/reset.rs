//! Reset command

use serde_json::Value;

use super::OutboundAction;
use crate::domain::types::{ResetStatus, ResetType};
use crate::protocol::{payload_object, require_enum, Checked};

pub(crate) fn prepare(payload: &Value) -> Option<(OutboundAction, Value)> {
    let obj = payload.as_object()?;
    require_enum::<ResetType>(obj, "type").ok()?;
    Some((OutboundAction::Reset, payload.clone()))
}

pub(crate) fn validate_response(payload: &Value) -> Checked<()> {
    let obj = payload_object(payload)?;
    require_enum::<ResetStatus>(obj, "status")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_requires_reset_type() {
        assert!(prepare(&json!({"type": "Hard"})).is_some());
        assert!(prepare(&json!({"type": "Soft"})).is_some());
        assert!(prepare(&json!({"type": "Warm"})).is_none());
        assert!(prepare(&json!({})).is_none());
    }
}
