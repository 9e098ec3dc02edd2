//! DataTransfer command (Central System → charge point)

use serde_json::Value;

use super::OutboundAction;
use crate::domain::types::DataTransferStatus;
use crate::protocol::{optional_str, payload_object, require_enum, require_str, Checked};

pub(crate) fn prepare(payload: &Value) -> Option<(OutboundAction, Value)> {
    let obj = payload.as_object()?;
    require_str(obj, "vendorId").ok()?;
    Some((OutboundAction::DataTransfer, payload.clone()))
}

pub(crate) fn validate_response(payload: &Value) -> Checked<()> {
    let obj = payload_object(payload)?;
    require_enum::<DataTransferStatus>(obj, "status")?;
    optional_str(obj, "data")?;
    Ok(())
}
