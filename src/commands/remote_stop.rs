//! RemoteStopTransaction command

use serde_json::Value;

use super::OutboundAction;
use crate::domain::types::RemoteStartStopStatus;
use crate::protocol::{payload_object, require_enum, require_int, Checked};

pub(crate) fn prepare(payload: &Value) -> Option<(OutboundAction, Value)> {
    let obj = payload.as_object()?;
    require_int(obj, "transactionId").ok()?;
    Some((OutboundAction::RemoteStopTransaction, payload.clone()))
}

pub(crate) fn validate_response(payload: &Value) -> Checked<()> {
    let obj = payload_object(payload)?;
    require_enum::<RemoteStartStopStatus>(obj, "status")?;
    Ok(())
}
