//! ClearCache command

use serde_json::{json, Value};

use super::OutboundAction;
use crate::domain::types::ClearCacheStatus;
use crate::protocol::{payload_object, require_enum, Checked};

/// ClearCache carries no fields; whatever the operator typed is replaced by
/// the empty object.
pub(crate) fn prepare(_payload: &Value) -> Option<(OutboundAction, Value)> {
    Some((OutboundAction::ClearCache, json!({})))
}

pub(crate) fn validate_response(payload: &Value) -> Checked<()> {
    let obj = payload_object(payload)?;
    require_enum::<ClearCacheStatus>(obj, "status")?;
    Ok(())
}
