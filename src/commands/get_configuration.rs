//! GetConfiguration command

use serde_json::Value;

use super::OutboundAction;
use crate::domain::types::ConfigKey;
use crate::domain::ChargerSession;
use crate::protocol::{bounded, payload_object, require_str, Checked, Violation};

/// The request is forwarded as typed by the operator; an empty object asks
/// for every key the charger knows.
pub(crate) fn prepare(payload: &Value) -> Option<(OutboundAction, Value)> {
    payload.as_object()?;
    Some((OutboundAction::GetConfiguration, payload.clone()))
}

/// Walk `configurationKey` and `unknownKey`. Recognised standard keys are
/// retained on the session; unknown keys are only length-checked.
pub(crate) fn validate_response(payload: &Value, session: &mut ChargerSession) -> Checked<()> {
    let obj = payload_object(payload)?;

    if let Some(value) = obj.get("configurationKey") {
        let entries = value.as_array().ok_or(Violation::TypeConstraint)?;
        for entry in entries {
            let entry = entry.as_object().ok_or(Violation::Formation)?;
            let key = require_str(entry, "key")?;
            bounded(key, 50)?;

            // Unlike the field helpers, an empty configuration value is
            // legitimate; only the type and the length bound are checked.
            let config_value = match entry.get("value") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if s == "err" => return Err(Violation::TypeConstraint),
                Some(Value::String(s)) => Some(s.as_str()),
                Some(_) => return Err(Violation::TypeConstraint),
            };

            if let Some(config_value) = config_value {
                bounded(config_value, 500)?;
                if let Ok(standard_key) = key.parse::<ConfigKey>() {
                    session
                        .config_keys
                        .insert(standard_key, config_value.to_string());
                }
            }
        }
    }

    if let Some(value) = obj.get("unknownKey") {
        let keys = value.as_array().ok_or(Violation::TypeConstraint)?;
        for key in keys {
            let key = key.as_str().ok_or(Violation::TypeConstraint)?;
            bounded(key, 500)?;
        }
    }

    Ok(())
}
