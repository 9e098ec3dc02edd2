//! RemoteStartTransaction command

use serde_json::Value;

use super::OutboundAction;
use crate::domain::types::RemoteStartStopStatus;
use crate::domain::ChargerSession;
use crate::protocol::{payload_object, require_enum, require_str, Checked};

pub(crate) fn prepare(payload: &Value) -> Option<(OutboundAction, Value)> {
    let obj = payload.as_object()?;
    let id_tag = require_str(obj, "idTag").ok()?.to_string();
    Some((
        OutboundAction::RemoteStartTransaction { id_tag },
        payload.clone(),
    ))
}

/// An accepted remote start authorizes the requested idTag, so the
/// charger's follow-up StartTransaction passes the authorization check.
pub(crate) fn validate_response(
    payload: &Value,
    id_tag: &str,
    session: &mut ChargerSession,
) -> Checked<()> {
    let obj = payload_object(payload)?;
    let status = require_enum::<RemoteStartStopStatus>(obj, "status")?;
    if status == RemoteStartStopStatus::Accepted {
        session.last_authorized_id_tag = id_tag.to_string();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_requires_id_tag() {
        let (action, _) = prepare(&json!({"idTag": "12345"})).unwrap();
        assert_eq!(
            action,
            OutboundAction::RemoteStartTransaction {
                id_tag: "12345".to_string()
            }
        );
        assert!(prepare(&json!({})).is_none());
        assert!(prepare(&json!({"idTag": ""})).is_none());
    }

    #[test]
    fn accepted_response_authorizes_the_tag() {
        let mut session = ChargerSession::new(1);
        validate_response(&json!({"status": "Accepted"}), "12345", &mut session).unwrap();
        assert_eq!(session.last_authorized_id_tag, "12345");
    }

    #[test]
    fn rejected_response_leaves_authorization_alone() {
        let mut session = ChargerSession::new(1);
        validate_response(&json!({"status": "Rejected"}), "12345", &mut session).unwrap();
        assert_eq!(session.last_authorized_id_tag, "");
    }
}
