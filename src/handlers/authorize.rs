//! Authorize handler

use serde_json::{json, Value};
use tracing::{info, warn};

use super::{call_result, ChargerHandler};
use crate::domain::authorization::id_tag_authorized;
use crate::domain::types::AuthorizationStatus;
use crate::domain::ID_TAG_LEN;
use crate::protocol::{bounded, payload_object, require_str, Checked};
use crate::support::ocpp_frame::OcppFrame;

pub async fn handle(handler: &ChargerHandler, unique_id: &str, payload: &Value) -> OcppFrame {
    let id_tag = match parse(payload) {
        Ok(id_tag) => id_tag,
        Err(violation) => return violation.to_frame(unique_id),
    };

    let mut session = handler.session.lock().await;
    let status = if id_tag_authorized(id_tag) {
        session.last_authorized_id_tag = id_tag.to_string();
        info!(charger_id = handler.charger_id, id_tag, "Authorize: Accepted");
        AuthorizationStatus::Accepted
    } else {
        warn!(charger_id = handler.charger_id, id_tag, "Authorize: Invalid");
        AuthorizationStatus::Invalid
    };

    let token: &'static str = status.into();
    call_result(unique_id, json!({"idTagInfo": {"status": token}}))
}

fn parse(payload: &Value) -> Checked<&str> {
    let obj = payload_object(payload)?;
    let id_tag = require_str(obj, "idTag")?;
    bounded(id_tag, ID_TAG_LEN)?;
    Ok(id_tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Violation;

    #[test]
    fn parse_taxonomy() {
        assert_eq!(parse(&json!([])).unwrap_err(), Violation::Formation);
        assert_eq!(parse(&json!({})).unwrap_err(), Violation::Protocol);
        assert_eq!(parse(&json!({"idTag": ""})).unwrap_err(), Violation::Protocol);
        assert_eq!(
            parse(&json!({"idTag": 42})).unwrap_err(),
            Violation::TypeConstraint
        );
        assert_eq!(
            parse(&json!({"idTag": "err"})).unwrap_err(),
            Violation::TypeConstraint
        );
        assert_eq!(
            parse(&json!({"idTag": "a".repeat(21)})).unwrap_err(),
            Violation::OccurrenceConstraint
        );
        assert_eq!(parse(&json!({"idTag": "a".repeat(20)})).unwrap(), "a".repeat(20));
    }
}
