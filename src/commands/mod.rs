//! Operator-initiated calls (Central System → charge point).
//!
//! The operator gateway hands a raw action token and JSON payload to
//! [`dispatch`]. The payload is schema-checked first; a bad payload is
//! logged and dropped without touching the wire. A good payload takes the
//! session's pending-call slot, goes out as a CALL stamped with the slot's
//! next uniqueId, and the calling path waits — bounded by the protocol
//! timeout — until the charger's dispatcher releases the slot.

pub mod pending;

pub mod change_availability;
pub mod clear_cache;
pub mod data_transfer;
pub mod get_configuration;
pub mod remote_start;
pub mod remote_stop;
pub mod reset;
pub mod unlock_connector;

use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::domain::{ChargerSession, CALL_TIMEOUT_SECS};
use crate::protocol::Checked;
use crate::registry::SlotRef;
use crate::support::ocpp_frame::OcppFrame;

use pending::CallOutcome;

/// Log line for an operator payload that fails its schema check.
const MALFORMED_REQUEST: &str =
    "Payload for Action is syntactically incorrect or not conform the PDU structure for Action";

/// The outbound actions the operator may issue. This set is exhaustive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAction {
    ChangeAvailability,
    ClearCache,
    DataTransfer,
    GetConfiguration,
    RemoteStartTransaction { id_tag: String },
    RemoteStopTransaction,
    Reset,
    UnlockConnector,
}

impl OutboundAction {
    /// OCPP action name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChangeAvailability => "ChangeAvailability",
            Self::ClearCache => "ClearCache",
            Self::DataTransfer => "DataTransfer",
            Self::GetConfiguration => "GetConfiguration",
            Self::RemoteStartTransaction { .. } => "RemoteStartTransaction",
            Self::RemoteStopTransaction => "RemoteStopTransaction",
            Self::Reset => "Reset",
            Self::UnlockConnector => "UnlockConnector",
        }
    }
}

/// Schema-check an operator command and send it to the target charger,
/// then wait for the slot to come back to Idle or the deadline to expire.
pub async fn dispatch(slot: &SlotRef, action_token: &str, payload_text: &str) {
    let charger_id = slot.charger_id;

    let payload: Value = match serde_json::from_str(payload_text) {
        Ok(value) => value,
        Err(_) => {
            warn!(charger_id, action = action_token, "{}", MALFORMED_REQUEST);
            return;
        }
    };

    let prepared = match action_token {
        "changeAvailability" => change_availability::prepare(&payload),
        "clearCache" => clear_cache::prepare(&payload),
        "dataTransfer" => data_transfer::prepare(&payload),
        "getConfiguration" => get_configuration::prepare(&payload),
        "remoteStartTransaction" => remote_start::prepare(&payload),
        "remoteStopTransaction" => remote_stop::prepare(&payload),
        "reset" => reset::prepare(&payload),
        "unlockConnector" => unlock_connector::prepare(&payload),
        _ => {
            warn!(charger_id, action = action_token, "unknown operator action");
            return;
        }
    };

    let (action, payload) = match prepared {
        Some(ready) => ready,
        None => {
            warn!(charger_id, action = action_token, "{}", MALFORMED_REQUEST);
            return;
        }
    };

    let action_name = action.name();
    let (unique_id, receiver) = match slot.pending.begin(action) {
        Ok(call) => call,
        Err(_) => {
            warn!(charger_id, action = action_token, "a call is already in flight");
            return;
        }
    };

    let frame = OcppFrame::Call {
        unique_id: unique_id.clone(),
        action: action_name.to_string(),
        payload,
    };

    info!(charger_id, unique_id = unique_id.as_str(), "sending {}", frame.serialize());
    if slot.sender.send(frame.serialize()).is_err() {
        warn!(charger_id, "charger channel closed; dropping command");
        slot.pending.release_on_timeout(&unique_id);
        return;
    }

    match timeout(Duration::from_secs(CALL_TIMEOUT_SECS), receiver).await {
        Ok(Ok(CallOutcome::Completed)) => {
            info!(charger_id, unique_id = unique_id.as_str(), "command completed");
        }
        Ok(Ok(CallOutcome::RejectedResponse(violation))) => {
            warn!(
                charger_id,
                unique_id = unique_id.as_str(),
                code = violation.code(),
                "response rejected"
            );
        }
        Ok(Ok(CallOutcome::CallError { code, description })) => {
            warn!(
                charger_id,
                unique_id = unique_id.as_str(),
                code = code.as_str(),
                description = description.as_str(),
                "CALL ERROR received"
            );
        }
        Ok(Ok(CallOutcome::MismatchedId)) => {
            warn!(
                charger_id,
                unique_id = unique_id.as_str(),
                "slot released by a response with a foreign uniqueId"
            );
        }
        Ok(Err(_)) => {
            warn!(charger_id, unique_id = unique_id.as_str(), "responder dropped");
        }
        Err(_) => {
            slot.pending.release_on_timeout(&unique_id);
            warn!(charger_id, unique_id = unique_id.as_str(), "Timeout");
        }
    }
}

/// Run the validation taxonomy over the response to an outbound call.
/// GetConfiguration and RemoteStartTransaction additionally update the
/// session; this runs on the session's own dispatcher task.
pub fn validate_response(
    action: &OutboundAction,
    payload: &Value,
    session: &mut ChargerSession,
) -> Checked<()> {
    match action {
        OutboundAction::ChangeAvailability => change_availability::validate_response(payload),
        OutboundAction::ClearCache => clear_cache::validate_response(payload),
        OutboundAction::DataTransfer => data_transfer::validate_response(payload),
        OutboundAction::GetConfiguration => get_configuration::validate_response(payload, session),
        OutboundAction::RemoteStartTransaction { id_tag } => {
            remote_start::validate_response(payload, id_tag, session)
        }
        OutboundAction::RemoteStopTransaction => remote_stop::validate_response(payload),
        OutboundAction::Reset => reset::validate_response(payload),
        OutboundAction::UnlockConnector => unlock_connector::validate_response(payload),
    }
}
