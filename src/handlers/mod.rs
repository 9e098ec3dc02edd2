//! Inbound message dispatcher.
//!
//! One `ChargerHandler` per charger connection. Each incoming text frame is
//! parsed into an OCPP-J envelope and routed:
//!
//! - **CALL** — gated on boot status, then handed to the matching action
//!   handler. Exactly one CALLRESULT or CALLERROR comes back.
//! - **CALLRESULT** — correlated against the pending-call slot; the
//!   response payload runs through the same validation taxonomy.
//! - **CALLERROR** — releases the pending-call slot; logged only.
//!
//! Handlers mutate the session, append telemetry, and the dispatcher pushes
//! a state snapshot to the operator UI after every handled action.

pub mod authorize;
pub mod boot_notification;
pub mod data_transfer;
pub mod heartbeat;
pub mod meter_values;
pub mod start_transaction;
pub mod status_notification;
pub mod stop_transaction;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::commands::pending::{CallOutcome, PendingCall, ResponseSlot};
use crate::commands::validate_response;
use crate::domain::types::BootStatus;
use crate::domain::ChargerSession;
use crate::gateway::snapshot;
use crate::protocol::{generic_error, not_implemented, not_supported, Violation};
use crate::registry::{SharedRegistry, SlotRef};
use crate::storage::TelemetrySink;
use crate::support::ocpp_frame::{FrameFault, OcppFrame};

/// Dispatcher for one charger connection.
pub struct ChargerHandler {
    pub charger_id: usize,
    pub session: Arc<tokio::sync::Mutex<ChargerSession>>,
    pub pending: Arc<PendingCall>,
    pub registry: SharedRegistry,
    pub telemetry: Arc<dyn TelemetrySink>,
}

impl ChargerHandler {
    pub fn new(slot: &SlotRef, registry: SharedRegistry, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            charger_id: slot.charger_id,
            session: slot.session.clone(),
            pending: slot.pending.clone(),
            registry,
            telemetry,
        }
    }

    /// Handle one incoming frame. Returns the reply to send back to the
    /// charger, if any.
    pub async fn handle(&self, text: &str) -> Option<String> {
        let frame = match OcppFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(charger_id = self.charger_id, error = %e, "unparsable frame");
                return match e.fault {
                    FrameFault::UnknownMessageType(_) => Some(
                        not_implemented(e.unique_id.as_deref().unwrap_or("")).serialize(),
                    ),
                    _ => e
                        .unique_id
                        .map(|uid| Violation::Formation.to_frame(&uid).serialize()),
                };
            }
        };

        match frame {
            OcppFrame::Call {
                unique_id,
                action,
                payload,
            } => Some(self.handle_call(&unique_id, &action, &payload).await),
            OcppFrame::CallResult { unique_id, payload } => {
                self.on_call_result(&unique_id, &payload).await
            }
            OcppFrame::CallError {
                unique_id,
                error_code,
                error_description,
                ..
            } => {
                self.on_call_error(&unique_id, &error_code, &error_description);
                None
            }
        }
    }

    /// Route a CALL to its action handler.
    async fn handle_call(&self, unique_id: &str, action: &str, payload: &Value) -> String {
        // Nothing but a BootNotification is accepted from an unbooted charger.
        let booted = self.session.lock().await.boot_status != BootStatus::Rejected;
        if !booted && action != "BootNotification" {
            warn!(
                charger_id = self.charger_id,
                action, "call before successful boot"
            );
            return generic_error(unique_id).serialize();
        }

        let reply = match action {
            "Authorize" => authorize::handle(self, unique_id, payload).await,
            "BootNotification" => boot_notification::handle(self, unique_id, payload).await,
            "DataTransfer" => data_transfer::handle(self, unique_id, payload).await,
            "Heartbeat" => heartbeat::handle(self, unique_id, payload).await,
            "MeterValues" => meter_values::handle(self, unique_id, payload).await,
            "StartTransaction" => start_transaction::handle(self, unique_id, payload).await,
            "StatusNotification" => status_notification::handle(self, unique_id, payload).await,
            "StopTransaction" => stop_transaction::handle(self, unique_id, payload).await,
            other => {
                warn!(charger_id = self.charger_id, action = other, "unsupported action");
                return not_supported(unique_id).serialize();
            }
        };

        self.publish_snapshot(action).await;
        reply.serialize()
    }

    /// Correlate a CALLRESULT with the outstanding outbound call and run
    /// the taxonomy over the response payload.
    async fn on_call_result(&self, unique_id: &str, payload: &Value) -> Option<String> {
        match self.pending.take_for_response(unique_id) {
            ResponseSlot::NoPending => {
                warn!(
                    charger_id = self.charger_id,
                    unique_id, "no call outstanding; response discarded"
                );
                None
            }
            ResponseSlot::Mismatched(call) => {
                warn!(
                    charger_id = self.charger_id,
                    expected = call.unique_id.as_str(),
                    got = unique_id,
                    "The uniqueId of this response is not in accordance with the uniqueId of the request"
                );
                let _ = call.responder.send(CallOutcome::MismatchedId);
                None
            }
            ResponseSlot::Matched(call) => {
                let mut session = self.session.lock().await;
                match validate_response(&call.action, payload, &mut session) {
                    Ok(()) => {
                        debug!(
                            charger_id = self.charger_id,
                            action = call.action.name(),
                            "No errors"
                        );
                        let _ = call.responder.send(CallOutcome::Completed);
                        None
                    }
                    Err(violation) => {
                        // The peer is told its response was malformed; the
                        // slot stays released either way.
                        let _ = call.responder.send(CallOutcome::RejectedResponse(violation));
                        Some(violation.to_frame(unique_id).serialize())
                    }
                }
            }
        }
    }

    /// A CALLERROR releases the pending slot; no protocol action follows.
    fn on_call_error(&self, unique_id: &str, code: &str, description: &str) {
        warn!(charger_id = self.charger_id, code, description, "CALL ERROR RECEIVED");
        match self.pending.take_for_response(unique_id) {
            ResponseSlot::NoPending => {}
            ResponseSlot::Mismatched(call) => {
                let _ = call.responder.send(CallOutcome::MismatchedId);
            }
            ResponseSlot::Matched(call) => {
                let _ = call.responder.send(CallOutcome::CallError {
                    code: code.to_string(),
                    description: description.to_string(),
                });
            }
        }
    }

    /// Push the post-mutation state snapshot for a handled action.
    async fn publish_snapshot(&self, action: &str) {
        let kind = match action {
            "Authorize" => "authorize",
            "BootNotification" => "bootNotification",
            "DataTransfer" => "dataTransfer",
            "Heartbeat" => "heartbeat",
            "MeterValues" => "meterValues",
            "StartTransaction" => "startTransaction",
            "StatusNotification" => "statusNotification",
            "StopTransaction" => "stopTransaction",
            _ => return,
        };

        let session = self.session.lock().await;
        let frame = if action == "BootNotification" {
            snapshot::boot(&session)
        } else {
            snapshot::state(kind, &session)
        };
        drop(session);
        self.registry.send_to_operator(frame.to_string());
    }
}

/// Convenience used by the action handlers.
pub(crate) fn call_result(unique_id: &str, payload: Value) -> OcppFrame {
    info!(reply = %payload, "SENDING CONFIRMATION");
    OcppFrame::CallResult {
        unique_id: unique_id.to_string(),
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OutboundAction;
    use crate::domain::{HEARTBEAT_INTERVAL, NO_CHARGING, NO_TRANSACTION};
    use crate::registry::Registry;
    use crate::storage::testing::RecordingSink;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Rig {
        handler: ChargerHandler,
        operator_rx: mpsc::UnboundedReceiver<String>,
        sink: Arc<RecordingSink>,
        slot: SlotRef,
    }

    fn rig() -> Rig {
        let registry = Registry::shared();
        let (charger_tx, charger_rx) = mpsc::unbounded_channel();
        std::mem::forget(charger_rx);
        let slot = registry.assign_charger(1, charger_tx).unwrap();
        let (operator_tx, operator_rx) = mpsc::unbounded_channel();
        registry.register_operator(2, operator_tx);
        let sink = Arc::new(RecordingSink::default());
        let handler = ChargerHandler::new(&slot, registry, sink.clone());
        Rig {
            handler,
            operator_rx,
            sink,
            slot,
        }
    }

    async fn send(rig: &Rig, frame: &str) -> Option<Value> {
        rig.handler
            .handle(frame)
            .await
            .map(|text| serde_json::from_str(&text).unwrap())
    }

    async fn boot(rig: &Rig) {
        let reply = send(
            rig,
            r#"[2,"boot","BootNotification",{"chargePointVendor":"MicroOcpp","chargePointModel":"MicroOcpp Simulator"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2]["status"], "Accepted");
    }

    async fn authorize(rig: &Rig, id_tag: &str) {
        let frame = format!(r#"[2,"auth","Authorize",{{"idTag":"{id_tag}"}}]"#);
        let reply = send(rig, &frame).await.unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Accepted");
    }

    fn drain_snapshots(rig: &mut Rig) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(text) = rig.operator_rx.try_recv() {
            frames.push(serde_json::from_str(&text).unwrap());
        }
        frames
    }

    // ── Boot gate ──────────────────────────────────────────

    #[tokio::test]
    async fn calls_before_boot_get_a_generic_error() {
        let rig = rig();
        let reply = rig
            .handler
            .handle(r#"[2,"1","Heartbeat",{}]"#)
            .await
            .unwrap();
        assert_eq!(reply, r#"[4,"1","GenericError","Generic Error",{}]"#);
    }

    #[tokio::test]
    async fn boot_notification_passes_the_gate() {
        let rig = rig();
        let reply = send(
            &rig,
            r#"[2,"2","BootNotification",{"chargePointVendor":"MicroOcpp","chargePointModel":"MicroOcpp Simulator"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[0], 3);
        assert_eq!(reply[1], "2");
        assert_eq!(reply[2]["status"], "Accepted");
        assert_eq!(reply[2]["interval"], HEARTBEAT_INTERVAL);
        let time = reply[2]["currentTime"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());

        let session = rig.handler.session.lock().await;
        assert_eq!(session.boot_status, BootStatus::Accepted);
        assert_eq!(session.vendor, "MicroOcpp");
        assert_eq!(session.model, "MicroOcpp Simulator");
    }

    #[tokio::test]
    async fn heartbeat_works_after_boot() {
        let rig = rig();
        boot(&rig).await;
        let reply = send(&rig, r#"[2,"5","Heartbeat",{}]"#).await.unwrap();
        assert_eq!(reply[0], 3);
        assert!(reply[2]["currentTime"].is_string());
    }

    // ── Validation taxonomy over the wire ──────────────────

    #[tokio::test]
    async fn type_fault_in_boot_is_reported_before_anything_else() {
        let rig = rig();
        let reply = send(
            &rig,
            r#"[2,"9","BootNotification",{"chargePointVendor":"err","chargePointModel":"MicroOcpp Simulator"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[0], 4);
        assert_eq!(reply[1], "9");
        assert_eq!(reply[2], "TypeConstraintViolation");
    }

    #[tokio::test]
    async fn unknown_action_is_not_supported() {
        let rig = rig();
        boot(&rig).await;
        let reply = send(&rig, r#"[2,"7","Reset",{"type":"Hard"}]"#).await.unwrap();
        assert_eq!(reply[2], "NotSupported");
        let reply = send(&rig, r#"[2,"8","MadeUpAction",{}]"#).await.unwrap();
        assert_eq!(reply[2], "NotSupported");
    }

    #[tokio::test]
    async fn unknown_message_type_is_not_implemented() {
        let rig = rig();
        let reply = send(&rig, r#"[9,"5",{}]"#).await.unwrap();
        assert_eq!(reply[0], 4);
        assert_eq!(reply[1], "5");
        assert_eq!(reply[2], "NotImplemented");
    }

    #[tokio::test]
    async fn malformed_envelope_with_uid_gets_a_formation_violation() {
        let rig = rig();
        let reply = send(&rig, r#"[2,"3","Heartbeat"]"#).await.unwrap();
        assert_eq!(reply[2], "FormationViolation");
        // Without a recoverable uid there is nothing to answer.
        assert!(rig.handler.handle("not json at all").await.is_none());
    }

    // ── Authorize / StartTransaction / StopTransaction ─────

    #[tokio::test]
    async fn authorize_then_start_transaction() {
        let rig = rig();
        boot(&rig).await;
        authorize(&rig, "12345").await;

        let reply = send(
            &rig,
            r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Accepted");
        assert_eq!(reply[2]["transactionId"], 1);

        let session = rig.handler.session.lock().await;
        assert_eq!(session.active_id_tags[1], "12345");
        // The transaction binds on the Charging status report, not yet.
        assert_eq!(session.active_transactions[1], NO_TRANSACTION);
    }

    #[tokio::test]
    async fn start_without_prior_authorize_is_invalid() {
        let rig = rig();
        boot(&rig).await;
        let reply = send(
            &rig,
            r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Invalid");
        // The transaction id is allocated all the same.
        assert_eq!(reply[2]["transactionId"], 1);
    }

    #[tokio::test]
    async fn repeated_start_is_a_concurrent_tx() {
        let rig = rig();
        boot(&rig).await;
        authorize(&rig, "12345").await;

        let start = r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#;
        let reply = send(&rig, start).await.unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Accepted");

        send(
            &rig,
            r#"[2,"5","StatusNotification",{"connectorId":1,"status":"Charging","errorCode":"NoError"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(rig.handler.session.lock().await.active_transactions[1], 1);

        let reply = send(&rig, start).await.unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "ConcurrentTx");
        assert_eq!(reply[2]["transactionId"], 2);
    }

    #[tokio::test]
    async fn start_on_an_unavailable_connector_is_invalid() {
        let rig = rig();
        boot(&rig).await;
        authorize(&rig, "12345").await;
        send(
            &rig,
            r#"[2,"5","StatusNotification",{"connectorId":1,"status":"Faulted","errorCode":"GroundFailure"}]"#,
        )
        .await
        .unwrap();

        let reply = send(
            &rig,
            r#"[2,"6","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Invalid");
    }

    #[tokio::test]
    async fn full_transaction_lifecycle_with_telemetry() {
        let mut rig = rig();
        boot(&rig).await;
        authorize(&rig, "12345").await;
        send(
            &rig,
            r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();
        send(
            &rig,
            r#"[2,"5","StatusNotification",{"connectorId":1,"status":"Charging","errorCode":"NoError"}]"#,
        )
        .await
        .unwrap();

        // Charging bound the transaction and appended a Start row.
        {
            let events = rig.sink.transaction_events.lock().unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event, "Start");
            assert_eq!(events[0].connector, 1);
        }

        let reply = send(
            &rig,
            r#"[2,"6","StopTransaction",{"meterStop":1200,"timestamp":"2024-01-01T01:00:00Z","transactionId":1,"idTag":"12345","reason":"Local"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Accepted");

        let session = rig.handler.session.lock().await;
        assert_eq!(session.active_id_tags[1], NO_CHARGING);
        assert_eq!(session.active_transactions[1], NO_TRANSACTION);
        drop(session);

        let events = rig.sink.transaction_events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event, "Stop");
        assert_eq!(events[1].reason, "Local");
        drop(events);

        // The UI heard about every step.
        let kinds: Vec<String> = drain_snapshots(&mut rig)
            .iter()
            .map(|s| s["type"].as_str().unwrap().to_string())
            .collect();
        assert!(kinds.contains(&"bootNotification".to_string()));
        assert!(kinds.contains(&"startTransaction".to_string()));
        assert!(kinds.contains(&"statusNotification".to_string()));
        assert!(kinds.contains(&"stopTransaction".to_string()));
    }

    #[tokio::test]
    async fn stop_without_id_tag_is_accepted_with_an_empty_reply() {
        let rig = rig();
        boot(&rig).await;
        authorize(&rig, "12345").await;
        send(
            &rig,
            r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();
        send(
            &rig,
            r#"[2,"5","StatusNotification",{"connectorId":1,"status":"Charging","errorCode":"NoError"}]"#,
        )
        .await
        .unwrap();

        let reply = send(
            &rig,
            r#"[2,"6","StopTransaction",{"meterStop":900,"timestamp":"2024-01-01T01:00:00Z","transactionId":1}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[0], 3);
        assert_eq!(reply[2], json!({}));
        assert_eq!(
            rig.handler.session.lock().await.active_transactions[1],
            NO_TRANSACTION
        );
    }

    #[tokio::test]
    async fn stop_with_a_foreign_id_tag_is_invalid() {
        let rig = rig();
        boot(&rig).await;
        authorize(&rig, "12345").await;
        send(
            &rig,
            r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();

        let reply = send(
            &rig,
            r#"[2,"6","StopTransaction",{"meterStop":900,"timestamp":"2024-01-01T01:00:00Z","transactionId":7,"idTag":"100"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Invalid");
    }

    // ── StatusNotification side effects ────────────────────

    #[tokio::test]
    async fn available_clears_the_connector() {
        let rig = rig();
        boot(&rig).await;
        authorize(&rig, "12345").await;
        send(
            &rig,
            r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();
        send(
            &rig,
            r#"[2,"5","StatusNotification",{"connectorId":1,"status":"Available","errorCode":"NoError"}]"#,
        )
        .await
        .unwrap();

        let session = rig.handler.session.lock().await;
        assert_eq!(session.connectors[1], crate::domain::ConnectorStatus::Available);
        assert_eq!(session.active_id_tags[1], NO_CHARGING);

        let states = rig.sink.connector_states.lock().unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].status, "Available");
        assert_eq!(states[0].error_code, "NoError");
    }

    // ── MeterValues persistence ────────────────────────────

    #[tokio::test]
    async fn meter_values_are_persisted_with_tokens() {
        let rig = rig();
        boot(&rig).await;
        let reply = send(
            &rig,
            r#"[2,"m1","MeterValues",{"connectorId":1,"transactionId":3,"meterValue":[{"timestamp":"2024-01-01T10:00:00Z","sampledValue":[{"value":"1500","unit":"Wh","measurand":"Energy.Active.Import.Register","context":"Sample.Periodic"},{"value":"230","unit":"V"}]}]}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[0], 3);
        assert_eq!(reply[2], json!({}));

        let samples = rig.sink.meter_samples.lock().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, "1500");
        assert_eq!(samples[0].unit, "Wh");
        assert_eq!(samples[0].transaction_id, 3);
        assert_eq!(samples[1].unit, "V");
        assert_eq!(samples[1].measurand, "");
    }

    #[tokio::test]
    async fn a_faulted_meter_values_request_persists_nothing() {
        let rig = rig();
        boot(&rig).await;
        let reply = send(
            &rig,
            r#"[2,"m2","MeterValues",{"connectorId":1,"meterValue":[{"timestamp":"2024-01-01T10:00:00Z","sampledValue":[{"value":"1500"},{"value":"err"}]}]}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2], "TypeConstraintViolation");
        assert!(rig.sink.meter_samples.lock().unwrap().is_empty());
    }

    // ── CALLRESULT / CALLERROR correlation ─────────────────

    #[tokio::test]
    async fn matching_call_result_completes_the_pending_call() {
        let rig = rig();
        let (uid, mut rx) = rig.slot.pending.begin(OutboundAction::ClearCache).unwrap();
        let reply = send(&rig, &format!(r#"[3,"{uid}",{{"status":"Accepted"}}]"#)).await;
        assert!(reply.is_none());
        assert!(rig.slot.pending.is_idle());
        assert!(matches!(rx.try_recv().unwrap(), CallOutcome::Completed));
    }

    #[tokio::test]
    async fn malformed_call_result_is_answered_with_a_call_error() {
        let rig = rig();
        let (uid, mut rx) = rig.slot.pending.begin(OutboundAction::ClearCache).unwrap();
        let reply = send(&rig, &format!(r#"[3,"{uid}",{{}}]"#)).await.unwrap();
        assert_eq!(reply[0], 4);
        assert_eq!(reply[1], uid.as_str());
        assert_eq!(reply[2], "ProtocolError");
        // The slot is released regardless.
        assert!(rig.slot.pending.is_idle());
        assert!(matches!(
            rx.try_recv().unwrap(),
            CallOutcome::RejectedResponse(Violation::Protocol)
        ));
    }

    #[tokio::test]
    async fn mismatched_call_result_releases_and_discards() {
        let rig = rig();
        let (uid, mut rx) = rig.slot.pending.begin(OutboundAction::ClearCache).unwrap();
        assert_ne!(uid, "999");
        let reply = send(&rig, r#"[3,"999",{"status":"Accepted"}]"#).await;
        assert!(reply.is_none());
        assert!(rig.slot.pending.is_idle());
        assert!(matches!(rx.try_recv().unwrap(), CallOutcome::MismatchedId));

        // The late, correctly numbered response now finds nothing.
        let reply = send(&rig, &format!(r#"[3,"{uid}",{{"status":"Accepted"}}]"#)).await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn call_error_releases_the_slot() {
        let rig = rig();
        let (uid, mut rx) = rig.slot.pending.begin(OutboundAction::ClearCache).unwrap();
        let reply = send(
            &rig,
            &format!(r#"[4,"{uid}","InternalError","station fault",{{}}]"#),
        )
        .await;
        assert!(reply.is_none());
        assert!(rig.slot.pending.is_idle());
        match rx.try_recv().unwrap() {
            CallOutcome::CallError { code, .. } => assert_eq!(code, "InternalError"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_configuration_result_updates_the_session() {
        let rig = rig();
        let (uid, _rx) = rig
            .slot
            .pending
            .begin(OutboundAction::GetConfiguration)
            .unwrap();
        let frame = format!(
            r#"[3,"{uid}",{{"configurationKey":[{{"key":"HeartbeatInterval","readonly":false,"value":"300"}}],"unknownKey":[]}}]"#
        );
        assert!(send(&rig, &frame).await.is_none());
        let session = rig.handler.session.lock().await;
        assert_eq!(
            session
                .config_keys
                .get(&crate::domain::ConfigKey::HeartbeatInterval),
            Some(&"300".to_string())
        );
    }

    #[tokio::test]
    async fn accepted_remote_start_authorizes_the_tag_for_the_follow_up() {
        let rig = rig();
        boot(&rig).await;
        let (uid, _rx) = rig
            .slot
            .pending
            .begin(OutboundAction::RemoteStartTransaction {
                id_tag: "12345".to_string(),
            })
            .unwrap();
        assert!(send(&rig, &format!(r#"[3,"{uid}",{{"status":"Accepted"}}]"#))
            .await
            .is_none());

        let reply = send(
            &rig,
            r#"[2,"4","StartTransaction",{"connectorId":1,"idTag":"12345","meterStart":0,"timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(reply[2]["idTagInfo"]["status"], "Accepted");
    }
}
