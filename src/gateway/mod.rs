//! Operator gateway.
//!
//! The supervisory web client speaks a small text protocol on the same
//! WebSocket port as the chargers:
//!
//! - handshake: the literal `Flask client`, which claims the operator slot
//!   and triggers a primer snapshot pair per charger slot;
//! - commands: `Flask:charger<N>:<action>:<jsonPayload>`, forwarded to the
//!   outbound caller for the target session.
//!
//! Commands run on the operator connection's task, so they are naturally
//! serialised: the next command is read only after the previous call
//! resolved or timed out.

pub mod snapshot;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::commands;
use crate::registry::SharedRegistry;

/// Handshake literal sent by the supervisory UI.
pub const OPERATOR_HELLO: &str = "Flask client";

/// Prefix of every operator command frame.
const COMMAND_PREFIX: &str = "Flask:";

pub struct OperatorGateway {
    registry: SharedRegistry,
}

impl OperatorGateway {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// True when the frame is an operator command rather than OCPP traffic.
    pub fn is_command(text: &str) -> bool {
        text.starts_with(COMMAND_PREFIX)
    }

    /// Claim the operator slot for this connection and prime the UI with a
    /// snapshot pair per charger slot.
    pub async fn attach_operator(&self, handle: u64, sender: mpsc::UnboundedSender<String>) {
        info!(handle, "operator UI connected");
        if let Some(freed) = self.registry.register_operator(handle, sender) {
            info!(slot = freed, "charger slot returned to the pool by the UI handshake");
        }

        for (charger_id, slot) in self.registry.charger_slots() {
            match slot {
                Some(slot) => {
                    let session = slot.session.lock().await;
                    self.registry
                        .send_to_operator(snapshot::state("stopTransaction", &session).to_string());
                    self.registry
                        .send_to_operator(snapshot::boot(&session).to_string());
                }
                None => self.publish_offline(charger_id),
            }
        }
    }

    /// Parse and execute one operator command frame.
    pub async fn handle_command(&self, text: &str) {
        let Some((charger_id, action, payload)) = parse_command(text) else {
            warn!(frame = text, "malformed operator command");
            return;
        };

        let Some(slot) = self.registry.charger(charger_id) else {
            warn!(charger_id, "command for a charger that is not connected");
            return;
        };

        // An omitted payload segment means "no fields".
        let payload = if payload.trim().is_empty() { "{}" } else { payload };
        commands::dispatch(&slot, action, payload).await;
    }

    /// Tell the UI a charger slot went away.
    pub fn publish_offline(&self, charger_id: usize) {
        let (stop, boot) = snapshot::offline_pair(charger_id);
        self.registry.send_to_operator(stop.to_string());
        self.registry.send_to_operator(boot.to_string());
    }
}

/// Split `Flask:charger<N>:<action>:<payload>`. The payload may itself
/// contain colons, so only the first three separators count.
fn parse_command(text: &str) -> Option<(usize, &str, &str)> {
    let rest = text.strip_prefix(COMMAND_PREFIX)?;
    let mut parts = rest.splitn(3, ':');
    let charger = parts.next()?;
    let action = parts.next()?;
    let payload = parts.next().unwrap_or("");

    let charger_id = charger.strip_prefix("charger")?.parse().ok()?;
    Some((charger_id, action, payload))
}
