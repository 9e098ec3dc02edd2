//! The per-session pending-call slot.
//!
//! At most one operator-initiated CALL may be outstanding per charger. The
//! operator path takes the slot, sends the frame and waits on a oneshot;
//! the charger's own dispatcher task delivers the matching CALLRESULT or
//! CALLERROR and completes it. The slot also owns the monotonic counter
//! that stamps outbound uniqueIds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;

use super::OutboundAction;
use crate::protocol::Violation;

/// How an outbound call concluded, as seen by the waiting operator path.
#[derive(Debug)]
pub enum CallOutcome {
    /// The response arrived and passed validation.
    Completed,
    /// The response arrived but violated the taxonomy; a CALLERROR was sent
    /// back to the charger and the slot released.
    RejectedResponse(Violation),
    /// The charger answered with a CALLERROR.
    CallError { code: String, description: String },
    /// A response with a foreign uniqueId released the slot.
    MismatchedId,
}

/// A call waiting for its response.
pub struct AwaitingCall {
    pub unique_id: String,
    pub action: OutboundAction,
    pub responder: oneshot::Sender<CallOutcome>,
}

enum PendingState {
    Idle,
    Awaiting(AwaitingCall),
}

/// What the dispatcher found when a CALLRESULT/CALLERROR arrived.
pub enum ResponseSlot {
    /// Nothing outstanding; the frame is discarded.
    NoPending,
    /// A call was outstanding under a different uniqueId. The slot has been
    /// released; the frame is discarded.
    Mismatched(AwaitingCall),
    /// The outstanding call. The slot has been released.
    Matched(AwaitingCall),
}

/// The slot is already holding an outstanding call.
#[derive(Debug, PartialEq, Eq)]
pub struct SlotBusy;

pub struct PendingCall {
    unique_ids: AtomicU64,
    state: Mutex<PendingState>,
}

impl PendingCall {
    pub fn new() -> Self {
        Self {
            unique_ids: AtomicU64::new(0),
            state: Mutex::new(PendingState::Idle),
        }
    }

    /// Take the slot for a new outbound call. Stamps a fresh uniqueId and
    /// returns the receiver the caller must wait on.
    pub fn begin(
        &self,
        action: OutboundAction,
    ) -> Result<(String, oneshot::Receiver<CallOutcome>), SlotBusy> {
        let mut state = self.state.lock().unwrap();
        if matches!(*state, PendingState::Awaiting(_)) {
            return Err(SlotBusy);
        }

        let unique_id = (self.unique_ids.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        let (responder, receiver) = oneshot::channel();
        *state = PendingState::Awaiting(AwaitingCall {
            unique_id: unique_id.clone(),
            action,
            responder,
        });
        Ok((unique_id, receiver))
    }

    /// Force the slot back to Idle after the wait deadline expired. Returns
    /// false when the slot already moved on (the response won the race).
    pub fn release_on_timeout(&self, unique_id: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        match &*state {
            PendingState::Awaiting(call) if call.unique_id == unique_id => {
                *state = PendingState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Claim the slot for an arriving response. Any outstanding call is
    /// released whether or not the uniqueId matches.
    pub fn take_for_response(&self, unique_id: &str) -> ResponseSlot {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, PendingState::Idle) {
            PendingState::Idle => ResponseSlot::NoPending,
            PendingState::Awaiting(call) => {
                if call.unique_id == unique_id {
                    ResponseSlot::Matched(call)
                } else {
                    ResponseSlot::Mismatched(call)
                }
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(*self.state.lock().unwrap(), PendingState::Idle)
    }
}

impl Default for PendingCall {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_ids_increase_monotonically() {
        let slot = PendingCall::new();
        let (first, _rx1) = slot.begin(OutboundAction::ClearCache).unwrap();
        assert_eq!(first, "1");
        assert!(matches!(slot.take_for_response("1"), ResponseSlot::Matched(_)));
        let (second, _rx2) = slot.begin(OutboundAction::ClearCache).unwrap();
        assert_eq!(second, "2");
    }

    #[test]
    fn second_call_is_refused_while_awaiting() {
        let slot = PendingCall::new();
        let (_uid, _rx) = slot.begin(OutboundAction::ClearCache).unwrap();
        assert_eq!(slot.begin(OutboundAction::ClearCache).unwrap_err(), SlotBusy);
    }

    #[test]
    fn mismatched_response_releases_the_slot() {
        let slot = PendingCall::new();
        let (_uid, _rx) = slot.begin(OutboundAction::ClearCache).unwrap();
        assert!(matches!(
            slot.take_for_response("999"),
            ResponseSlot::Mismatched(_)
        ));
        assert!(slot.is_idle());
        // The stray frame itself claims nothing afterwards.
        assert!(matches!(slot.take_for_response("999"), ResponseSlot::NoPending));
    }

    #[test]
    fn timeout_release_only_applies_to_its_own_call() {
        let slot = PendingCall::new();
        let (uid, _rx) = slot.begin(OutboundAction::ClearCache).unwrap();
        assert!(!slot.release_on_timeout("0"));
        assert!(!slot.is_idle());
        assert!(slot.release_on_timeout(&uid));
        assert!(slot.is_idle());
        assert!(!slot.release_on_timeout(&uid));
    }
}
