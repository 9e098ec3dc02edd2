//! Charger slot table.
//!
//! A fixed array of `MAX_CHARGERS + 1` slots maps transport handles to
//! sessions. Slot 0 is reserved for the operator UI; slots 1..N hold
//! chargers, and the slot index is the charger id shown to the UI. Every
//! slot is explicitly `Free` or `Occupied` — no sentinel handles.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::pending::PendingCall;
use crate::domain::{ChargerSession, MAX_CHARGERS};

/// Slot index reserved for the operator UI connection.
pub const OPERATOR_SLOT: usize = 0;

struct SlotEntry {
    handle: u64,
    sender: mpsc::UnboundedSender<String>,
    session: Arc<tokio::sync::Mutex<ChargerSession>>,
    pending: Arc<PendingCall>,
}

enum Slot {
    Free,
    Occupied(SlotEntry),
}

impl Slot {
    fn entry(&self) -> Option<&SlotEntry> {
        match self {
            Slot::Free => None,
            Slot::Occupied(entry) => Some(entry),
        }
    }
}

/// Shared view of an occupied slot handed to dispatchers and the gateway.
#[derive(Clone)]
pub struct SlotRef {
    pub charger_id: usize,
    pub sender: mpsc::UnboundedSender<String>,
    pub session: Arc<tokio::sync::Mutex<ChargerSession>>,
    pub pending: Arc<PendingCall>,
}

impl SlotRef {
    fn of(charger_id: usize, entry: &SlotEntry) -> Self {
        Self {
            charger_id,
            sender: entry.sender.clone(),
            session: entry.session.clone(),
            pending: entry.pending.clone(),
        }
    }
}

/// Thread-safe slot table. Assignment of a free slot is mutually exclusive.
pub struct Registry {
    slots: Mutex<Vec<Slot>>,
}

/// Shared, reference-counted registry
pub type SharedRegistry = Arc<Registry>;

impl Registry {
    pub fn new() -> Self {
        let slots = (0..=MAX_CHARGERS).map(|_| Slot::Free).collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared() -> SharedRegistry {
        Arc::new(Self::new())
    }

    /// Give a newly accepted connection the first free charger slot.
    /// Returns `None` when every slot is taken; the connection stays open
    /// but unregistered.
    pub fn assign_charger(
        &self,
        handle: u64,
        sender: mpsc::UnboundedSender<String>,
    ) -> Option<SlotRef> {
        let mut slots = self.slots.lock().unwrap();
        for charger_id in 1..=MAX_CHARGERS {
            if matches!(slots[charger_id], Slot::Free) {
                let entry = SlotEntry {
                    handle,
                    sender,
                    session: Arc::new(tokio::sync::Mutex::new(ChargerSession::new(charger_id))),
                    pending: Arc::new(PendingCall::new()),
                };
                let slot_ref = SlotRef::of(charger_id, &entry);
                slots[charger_id] = Slot::Occupied(entry);
                info!(charger_id, handle, "charger slot assigned");
                return Some(slot_ref);
            }
        }
        warn!(handle, "no free charger slots");
        None
    }

    /// Re-home a connection to the operator slot after the UI handshake.
    /// Frees the charger slot the connection was given at accept time, so a
    /// charger can take it later. Returns the freed charger id, if any.
    pub fn register_operator(
        &self,
        handle: u64,
        sender: mpsc::UnboundedSender<String>,
    ) -> Option<usize> {
        let mut slots = self.slots.lock().unwrap();

        let mut freed = None;
        for charger_id in 1..=MAX_CHARGERS {
            if slots[charger_id].entry().is_some_and(|e| e.handle == handle) {
                slots[charger_id] = Slot::Free;
                freed = Some(charger_id);
            }
        }

        if slots[OPERATOR_SLOT].entry().is_some() {
            warn!(handle, "replacing existing operator UI connection");
        }
        slots[OPERATOR_SLOT] = Slot::Occupied(SlotEntry {
            handle,
            sender,
            session: Arc::new(tokio::sync::Mutex::new(ChargerSession::new(OPERATOR_SLOT))),
            pending: Arc::new(PendingCall::new()),
        });
        info!(handle, "operator UI registered");
        freed
    }

    /// Release whichever slot a closing connection holds. Returns the slot
    /// index that was freed.
    pub fn release_handle(&self, handle: u64) -> Option<usize> {
        let mut slots = self.slots.lock().unwrap();
        for (index, slot) in slots.iter_mut().enumerate() {
            if slot.entry().is_some_and(|e| e.handle == handle) {
                *slot = Slot::Free;
                info!(slot = index, handle, "slot released");
                return Some(index);
            }
        }
        None
    }

    /// Look up a charger slot by id (1..=MAX_CHARGERS).
    pub fn charger(&self, charger_id: usize) -> Option<SlotRef> {
        if charger_id == OPERATOR_SLOT || charger_id > MAX_CHARGERS {
            return None;
        }
        let slots = self.slots.lock().unwrap();
        slots[charger_id]
            .entry()
            .map(|entry| SlotRef::of(charger_id, entry))
    }

    /// Occupancy of every charger slot, for the operator primer.
    pub fn charger_slots(&self) -> Vec<(usize, Option<SlotRef>)> {
        let slots = self.slots.lock().unwrap();
        (1..=MAX_CHARGERS)
            .map(|charger_id| {
                (
                    charger_id,
                    slots[charger_id]
                        .entry()
                        .map(|entry| SlotRef::of(charger_id, entry)),
                )
            })
            .collect()
    }

    /// Push a frame to the operator UI, if one is connected.
    pub fn send_to_operator(&self, text: String) {
        let sender = {
            let slots = self.slots.lock().unwrap();
            slots[OPERATOR_SLOT].entry().map(|e| e.sender.clone())
        };
        match sender {
            Some(sender) => {
                if sender.send(text).is_err() {
                    debug!("operator UI channel closed");
                }
            }
            None => debug!("no operator UI connected"),
        }
    }

    pub fn operator_connected(&self) -> bool {
        self.slots.lock().unwrap()[OPERATOR_SLOT].entry().is_some()
    }

    /// Number of occupied charger slots.
    pub fn charger_count(&self) -> usize {
        let slots = self.slots.lock().unwrap();
        (1..=MAX_CHARGERS)
            .filter(|i| slots[*i].entry().is_some())
            .count()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> mpsc::UnboundedSender<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::mem::forget(rx);
        tx
    }

    #[test]
    fn slots_are_assigned_in_order() {
        let registry = Registry::new();
        let first = registry.assign_charger(10, channel()).unwrap();
        let second = registry.assign_charger(11, channel()).unwrap();
        assert_eq!(first.charger_id, 1);
        assert_eq!(second.charger_id, 2);
        assert_eq!(registry.charger_count(), 2);
    }

    #[test]
    fn a_full_table_refuses_assignment() {
        let registry = Registry::new();
        for handle in 0..MAX_CHARGERS as u64 {
            assert!(registry.assign_charger(handle, channel()).is_some());
        }
        assert!(registry.assign_charger(99, channel()).is_none());

        // Releasing one slot makes it available again.
        registry.release_handle(2).unwrap();
        let reassigned = registry.assign_charger(99, channel()).unwrap();
        assert_eq!(reassigned.charger_id, 3);
    }

    #[test]
    fn operator_handshake_frees_the_eager_charger_slot() {
        let registry = Registry::new();
        registry.assign_charger(7, channel()).unwrap();
        assert_eq!(registry.charger_count(), 1);
        assert!(!registry.operator_connected());

        let freed = registry.register_operator(7, channel());
        assert_eq!(freed, Some(1));
        assert_eq!(registry.charger_count(), 0);
        assert!(registry.operator_connected());
    }

    #[test]
    fn release_by_handle_finds_the_right_slot() {
        let registry = Registry::new();
        registry.assign_charger(1, channel()).unwrap();
        registry.assign_charger(2, channel()).unwrap();
        assert_eq!(registry.release_handle(1), Some(1));
        assert_eq!(registry.release_handle(1), None);
        assert!(registry.charger(1).is_none());
        assert!(registry.charger(2).is_some());
    }

    #[test]
    fn charger_lookup_rejects_operator_and_out_of_range() {
        let registry = Registry::new();
        assert!(registry.charger(0).is_none());
        assert!(registry.charger(MAX_CHARGERS + 1).is_none());
    }
}
