//! Per-charger session record.
//!
//! One `ChargerSession` exists per occupied registry slot. It is mutated
//! only by the dispatcher task of its own connection; the operator path
//! interacts with a session exclusively through the pending-call slot kept
//! next to it in the registry.

use std::collections::BTreeMap;

use super::types::{BootStatus, ConfigKey, ConnectorStatus};
use super::NUM_CONNECTORS;

/// Sentinel idTag for a connector without an active transaction.
pub const NO_CHARGING: &str = "no_charging";

/// Sentinel transaction id for a connector without an active transaction.
pub const NO_TRANSACTION: i64 = -1;

/// Mutable state of one connected charge point.
#[derive(Debug, Clone)]
pub struct ChargerSession {
    /// Stable small integer assigned at accept time; used by the UI.
    pub charger_id: usize,
    /// `Rejected` until a successful BootNotification arrives.
    pub boot_status: BootStatus,
    pub vendor: String,
    pub model: String,
    /// Connector statuses; index 0 is the charge point as a whole.
    pub connectors: [ConnectorStatus; NUM_CONNECTORS + 1],
    /// Per-connector active transaction id, `NO_TRANSACTION` when idle.
    pub active_transactions: [i64; NUM_CONNECTORS + 1],
    /// Per-connector idTag, `NO_CHARGING` when idle.
    pub active_id_tags: [String; NUM_CONNECTORS + 1],
    /// idTag most recently accepted by Authorize; StartTransaction must
    /// present the same tag.
    pub last_authorized_id_tag: String,
    /// Values learned from GetConfiguration responses.
    pub config_keys: BTreeMap<ConfigKey, String>,
    /// Last minted transaction id.
    next_transaction_id: i64,
}

impl ChargerSession {
    pub fn new(charger_id: usize) -> Self {
        Self {
            charger_id,
            boot_status: BootStatus::Rejected,
            vendor: String::new(),
            model: String::new(),
            connectors: [ConnectorStatus::Unknown; NUM_CONNECTORS + 1],
            active_transactions: [NO_TRANSACTION; NUM_CONNECTORS + 1],
            active_id_tags: std::array::from_fn(|_| NO_CHARGING.to_string()),
            last_authorized_id_tag: String::new(),
            config_keys: BTreeMap::new(),
            next_transaction_id: 0,
        }
    }

    /// Mint the next transaction id. StartTransaction allocates one on
    /// every branch, accepted or not.
    pub fn mint_transaction_id(&mut self) -> i64 {
        self.next_transaction_id += 1;
        self.next_transaction_id
    }

    /// The transaction id most recently handed out by StartTransaction.
    /// StatusNotification `Charging` binds it to a connector.
    pub fn current_transaction_id(&self) -> i64 {
        self.next_transaction_id
    }

    /// True when the idTag is already charging on some connector.
    pub fn id_tag_in_use(&self, id_tag: &str) -> bool {
        self.active_id_tags
            .iter()
            .any(|active| active.eq_ignore_ascii_case(id_tag))
    }

    /// Resolve the connector of a StopTransaction: an idTag match wins
    /// first, a transactionId match overrides it.
    pub fn resolve_stop_connector(&self, id_tag: Option<&str>, transaction_id: i64) -> Option<usize> {
        let mut connector = None;
        if let Some(tag) = id_tag {
            for (index, active) in self.active_id_tags.iter().enumerate() {
                if active.eq_ignore_ascii_case(tag) {
                    connector = Some(index);
                }
            }
        }
        for (index, active) in self.active_transactions.iter().enumerate() {
            if *active == transaction_id {
                connector = Some(index);
            }
        }
        connector
    }

    /// Release a connector after a stop or an `Available` status report.
    pub fn clear_connector(&mut self, connector: usize) {
        self.active_id_tags[connector] = NO_CHARGING.to_string();
        self.active_transactions[connector] = NO_TRANSACTION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_defaults() {
        let session = ChargerSession::new(3);
        assert_eq!(session.charger_id, 3);
        assert_eq!(session.boot_status, BootStatus::Rejected);
        for connector in 0..=NUM_CONNECTORS {
            assert_eq!(session.connectors[connector], ConnectorStatus::Unknown);
            assert_eq!(session.active_transactions[connector], NO_TRANSACTION);
            assert_eq!(session.active_id_tags[connector], NO_CHARGING);
        }
        assert!(session.config_keys.is_empty());
    }

    #[test]
    fn transaction_ids_are_monotonic() {
        let mut session = ChargerSession::new(1);
        let first = session.mint_transaction_id();
        let second = session.mint_transaction_id();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(session.current_transaction_id(), 2);
    }

    #[test]
    fn idle_and_active_tags_stay_paired() {
        let mut session = ChargerSession::new(1);
        session.active_id_tags[1] = "12345".to_string();
        session.active_transactions[1] = 7;
        assert!(session.id_tag_in_use("12345"));
        assert!(session.id_tag_in_use("12345".to_lowercase().as_str()));

        session.clear_connector(1);
        assert!(!session.id_tag_in_use("12345"));
        assert_eq!(session.active_transactions[1], NO_TRANSACTION);
    }

    #[test]
    fn stop_connector_resolution_prefers_transaction_id() {
        let mut session = ChargerSession::new(1);
        session.active_id_tags[1] = "12345".to_string();
        session.active_transactions[2] = 9;

        // idTag points at connector 1, transactionId at connector 2.
        assert_eq!(session.resolve_stop_connector(Some("12345"), 9), Some(2));
        assert_eq!(session.resolve_stop_connector(Some("12345"), 42), Some(1));
        assert_eq!(session.resolve_stop_connector(None, 42), None);
    }
}
