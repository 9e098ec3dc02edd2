pub mod connector_state;
pub mod meter_value;
pub mod transaction_event;
