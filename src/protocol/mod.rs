//! The OCPP validation kit.
//!
//! Every inbound payload (and every response to an outbound call) is checked
//! against the same layered taxonomy. The first violation found wins, in
//! this order:
//!
//! 1. `FormationViolation` — payload is not a JSON object.
//! 2. `ProtocolError` — required field missing or empty.
//! 3. `TypeConstraintViolation` — field present but of the wrong type.
//! 4. `PropertyConstraintViolation` — well-typed value outside its domain.
//! 5. `OccurrenceConstraintViolation` — string longer than its bound.

pub mod fields;

pub use fields::{
    bounded, optional_enum, optional_int, optional_str, payload_object, require_array,
    require_enum, require_int, require_str, require_timestamp, TYPE_FAULT_MARKER,
};

use crate::support::ocpp_frame::OcppFrame;

/// One of the five layered validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Violation {
    Formation,
    Protocol,
    TypeConstraint,
    PropertyConstraint,
    OccurrenceConstraint,
}

impl Violation {
    /// Canonical OCPP error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Formation => "FormationViolation",
            Self::Protocol => "ProtocolError",
            Self::TypeConstraint => "TypeConstraintViolation",
            Self::PropertyConstraint => "PropertyConstraintViolation",
            Self::OccurrenceConstraint => "OccurrenceConstraintViolation",
        }
    }

    /// Canonical OCPP error description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Formation => {
                "Payload for Action is syntactically incorrect or not conform the PDU structure for Action"
            }
            Self::Protocol => "Payload for Action is incomplete",
            Self::TypeConstraint => {
                "Payload for Action is syntactically correct but at least one of the fields violates data type constraints (e.g. \"somestring\": 12)"
            }
            Self::PropertyConstraint => {
                "Payload is syntactically correct but at least one field contains an invalid value"
            }
            Self::OccurrenceConstraint => {
                "Payload for Action is syntactically correct but at least one of the fields violates occurrence constraints"
            }
        }
    }

    /// CALLERROR frame answering the offending message.
    pub fn to_frame(&self, unique_id: &str) -> OcppFrame {
        OcppFrame::error_response(unique_id, self.code(), self.description())
    }
}

/// Result of a validation step.
pub type Checked<T> = Result<T, Violation>;

/// CALLERROR answering a non-BootNotification call on an unbooted session.
pub fn generic_error(unique_id: &str) -> OcppFrame {
    OcppFrame::error_response(unique_id, "GenericError", "Generic Error")
}

/// CALLERROR for an envelope whose message type is not known at all.
pub fn not_implemented(unique_id: &str) -> OcppFrame {
    OcppFrame::error_response(
        unique_id,
        "NotImplemented",
        "Requested Action is not known by receiver",
    )
}

/// CALLERROR for a recognised but unsupported action.
pub fn not_supported(unique_id: &str) -> OcppFrame {
    OcppFrame::error_response(
        unique_id,
        "NotSupported",
        "Requested Action is recognized but not supported by the receiver",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_ordering() {
        assert_eq!(Violation::Formation.code(), "FormationViolation");
        assert_eq!(Violation::Protocol.code(), "ProtocolError");
        assert_eq!(Violation::TypeConstraint.code(), "TypeConstraintViolation");
        assert_eq!(
            Violation::PropertyConstraint.code(),
            "PropertyConstraintViolation"
        );
        assert_eq!(
            Violation::OccurrenceConstraint.code(),
            "OccurrenceConstraintViolation"
        );
        // The derived ordering mirrors the check order.
        assert!(Violation::Formation < Violation::Protocol);
        assert!(Violation::Protocol < Violation::TypeConstraint);
        assert!(Violation::TypeConstraint < Violation::PropertyConstraint);
        assert!(Violation::PropertyConstraint < Violation::OccurrenceConstraint);
    }

    #[test]
    fn violation_frame_echoes_unique_id() {
        let frame = Violation::TypeConstraint.to_frame("uid-9");
        match frame {
            OcppFrame::CallError {
                unique_id,
                error_code,
                ..
            } => {
                assert_eq!(unique_id, "uid-9");
                assert_eq!(error_code, "TypeConstraintViolation");
            }
            _ => panic!("expected CallError"),
        }
    }

    #[test]
    fn generic_error_shape() {
        let json = generic_error("1").serialize();
        assert_eq!(json, r#"[4,"1","GenericError","Generic Error",{}]"#);
    }
}
