//! OCPP-J message framing
//!
//! Implements the OCPP-J (JSON over WebSocket) transport envelope:
//!
//! - **Call**       `[2, "<uniqueId>", "<action>", {<payload>}]`
//! - **CallResult** `[3, "<uniqueId>", {<payload>}]`
//! - **CallError**  `[4, "<uniqueId>", "<errorCode>", "<errorDescription>", {<errorDetails>}]`
//!
//! The uniqueId is parsed as a JSON string and echoed verbatim in replies.

use serde_json::Value;
use std::fmt;

// ── Message-type constants ─────────────────────────────────────

const MSG_TYPE_CALL: u64 = 2;
const MSG_TYPE_CALL_RESULT: u64 = 3;
const MSG_TYPE_CALL_ERROR: u64 = 4;

// ── OcppFrame ──────────────────────────────────────────────────

/// A parsed OCPP-J frame.
#[derive(Debug, Clone, PartialEq)]
pub enum OcppFrame {
    /// `[2, uniqueId, action, payload]`
    Call {
        unique_id: String,
        action: String,
        payload: Value,
    },
    /// `[3, uniqueId, payload]`
    CallResult {
        unique_id: String,
        payload: Value,
    },
    /// `[4, uniqueId, errorCode, errorDescription, errorDetails]`
    CallError {
        unique_id: String,
        error_code: String,
        error_description: String,
        error_details: Value,
    },
}

impl OcppFrame {
    // ── Parsing ────────────────────────────────────────────

    /// Parse a raw JSON text into an `OcppFrame`.
    ///
    /// Shape mismatches carry the uniqueId when one could be recovered, so
    /// the dispatcher can still answer with a correlated CALLERROR.
    pub fn parse(text: &str) -> Result<Self, OcppFrameError> {
        let arr: Vec<Value> = serde_json::from_str(text)
            .map_err(|e| OcppFrameError::new(FrameFault::InvalidJson(e.to_string()), None))?;

        let recovered_uid = arr.get(1).and_then(Value::as_str).map(str::to_string);

        if arr.is_empty() {
            return Err(OcppFrameError::new(FrameFault::EmptyArray, None));
        }

        let msg_type = arr[0]
            .as_u64()
            .ok_or_else(|| OcppFrameError::new(FrameFault::InvalidMessageType, recovered_uid.clone()))?;

        match msg_type {
            MSG_TYPE_CALL => Self::parse_call(&arr, recovered_uid),
            MSG_TYPE_CALL_RESULT => Self::parse_call_result(&arr, recovered_uid),
            MSG_TYPE_CALL_ERROR => Self::parse_call_error(&arr, recovered_uid),
            other => Err(OcppFrameError::new(
                FrameFault::UnknownMessageType(other),
                recovered_uid,
            )),
        }
    }

    fn parse_call(arr: &[Value], uid: Option<String>) -> Result<Self, OcppFrameError> {
        if arr.len() != 4 {
            return Err(OcppFrameError::new(
                FrameFault::WrongLength {
                    expected: 4,
                    got: arr.len(),
                },
                uid,
            ));
        }

        let unique_id = arr[1]
            .as_str()
            .ok_or_else(|| {
                OcppFrameError::new(FrameFault::FieldType("uniqueId must be a string"), uid.clone())
            })?
            .to_string();
        let action = arr[2]
            .as_str()
            .ok_or_else(|| {
                OcppFrameError::new(FrameFault::FieldType("action must be a string"), uid.clone())
            })?
            .to_string();

        Ok(Self::Call {
            unique_id,
            action,
            payload: arr[3].clone(),
        })
    }

    fn parse_call_result(arr: &[Value], uid: Option<String>) -> Result<Self, OcppFrameError> {
        if arr.len() != 3 {
            return Err(OcppFrameError::new(
                FrameFault::WrongLength {
                    expected: 3,
                    got: arr.len(),
                },
                uid,
            ));
        }

        let unique_id = arr[1]
            .as_str()
            .ok_or_else(|| {
                OcppFrameError::new(FrameFault::FieldType("uniqueId must be a string"), uid)
            })?
            .to_string();

        Ok(Self::CallResult {
            unique_id,
            payload: arr[2].clone(),
        })
    }

    fn parse_call_error(arr: &[Value], uid: Option<String>) -> Result<Self, OcppFrameError> {
        if arr.len() != 5 {
            return Err(OcppFrameError::new(
                FrameFault::WrongLength {
                    expected: 5,
                    got: arr.len(),
                },
                uid,
            ));
        }

        let unique_id = arr[1]
            .as_str()
            .ok_or_else(|| {
                OcppFrameError::new(FrameFault::FieldType("uniqueId must be a string"), uid.clone())
            })?
            .to_string();
        let error_code = arr[2]
            .as_str()
            .ok_or_else(|| {
                OcppFrameError::new(FrameFault::FieldType("errorCode must be a string"), uid.clone())
            })?
            .to_string();
        let error_description = arr[3]
            .as_str()
            .ok_or_else(|| {
                OcppFrameError::new(
                    FrameFault::FieldType("errorDescription must be a string"),
                    uid,
                )
            })?
            .to_string();

        Ok(Self::CallError {
            unique_id,
            error_code,
            error_description,
            error_details: arr[4].clone(),
        })
    }

    // ── Serialization ──────────────────────────────────────

    /// Serialize this frame to a JSON string.
    pub fn serialize(&self) -> String {
        let arr: Value = match self {
            Self::Call {
                unique_id,
                action,
                payload,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL.into()),
                Value::String(unique_id.clone()),
                Value::String(action.clone()),
                payload.clone(),
            ]),

            Self::CallResult { unique_id, payload } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL_RESULT.into()),
                Value::String(unique_id.clone()),
                payload.clone(),
            ]),

            Self::CallError {
                unique_id,
                error_code,
                error_description,
                error_details,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL_ERROR.into()),
                Value::String(unique_id.clone()),
                Value::String(error_code.clone()),
                Value::String(error_description.clone()),
                error_details.clone(),
            ]),
        };

        // serde_json::to_string on a Value never fails
        serde_json::to_string(&arr).unwrap()
    }

    // ── Helpers ────────────────────────────────────────────

    /// Get the unique message ID.
    pub fn unique_id(&self) -> &str {
        match self {
            Self::Call { unique_id, .. }
            | Self::CallResult { unique_id, .. }
            | Self::CallError { unique_id, .. } => unique_id,
        }
    }

    /// Create a `CallError` response for a given unique ID.
    pub fn error_response(
        unique_id: impl Into<String>,
        error_code: impl Into<String>,
        error_description: impl Into<String>,
    ) -> Self {
        Self::CallError {
            unique_id: unique_id.into(),
            error_code: error_code.into(),
            error_description: error_description.into(),
            error_details: Value::Object(Default::default()),
        }
    }

    /// Returns `true` if this is a `Call` frame.
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call { .. })
    }

    /// Returns `true` if this is a `CallResult` frame.
    pub fn is_call_result(&self) -> bool {
        matches!(self, Self::CallResult { .. })
    }

    /// Returns `true` if this is a `CallError` frame.
    pub fn is_call_error(&self) -> bool {
        matches!(self, Self::CallError { .. })
    }
}

// ── Errors ─────────────────────────────────────────────────────

/// What went wrong while parsing, plus the uniqueId when recoverable.
#[derive(Debug)]
pub struct OcppFrameError {
    pub fault: FrameFault,
    pub unique_id: Option<String>,
}

impl OcppFrameError {
    fn new(fault: FrameFault, unique_id: Option<String>) -> Self {
        Self { fault, unique_id }
    }
}

#[derive(Debug)]
pub enum FrameFault {
    InvalidJson(String),
    EmptyArray,
    InvalidMessageType,
    UnknownMessageType(u64),
    WrongLength { expected: usize, got: usize },
    FieldType(&'static str),
}

impl fmt::Display for OcppFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fault {
            FrameFault::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            FrameFault::EmptyArray => write!(f, "Empty OCPP message array"),
            FrameFault::InvalidMessageType => write!(f, "Message type is not a number"),
            FrameFault::UnknownMessageType(t) => write!(f, "Unknown message type: {}", t),
            FrameFault::WrongLength { expected, got } => {
                write!(f, "Expected {} fields, got {}", expected, got)
            }
            FrameFault::FieldType(msg) => write!(f, "Field type mismatch: {}", msg),
        }
    }
}

impl std::error::Error for OcppFrameError {}
