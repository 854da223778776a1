//! Outbound call results

use crate::error::TransportFault;
use courier_common::HttpStatus;
use serde_json::{json, Value};
use tracing::error;

/// Message used when the remote host cannot be reached
pub const UNREACHABLE_MESSAGE: &str = "Invalid Datalogger IP";

/// Message used when the remote body is not JSON
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON response";

/// Decoded body of an outbound call paired with its status code
///
/// `status_code` is 0 when the transport never obtained a status.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundResult {
    pub body: Value,
    pub status_code: u16,
}

impl OutboundResult {
    pub fn new(body: Value, status_code: u16) -> Self {
        Self { body, status_code }
    }

    /// Result for a failed exchange
    ///
    /// Resolve/connect failures get the fixed unreachable body, anything
    /// else reports the fault description and code.
    pub fn from_fault(fault: &TransportFault, status_code: u16) -> Self {
        let body = if fault.is_unreachable() {
            json!({"message": UNREACHABLE_MESSAGE, "code": 1})
        } else {
            json!({"message": format!("cURL Error: {} ({})", fault.public_message(), fault.code())})
        };
        Self::new(body, status_code)
    }

    /// Decode a received body
    ///
    /// An empty body decodes to `null` in raw mode and to `[]` otherwise.
    /// A body that is not JSON is logged and replaced by an error body.
    pub fn from_body(text: &str, status_code: u16, raw: bool) -> Self {
        if text.is_empty() {
            let body = if raw { Value::Null } else { Value::Array(Vec::new()) };
            return Self::new(body, status_code);
        }

        match serde_json::from_str::<Value>(text) {
            Ok(body) => Self::new(body, status_code),
            Err(_) => {
                error!("Invalid JSON (callApi): {}", text);
                Self::new(json!({"message": INVALID_JSON_MESSAGE, "code": 1}), status_code)
            }
        }
    }

    /// Status as an `HttpStatus`
    pub fn status(&self) -> HttpStatus {
        HttpStatus(self.status_code)
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Check whether a status was ever received
    pub fn has_status(&self) -> bool {
        !self.status().is_none()
    }

    /// The `message` field of an error-shaped body
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Split into `(body, status_code)`
    pub fn into_parts(self) -> (Value, u16) {
        (self.body, self.status_code)
    }
}
