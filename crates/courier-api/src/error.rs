//! Inbound error types

use courier_common::HttpStatus;
use thiserror::Error;

/// Result type for inbound payload extraction
pub type ParserResult<T> = Result<T, ParserError>;

/// Failures while extracting the payload of an inbound request
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Unsupported HTTP method {0}")]
    UnsupportedMethod(String),

    #[error("Unable to read request body")]
    UnreadableBody,

    #[error("Invalid stream: {0}")]
    InvalidStream(String),
}

impl ParserError {
    /// HTTP status code the failure should be reported with
    pub fn status_code(&self) -> u16 {
        match self {
            ParserError::UnsupportedMethod(_)
            | ParserError::UnreadableBody
            | ParserError::InvalidStream(_) => HttpStatus::INTERNAL_SERVER_ERROR.code(),
        }
    }
}
