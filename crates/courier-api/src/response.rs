//! Terminal response descriptor
//!
//! `InboundExchange::return_data` produces an `ExchangeResponse`; the
//! handler returns it and the server writes it out. Nothing after that
//! point should add to the response.

use courier_common::HttpStatus;

/// JSON mime type (also the negotiation fallback)
pub const MIME_JSON: &str = "application/json";

/// XML mime type
pub const MIME_XML: &str = "application/xml";

/// A fully rendered response, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeResponse {
    /// Status explicitly requested by the handler, if any
    pub status: Option<u16>,
    /// Negotiated `Content-Type`
    pub content_type: String,
    /// Serialized body
    pub body: String,
}

impl ExchangeResponse {
    /// Status to send: the requested one, 200 when absent or 0
    pub fn status(&self) -> HttpStatus {
        match self.status {
            Some(code) if code != 0 => HttpStatus(code),
            _ => HttpStatus::OK,
        }
    }

    /// Check if the body is XML
    pub fn is_xml(&self) -> bool {
        self.content_type == MIME_XML
    }

    /// Convert into an `http::Response`
    pub fn into_http(self) -> Result<http::Response<String>, http::Error> {
        http::Response::builder()
            .status(self.status().code())
            .header(http::header::CONTENT_TYPE, self.content_type)
            .body(self.body)
    }
}
