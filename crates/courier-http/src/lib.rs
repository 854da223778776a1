//! courier-http: outbound side of courier
//!
//! Performs exactly one HTTP call per invocation and always hands back a
//! `(body, status)` pair, turning transport and decoding failures into
//! error-shaped bodies instead of errors.
//!
//! # Architecture
//!
//! - `TransportOptions`: typed, validated transport settings
//! - `OutboundRequest`: method, URL, data, attachments; `prepare()` shapes
//!   the wire request without touching the network
//! - `call_api` / `HttpClient`: execution and response decoding
//! - `OutboundResult`: the decoded body paired with its status code

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use client::{call_api, HttpClient};
pub use config::{Credentials, TransportOptions, TransportSettings};
pub use error::{HttpError, HttpResult, TransportFault};
pub use request::{FileAttachment, MultipartField, OutboundRequest, PreparedRequest, RequestBody};
pub use response::OutboundResult;

// Re-export shared HTTP types from courier-common
pub use courier_common::{HttpMethod, HttpStatus, Payload};
