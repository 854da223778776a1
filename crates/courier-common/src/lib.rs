//! Common utilities for courier
//!
//! This crate provides the vocabulary shared by the inbound (`courier-api`)
//! and outbound (`courier-http`) halves: HTTP methods and statuses, the
//! `Payload` mapping and the URL-encoded form codec.

pub mod form;
pub mod http;
pub mod payload;

pub use form::{build_query, decode_component, form_pairs, parse_str, MAX_NESTING};
pub use http::{HttpMethod, HttpStatus};
pub use payload::{Payload, scalar_text};
