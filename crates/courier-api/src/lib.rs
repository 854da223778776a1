//! courier-api: inbound side of courier
//!
//! Extracts the payload of the request being handled, whatever its method,
//! and renders a reply in the representation the client prefers:
//! - `RequestContext`: the explicit request state (method, query, form,
//!   body reader, `Accept` header)
//! - `InboundExchange`: cached payload extraction and negotiated rendering
//! - `content_negotiation`: `Accept` header quality parsing
//! - `markup`: JSON value to XML serialization

pub mod content_negotiation;
pub mod error;
pub mod exchange;
pub mod markup;
pub mod request;
pub mod response;

pub use content_negotiation::{negotiate, AcceptHeader, MimeQuality};
pub use error::{ParserError, ParserResult};
pub use exchange::InboundExchange;
pub use markup::{serialize, tag_name, to_xml, MarkupNode};
pub use request::RequestContext;
pub use response::{ExchangeResponse, MIME_JSON, MIME_XML};

// Re-export shared types from courier-common
pub use courier_common::{HttpMethod, HttpStatus, Payload};
