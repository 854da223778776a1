//! Inbound exchange: payload extraction and negotiated rendering

use crate::content_negotiation::negotiate;
use crate::error::{ParserError, ParserResult};
use crate::markup::to_xml;
use crate::request::RequestContext;
use crate::response::{ExchangeResponse, MIME_JSON, MIME_XML};
use courier_common::{parse_str, HttpMethod, Payload};
use serde_json::Value;
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Read size used when draining the request body
pub const READ_CHUNK_SIZE: usize = 8192;

/// Formats `return_data` can produce, in server preference order
pub const SUPPORTED_MIME_TYPES: [&str; 2] = [MIME_JSON, MIME_XML];

/// Payload access and response rendering for one request
///
/// # Example
///
/// ```ignore
/// let mut exchange = InboundExchange::new(RequestContext::from_http(req));
/// let name = exchange.get_data(false)?.get("name").cloned();
/// let response = exchange.return_data(&json!({"hello": name}), Some(200));
/// ```
#[derive(Debug)]
pub struct InboundExchange {
    context: RequestContext,
    cached: Option<Payload>,
}

impl InboundExchange {
    /// Wrap the state of the request being handled
    pub fn new(context: RequestContext) -> Self {
        Self {
            context,
            cached: None,
        }
    }

    /// The underlying request state
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Get the request payload
    ///
    /// GET reads the query store, POST the form store, PUT and DELETE parse
    /// the raw body as URL-encoded text. The first result is cached; `force`
    /// re-parses. A body stream can be drained only once, so a forced
    /// re-read of a PUT/DELETE body yields an empty payload.
    pub fn get_data(&mut self, force: bool) -> ParserResult<&Payload> {
        if force || self.cached.is_none() {
            let payload = self.parse_payload()?;
            self.cached = Some(payload);
        }

        Ok(self.cached.get_or_insert_with(Payload::new))
    }

    fn parse_payload(&mut self) -> ParserResult<Payload> {
        let method = self
            .context
            .method
            .parse::<HttpMethod>()
            .map_err(|_| ParserError::UnsupportedMethod(self.context.method.clone()))?;

        debug!(method = %method, "Extracting request payload");

        match method {
            HttpMethod::Get => Ok(self.context.query.clone()),
            HttpMethod::Post => Ok(self.context.form.clone()),
            HttpMethod::Put | HttpMethod::Delete => {
                let raw = self.read_body()?;
                Ok(parse_str(&String::from_utf8_lossy(&raw)))
            }
            _ => Err(ParserError::UnsupportedMethod(self.context.method.clone())),
        }
    }

    /// Drain the body stream in fixed-size chunks
    fn read_body(&mut self) -> ParserResult<Vec<u8>> {
        let stream = self.context.body_mut().ok_or(ParserError::UnreadableBody)?;

        let mut buffer = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ParserError::InvalidStream(e.to_string())),
            }
        }

        debug!(bytes = buffer.len(), "Read request body");
        Ok(buffer)
    }

    /// Render `data` in the negotiated format
    ///
    /// This is the terminal step of a handler: the returned descriptor is
    /// what gets written, with the given status (200 when `None`).
    pub fn return_data(&self, data: &Value, status: Option<u16>) -> ExchangeResponse {
        let content_type = negotiate(self.context.accept.as_deref(), &SUPPORTED_MIME_TYPES)
            .unwrap_or_else(|| MIME_JSON.to_string());

        let body = if content_type == MIME_XML {
            to_xml(data)
        } else {
            data.to_string()
        };

        debug!(content_type = %content_type, status = ?status, "Rendered response");

        ExchangeResponse {
            status,
            content_type,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::BrokenPipe, "connection reset"))
        }
    }

    #[test]
    fn test_get_reads_query() {
        let ctx = RequestContext::new("GET")
            .with_query_string("q=v")
            .with_form_body("ignored=1");
        let mut exchange = InboundExchange::new(ctx);

        let data = exchange.get_data(false).unwrap();
        assert_eq!(Value::Object(data.clone()), json!({"q": "v"}));
    }

    #[test]
    fn test_post_reads_form() {
        let ctx = RequestContext::new("post")
            .with_query_string("ignored=1")
            .with_form_body("name=bob");
        let mut exchange = InboundExchange::new(ctx);

        assert_eq!(exchange.get_data(false).unwrap()["name"], "bob");
    }

    #[test]
    fn test_put_and_delete_read_body() {
        for method in ["PUT", "DELETE"] {
            let ctx = RequestContext::new(method).with_body(Cursor::new(b"id=7&tags[]=x".to_vec()));
            let mut exchange = InboundExchange::new(ctx);

            let data = exchange.get_data(false).unwrap();
            assert_eq!(Value::Object(data.clone()), json!({"id": "7", "tags": {"0": "x"}}));
        }
    }

    #[test]
    fn test_body_larger_than_one_chunk() {
        let value = "x".repeat(READ_CHUNK_SIZE * 2 + 10);
        let body = format!("blob={}", value);
        let ctx = RequestContext::new("PUT").with_body(Cursor::new(body.into_bytes()));
        let mut exchange = InboundExchange::new(ctx);

        assert_eq!(exchange.get_data(false).unwrap()["blob"], value.as_str());
    }

    #[test]
    fn test_unsupported_method() {
        for method in ["PATCH", "OPTIONS", "BREW"] {
            let mut exchange = InboundExchange::new(RequestContext::new(method));
            let err = exchange.get_data(false).unwrap_err();
            assert!(matches!(err, ParserError::UnsupportedMethod(ref m) if m == method));
            assert_eq!(err.status_code(), 500);
        }
    }

    #[test]
    fn test_missing_body_stream() {
        let mut exchange = InboundExchange::new(RequestContext::new("DELETE"));
        assert!(matches!(
            exchange.get_data(false),
            Err(ParserError::UnreadableBody)
        ));
    }

    #[test]
    fn test_failing_body_stream() {
        let ctx = RequestContext::new("PUT").with_body(FailingReader);
        let mut exchange = InboundExchange::new(ctx);
        assert!(matches!(
            exchange.get_data(false),
            Err(ParserError::InvalidStream(_))
        ));
    }

    #[test]
    fn test_cached_until_forced() {
        let ctx = RequestContext::new("PUT").with_body(Cursor::new(b"a=1".to_vec()));
        let mut exchange = InboundExchange::new(ctx);

        let first = exchange.get_data(false).unwrap().clone();
        let second = exchange.get_data(false).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first["a"], "1");

        // The stream is drained, so a forced re-parse sees an empty body.
        let forced = exchange.get_data(true).unwrap();
        assert!(forced.is_empty());
    }

    #[test]
    fn test_return_data_defaults_to_json() {
        let exchange = InboundExchange::new(RequestContext::new("GET"));
        let response = exchange.return_data(&json!({"ok": true}), None);

        assert_eq!(response.content_type, MIME_JSON);
        assert_eq!(response.body, r#"{"ok":true}"#);
        assert_eq!(response.status, None);
    }

    #[test]
    fn test_return_data_negotiates_xml() {
        let ctx = RequestContext::new("GET").with_accept("application/json;q=0.5,application/xml");
        let exchange = InboundExchange::new(ctx);
        let response = exchange.return_data(&json!({"0": "a", "name": "bob"}), Some(201));

        assert_eq!(response.content_type, MIME_XML);
        assert_eq!(response.status, Some(201));
        assert!(response.body.contains("<data><item0>a</item0><name>bob</name></data>"));
    }

    #[test]
    fn test_return_data_unknown_accept_falls_back() {
        let ctx = RequestContext::new("GET").with_accept("text/plain");
        let exchange = InboundExchange::new(ctx);
        let response = exchange.return_data(&json!([1, 2]), None);

        assert_eq!(response.content_type, MIME_JSON);
        assert_eq!(response.body, "[1,2]");
    }
}
