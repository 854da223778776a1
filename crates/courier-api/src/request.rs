//! Request state handed to the inbound exchange
//!
//! The surrounding server builds one `RequestContext` per request and
//! passes it in; nothing is read from process-wide state.

use bytes::Bytes;
use courier_common::{parse_str, Payload};
use std::fmt;
use std::io::{Cursor, Read};

/// Everything the exchange may read from the request being handled
pub struct RequestContext {
    /// Method as it appeared on the request line
    pub method: String,
    /// Decoded query-string parameters
    pub query: Payload,
    /// Decoded form fields (populated for form-encoded POST bodies)
    pub form: Payload,
    /// Raw `Accept` header, if the client sent one
    pub accept: Option<String>,
    body: Option<Box<dyn Read + Send>>,
}

impl RequestContext {
    /// Create a context with empty stores and no body
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            query: Payload::new(),
            form: Payload::new(),
            accept: None,
            body: None,
        }
    }

    /// Set the query parameter store
    pub fn with_query(mut self, query: Payload) -> Self {
        self.query = query;
        self
    }

    /// Parse and set the query parameter store from a raw query string
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query = parse_str(query.trim_start_matches('?'));
        self
    }

    /// Set the parsed form store
    pub fn with_form(mut self, form: Payload) -> Self {
        self.form = form;
        self
    }

    /// Parse and set the form store from a URL-encoded body
    pub fn with_form_body(mut self, body: &str) -> Self {
        self.form = parse_str(body);
        self
    }

    /// Attach the raw body stream
    pub fn with_body(mut self, body: impl Read + Send + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// Set the `Accept` header
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Build a context from an `http` request
    ///
    /// The query store comes from the URI, the form store is filled only for
    /// POST requests with a `application/x-www-form-urlencoded` body, and
    /// the body bytes are always available as the raw stream.
    pub fn from_http(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();

        let mut context = Self::new(parts.method.as_str())
            .with_query_string(parts.uri.query().unwrap_or(""));

        if let Some(accept) = header_str(&parts.headers, http::header::ACCEPT) {
            context = context.with_accept(accept);
        }

        let is_form = header_str(&parts.headers, http::header::CONTENT_TYPE)
            .map(|ct| ct.to_lowercase().starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        if parts.method == http::Method::POST && is_form {
            context = context.with_form_body(&String::from_utf8_lossy(&body));
        }

        context.with_body(Cursor::new(body))
    }

    /// Mutable access to the body stream, if one was attached
    pub(crate) fn body_mut(&mut self) -> Option<&mut (dyn Read + Send + 'static)> {
        self.body.as_deref_mut()
    }

    /// Check whether a body stream was attached
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

fn header_str(headers: &http::HeaderMap, name: http::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("query", &self.query)
            .field("form", &self.form)
            .field("accept", &self.accept)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let ctx = RequestContext::new("GET")
            .with_query_string("?a=1&b[]=x")
            .with_accept("application/xml");

        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.query["a"], "1");
        assert_eq!(ctx.query["b"]["0"], "x");
        assert_eq!(ctx.accept.as_deref(), Some("application/xml"));
        assert!(!ctx.has_body());
    }

    #[test]
    fn test_from_http_form_post() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/items?page=2")
            .header("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
            .header("Accept", "application/json")
            .body(Bytes::from_static(b"name=bob&tags[]=a"))
            .unwrap();

        let ctx = RequestContext::from_http(request);
        assert_eq!(ctx.method, "POST");
        assert_eq!(ctx.query["page"], "2");
        assert_eq!(ctx.form["name"], "bob");
        assert_eq!(ctx.form["tags"]["0"], "a");
        assert_eq!(ctx.accept.as_deref(), Some("application/json"));
        assert!(ctx.has_body());
    }

    #[test]
    fn test_from_http_json_post_leaves_form_empty() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/items")
            .header("Content-Type", "application/json")
            .body(Bytes::from_static(b"{\"name\":\"bob\"}"))
            .unwrap();

        let ctx = RequestContext::from_http(request);
        assert!(ctx.form.is_empty());
        assert!(ctx.accept.is_none());
    }
}
