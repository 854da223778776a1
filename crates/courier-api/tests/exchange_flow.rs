//! End-to-end inbound flow: http request in, rendered http response out

use bytes::Bytes;
use courier_api::{InboundExchange, ParserError, RequestContext, MIME_JSON, MIME_XML};
use serde_json::{json, Value};

fn request(method: &str, uri: &str, accept: Option<&str>, body: &'static [u8]) -> http::Request<Bytes> {
    let mut builder = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(accept) = accept {
        builder = builder.header("Accept", accept);
    }
    builder.body(Bytes::from_static(body)).unwrap()
}

#[test]
fn test_get_echo_as_json() {
    let req = request("GET", "/echo?q=v&list[]=1&list[]=2", None, b"");
    let mut exchange = InboundExchange::new(RequestContext::from_http(req));

    let data = Value::Object(exchange.get_data(false).unwrap().clone());
    assert_eq!(data, json!({"q": "v", "list": {"0": "1", "1": "2"}}));

    let response = exchange.return_data(&data, None).into_http().unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(response.headers()[http::header::CONTENT_TYPE], MIME_JSON);
    assert_eq!(response.body(), r#"{"q":"v","list":{"0":"1","1":"2"}}"#);
}

#[test]
fn test_put_echo_as_xml() {
    let req = request(
        "PUT",
        "/echo",
        Some("application/xml;q=0.9,application/json;q=0.1"),
        b"note=a%26b&ids[]=4",
    );
    let mut exchange = InboundExchange::new(RequestContext::from_http(req));

    let data = Value::Object(exchange.get_data(false).unwrap().clone());
    let response = exchange.return_data(&data, Some(202));

    assert_eq!(response.content_type, MIME_XML);
    assert_eq!(
        response.body,
        "<?xml version=\"1.0\"?>\n<data><note>a&amp;b</note><ids><item0>4</item0></ids></data>\n"
    );
    assert_eq!(response.into_http().unwrap().status(), http::StatusCode::ACCEPTED);
}

#[test]
fn test_post_form_is_cached() {
    let req = request("POST", "/items", Some("*/*"), b"name=bob");
    let mut exchange = InboundExchange::new(RequestContext::from_http(req));

    let first = exchange.get_data(false).unwrap().clone();
    let forced = exchange.get_data(true).unwrap().clone();
    assert_eq!(first, forced);
    assert_eq!(first["name"], "bob");
}

#[test]
fn test_patch_is_rejected() {
    let req = request("PATCH", "/items", None, b"name=bob");
    let mut exchange = InboundExchange::new(RequestContext::from_http(req));

    let err = exchange.get_data(false).unwrap_err();
    assert!(matches!(err, ParserError::UnsupportedMethod(ref m) if m == "PATCH"));
    assert_eq!(err.status_code(), 500);
}
