//! Single-shot HTTP execution and response decoding

use crate::config::TransportOptions;
use crate::error::{HttpError, HttpResult, TransportFault};
use crate::request::{FileAttachment, MultipartField, OutboundRequest, PreparedRequest, RequestBody};
use crate::response::OutboundResult;
use courier_common::{HttpMethod, Payload};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

/// Transport handle for one outbound call
///
/// Built from `TransportOptions` for a single call and dropped when the
/// call returns, on success and failure alike.
///
/// # Example
///
/// ```ignore
/// use courier_http::{HttpClient, HttpMethod, OutboundRequest};
///
/// let request = OutboundRequest::new(HttpMethod::Get, "http://10.0.0.5/api/status");
/// let result = HttpClient::call(request).await?;
/// println!("{} -> {}", result.status_code, result.body);
/// ```
pub struct HttpClient {
    client: reqwest::Client,
    options: TransportOptions,
}

impl HttpClient {
    /// Create a transport handle from (validated) options
    pub fn new(options: TransportOptions) -> Result<Self, TransportFault> {
        let redirect = if options.follow_redirects {
            reqwest::redirect::Policy::limited(options.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .user_agent(options.user_agent.as_str())
            .redirect(redirect)
            .referer(options.auto_referer)
            .gzip(options.decompress)
            .brotli(options.decompress)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportFault::from_reqwest(&e))?;

        Ok(Self { client, options })
    }

    /// Validate, shape and execute one request
    ///
    /// Only invalid requests produce an `Err`, and they do so before any
    /// network activity. Transport and decoding failures come back as an
    /// error-shaped body inside the `OutboundResult`.
    pub async fn call(request: OutboundRequest) -> HttpResult<OutboundResult> {
        let prepared = request.prepare()?;
        debug!(method = %prepared.method, url = %prepared.url, "Calling remote API");

        let result = match HttpClient::new(request.options) {
            Ok(client) => client.execute(prepared, request.raw).await,
            Err(fault) => report_fault(&fault, 0),
        };

        debug!(status = result.status_code, "Remote API call finished");
        Ok(result)
    }

    /// Send a prepared request and decode the reply
    pub async fn execute(&self, prepared: PreparedRequest, raw: bool) -> OutboundResult {
        match self.send(prepared).await {
            Ok((text, status)) => OutboundResult::from_body(&text, status, raw),
            Err((fault, status)) => report_fault(&fault, status),
        }
    }

    /// Returns the body text and status, or the fault with whatever status
    /// had been received when it happened.
    async fn send(&self, prepared: PreparedRequest) -> Result<(String, u16), (TransportFault, u16)> {
        let url = url::Url::parse(&prepared.url).map_err(|e| {
            (
                TransportFault::UrlMalformed(format!("{} ({})", e, prepared.url)),
                0,
            )
        })?;

        let mut builder = self.client.request(to_reqwest_method(prepared.method), url);
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(credentials) = &self.options.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        builder = match prepared.body {
            RequestBody::None => builder,
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Multipart(fields) => {
                let form = build_form(fields).await.map_err(|fault| (fault, 0))?;
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| (TransportFault::from_reqwest(&e), 0))?;
        let status = response.status().as_u16();

        let text = response
            .text()
            .await
            .map_err(|e| (TransportFault::from_reqwest(&e), status))?;

        Ok((text, status))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.options.timeout)
            .field("connect_timeout", &self.options.connect_timeout)
            .field("follow_redirects", &self.options.follow_redirects)
            .finish()
    }
}

/// Perform one outbound call
///
/// `method` is matched case-insensitively against GET/POST/PUT/DELETE.
/// Attachments are only accepted for POST and PUT.
pub async fn call_api(
    method: &str,
    url: &str,
    data: Payload,
    files: Vec<(String, FileAttachment)>,
    options: TransportOptions,
    raw: bool,
) -> HttpResult<OutboundResult> {
    let method: HttpMethod = method
        .parse()
        .map_err(|_| HttpError::InvalidMethod(method.to_string()))?;

    let request = files.into_iter().fold(
        OutboundRequest::new(method, url).data(data).options(options).raw(raw),
        |request, (name, attachment)| request.file(name, attachment),
    );

    HttpClient::call(request).await
}

fn report_fault(fault: &TransportFault, status: u16) -> OutboundResult {
    warn!(code = fault.code(), status, "Transport error: {}", fault.sanitized_message());
    OutboundResult::from_fault(fault, status)
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

/// Assemble the multipart form, reading attachments from disk
async fn build_form(fields: Vec<MultipartField>) -> Result<Form, TransportFault> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            MultipartField::Text { name, value } => form.text(name, value),
            MultipartField::File { name, attachment } => {
                let bytes = tokio::fs::read(&attachment.tmp_path).await.map_err(|e| {
                    TransportFault::ReadError(format!(
                        "Failed to open/read local data from file {}: {}",
                        attachment.tmp_path.display(),
                        e
                    ))
                })?;
                let part = Part::bytes(bytes)
                    .file_name(attachment.file_name)
                    .mime_str(&attachment.mime_type)
                    .map_err(|e| TransportFault::from_reqwest(&e))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(TransportOptions::new().timeout_secs(5.0)).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("HttpClient"));
        assert!(debug.contains("5s"));
    }

    #[tokio::test]
    async fn test_invalid_method_string() {
        let err = call_api("brew", "http://localhost/", Payload::new(), Vec::new(), TransportOptions::new(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidMethod(ref m) if m == "brew"));
    }

    #[tokio::test]
    async fn test_malformed_url_is_a_result() {
        let result = call_api("get", "not a url", Payload::new(), Vec::new(), TransportOptions::new(), false)
            .await
            .unwrap();
        assert_eq!(result.status_code, 0);
        let message = result.error_message().unwrap();
        assert!(message.starts_with("cURL Error: "));
        assert!(message.ends_with("(3)"));
    }

    #[tokio::test]
    async fn test_missing_attachment_is_a_read_error() {
        let files = vec![(
            "photo".to_string(),
            FileAttachment::new("/nonexistent/courier/upload.bin", "image/png", "upload.png"),
        )];
        let data = json!({"a": "1"}).as_object().cloned().unwrap();

        let result = call_api("post", "http://127.0.0.1:9/", data, files, TransportOptions::new(), false)
            .await
            .unwrap();
        assert_eq!(result.status_code, 0);
        assert!(result.error_message().unwrap().ends_with("(26)"));
    }
}
