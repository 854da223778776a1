//! Outbound request description and wire shaping
//!
//! `OutboundRequest` holds what the caller asked for; `prepare` turns it
//! into a `PreparedRequest` (final URL, headers, body) following the
//! encoding rules below, without any I/O:
//!
//! 1. attachments present: multipart body, files plus flattened data fields
//! 2. raw mode: JSON text of the data, sent as `text/plain`
//! 3. otherwise: URL-encoded data
//!
//! GET carries the encoded data in the URL, POST always has a body (possibly
//! empty), PUT and DELETE only when there is something to send.

use crate::config::TransportOptions;
use crate::error::{HttpError, HttpResult};
use courier_common::{build_query, form_pairs, HttpMethod, Payload};
use serde_json::Value;
use std::path::PathBuf;

/// Content type declared for raw-mode bodies
pub const RAW_CONTENT_TYPE: &str = "text/plain";

/// Content type of URL-encoded bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An uploaded file to forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    /// Where the file content currently lives
    pub tmp_path: PathBuf,
    /// Declared mime type
    pub mime_type: String,
    /// Original file name presented to the remote
    pub file_name: String,
}

impl FileAttachment {
    pub fn new(
        tmp_path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            tmp_path: tmp_path.into(),
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }
}

/// One part of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, attachment: FileAttachment },
}

impl MultipartField {
    /// Field name
    pub fn name(&self) -> &str {
        match self {
            MultipartField::Text { name, .. } | MultipartField::File { name, .. } => name,
        }
    }
}

/// Request body after shaping
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Text(String),
    Multipart(Vec<MultipartField>),
}

/// A request ready to be put on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Look up a header value (case-insensitive, first match)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Everything one outbound call needs
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub data: Payload,
    pub files: Vec<(String, FileAttachment)>,
    pub options: TransportOptions,
    pub raw: bool,
}

impl OutboundRequest {
    /// Create a request with no data, no files and default options
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            data: Payload::new(),
            files: Vec::new(),
            options: TransportOptions::default(),
            raw: false,
        }
    }

    /// Set the data payload
    pub fn data(mut self, data: Payload) -> Self {
        self.data = data;
        self
    }

    /// Add a file attachment; a repeated name replaces the earlier file
    pub fn file(mut self, name: impl Into<String>, attachment: FileAttachment) -> Self {
        let name = name.into();
        match self.files.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = attachment,
            None => self.files.push((name, attachment)),
        }
        self
    }

    /// Set the transport options
    pub fn options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// Send the data as JSON text instead of form encoding
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Check method, attachments and options before any network activity
    pub fn validate(&self) -> HttpResult<()> {
        if !self.method.is_supported() {
            return Err(HttpError::InvalidMethod(self.method.to_string()));
        }
        if !self.files.is_empty() && !self.method.accepts_files() {
            return Err(HttpError::Configuration(format!(
                "Files may only be set with HTTP methods post and put and not {}",
                self.method.as_str().to_lowercase()
            )));
        }
        self.options.validate()
    }

    /// Shape the wire request
    pub fn prepare(&self) -> HttpResult<PreparedRequest> {
        self.validate()?;

        let mut headers = self.options.headers.clone();
        let encoded = if !self.files.is_empty() {
            RequestBody::Multipart(self.multipart_fields())
        } else if self.raw {
            headers.push(("Content-Type".to_string(), RAW_CONTENT_TYPE.to_string()));
            RequestBody::Text(Value::Object(self.data.clone()).to_string())
        } else {
            RequestBody::Text(build_query(&self.data))
        };

        let mut url = self.url.clone();
        let body = match (self.method, encoded) {
            (HttpMethod::Get, RequestBody::Text(query)) => {
                if !query.is_empty() {
                    append_query(&mut url, &query);
                }
                RequestBody::None
            }
            (HttpMethod::Post, RequestBody::Text(text)) => RequestBody::Text(text),
            (HttpMethod::Put | HttpMethod::Delete, RequestBody::Text(text)) => {
                if text.is_empty() {
                    RequestBody::None
                } else {
                    RequestBody::Text(text)
                }
            }
            (HttpMethod::Post | HttpMethod::Put, RequestBody::Multipart(fields)) => {
                RequestBody::Multipart(fields)
            }
            (method, _) => unreachable!("{} request passed validation", method),
        };

        if matches!(body, RequestBody::Text(_))
            && !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("content-type"))
        {
            headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
        }

        Ok(PreparedRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }

    /// File parts first, then the data flattened to name/value pairs.
    /// A data field with the name of a file replaces that file.
    fn multipart_fields(&self) -> Vec<MultipartField> {
        let mut fields: Vec<MultipartField> = self
            .files
            .iter()
            .map(|(name, attachment)| MultipartField::File {
                name: name.clone(),
                attachment: attachment.clone(),
            })
            .collect();

        for (name, value) in form_pairs(&self.data) {
            let field = MultipartField::Text {
                name: name.clone(),
                value,
            };
            match fields.iter_mut().find(|f| f.name() == name) {
                Some(existing) => *existing = field,
                None => fields.push(field),
            }
        }

        fields
    }
}

/// Append an encoded query to a URL that may already carry one
fn append_query(url: &mut String, query: &str) {
    if !url.contains('?') {
        url.push('?');
    } else if !url.ends_with('?') && !url.ends_with('&') {
        url.push('&');
    }
    url.push_str(query);
}
