//! Outbound error types and transport fault classification

use regex::Regex;
use std::error::Error as StdError;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors surfaced to the caller before any network activity
#[derive(Error, Debug)]
pub enum HttpError {
    /// Method outside GET/POST/PUT/DELETE
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Request options that contradict each other (e.g. files with GET)
    #[error("{0}")]
    Configuration(String),

    /// A transport option that cannot be applied
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Result type for outbound operations
pub type HttpResult<T> = Result<T, HttpError>;

/// A failed network exchange, classified with curl-compatible error codes
///
/// Faults never reach the caller as errors; they are folded into the
/// result body (see `OutboundResult::from_fault`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// The URL could not be parsed
    #[error("{0}")]
    UrlMalformed(String),

    /// Host resolution or connection failed
    #[error("{0}")]
    CouldNotResolve(String),

    /// A local attachment could not be read
    #[error("{0}")]
    ReadError(String),

    /// Connect or total timeout elapsed
    #[error("{0}")]
    Timeout(String),

    /// The request could not be assembled
    #[error("{0}")]
    BadArgument(String),

    /// Redirect limit exceeded
    #[error("{0}")]
    TooManyRedirects(String),

    /// Sending the request failed
    #[error("{0}")]
    SendError(String),

    /// Receiving the response failed
    #[error("{0}")]
    RecvError(String),

    /// The response body could not be decoded
    #[error("{0}")]
    BadContentEncoding(String),
}

impl TransportFault {
    /// Classify a reqwest error
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let description = describe(err);
        if err.is_builder() {
            TransportFault::BadArgument(description)
        } else if err.is_timeout() {
            TransportFault::Timeout(description)
        } else if err.is_connect() {
            TransportFault::CouldNotResolve(description)
        } else if err.is_redirect() {
            TransportFault::TooManyRedirects(description)
        } else if err.is_decode() {
            TransportFault::BadContentEncoding(description)
        } else if err.is_request() {
            TransportFault::SendError(description)
        } else {
            TransportFault::RecvError(description)
        }
    }

    /// curl-compatible error number
    pub fn code(&self) -> u32 {
        match self {
            TransportFault::UrlMalformed(_) => 3,
            TransportFault::CouldNotResolve(_) => 6,
            TransportFault::ReadError(_) => 26,
            TransportFault::Timeout(_) => 28,
            TransportFault::BadArgument(_) => 43,
            TransportFault::TooManyRedirects(_) => 47,
            TransportFault::SendError(_) => 55,
            TransportFault::RecvError(_) => 56,
            TransportFault::BadContentEncoding(_) => 61,
        }
    }

    /// Check for the resolve/connect class
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportFault::CouldNotResolve(_))
    }

    /// Description reported to the caller, URL userinfo removed
    pub fn public_message(&self) -> String {
        strip_url_credentials(&self.to_string())
    }

    /// Description with credentials, internal IPs and tokens removed, for logs
    pub fn sanitized_message(&self) -> String {
        sanitize_error_message(&self.to_string())
    }
}

/// Error text including its source chain (`outer: inner: root`)
fn describe(err: &reqwest::Error) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }
    description
}

/// Replace `user:password@` in URLs
fn strip_url_credentials(msg: &str) -> String {
    static URL_CREDS_RE: OnceLock<Regex> = OnceLock::new();

    let url_creds_re = URL_CREDS_RE
        .get_or_init(|| Regex::new(r"(https?)://[^@/:\s]+:[^@/\s]+@").expect("valid regex"));
    url_creds_re.replace_all(msg, "$1://[REDACTED]@").into_owned()
}

/// Sanitize error messages by removing sensitive information
fn sanitize_error_message(msg: &str) -> String {
    static INTERNAL_IP_RE: OnceLock<Regex> = OnceLock::new();
    static AUTH_HEADER_RE: OnceLock<Regex> = OnceLock::new();

    let internal_ip_re = INTERNAL_IP_RE.get_or_init(|| {
        Regex::new(r"\b(10\.|172\.(1[6-9]|2[0-9]|3[01])\.|192\.168\.)\d+\.\d+\b")
            .expect("valid regex")
    });
    let auth_header_re = AUTH_HEADER_RE.get_or_init(|| {
        Regex::new(r"(?i)(authorization:\s*basic|authorization:\s*bearer|bearer|api[_-]?key|token)\s*[:=]?\s*\S+")
            .expect("valid regex")
    });

    let sanitized = strip_url_credentials(msg);
    let sanitized = internal_ip_re.replace_all(&sanitized, "[INTERNAL_IP]");
    let sanitized = auth_header_re.replace_all(&sanitized, "$1: [REDACTED]");

    sanitized.to_string()
}
