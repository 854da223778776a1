//! Transport configuration for outbound calls

use crate::error::{HttpError, HttpResult};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default connect and total timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default redirect hop limit
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Default User-Agent header value
pub const DEFAULT_USER_AGENT: &str = "unknown";

/// Username/password pair for HTTP basic authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse `user:password`; everything after the first colon is the password
    pub fn parse(userpwd: &str) -> Self {
        let (username, password) = userpwd.split_once(':').unwrap_or((userpwd, ""));
        Self::new(username, password)
    }
}

/// Options applied to the transport handle of a single call
///
/// Starts from the defaults below; every builder call overrides exactly one
/// field and leaves the others alone.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Total request timeout
    pub timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,

    /// Send a Referer header when following redirects
    pub auto_referer: bool,

    /// Advertise and transparently decode gzip/brotli content encodings
    pub decompress: bool,

    /// Basic authentication credentials
    pub credentials: Option<Credentials>,

    /// Extra request headers, in order
    pub headers: Vec<(String, String)>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            connect_timeout: DEFAULT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auto_referer: true,
            decompress: true,
            credentials: None,
            headers: Vec::new(),
        }
    }
}

impl TransportOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow redirects
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set maximum redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the total timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the total timeout from seconds
    ///
    /// Negative or non-finite values become zero and fail validation.
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout = secs_to_duration(secs);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the connection timeout from seconds
    pub fn connect_timeout_secs(mut self, secs: f64) -> Self {
        self.connect_timeout = secs_to_duration(secs);
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable/disable the Referer header on redirects
    pub fn auto_referer(mut self, enabled: bool) -> Self {
        self.auto_referer = enabled;
        self
    }

    /// Enable/disable content-encoding negotiation
    pub fn decompress(mut self, enabled: bool) -> Self {
        self.decompress = enabled;
        self
    }

    /// Enable basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Append an extra request header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Check whether an extra header with this name is set (case-insensitive)
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Check the options can be applied to a transport handle
    pub fn validate(&self) -> HttpResult<()> {
        if self.timeout.is_zero() {
            return Err(HttpError::InvalidOption("timeout must be positive".to_string()));
        }
        if self.connect_timeout.is_zero() {
            return Err(HttpError::InvalidOption(
                "connect timeout must be positive".to_string(),
            ));
        }
        HeaderValue::from_str(&self.user_agent).map_err(|_| {
            HttpError::InvalidOption(format!("invalid user agent: {:?}", self.user_agent))
        })?;
        self.header_map()?;
        Ok(())
    }

    /// Extra headers as a `HeaderMap`, preserving repeated names
    pub fn header_map(&self) -> HttpResult<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|_| HttpError::InvalidOption(format!("invalid header name: {:?}", name)))?;
            let value = HeaderValue::from_str(value.trim()).map_err(|_| {
                HttpError::InvalidOption(format!("invalid value for header {}", name))
            })?;
            map.append(name, value);
        }
        Ok(map)
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

/// Partial transport settings, e.g. loaded from a configuration file
///
/// Every field is optional; `apply` overrides only the fields that are set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSettings {
    pub follow_redirects: Option<bool>,
    pub max_redirects: Option<usize>,
    pub connect_timeout_secs: Option<f64>,
    pub timeout_secs: Option<f64>,
    pub user_agent: Option<String>,
    pub auto_referer: Option<bool>,
    pub decompress: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl TransportSettings {
    /// Layer these settings over `options`
    pub fn apply(&self, mut options: TransportOptions) -> TransportOptions {
        if let Some(follow) = self.follow_redirects {
            options = options.follow_redirects(follow);
        }
        if let Some(max) = self.max_redirects {
            options = options.max_redirects(max);
        }
        if let Some(secs) = self.connect_timeout_secs {
            options = options.connect_timeout_secs(secs);
        }
        if let Some(secs) = self.timeout_secs {
            options = options.timeout_secs(secs);
        }
        if let Some(user_agent) = &self.user_agent {
            options = options.user_agent(user_agent.clone());
        }
        if let Some(enabled) = self.auto_referer {
            options = options.auto_referer(enabled);
        }
        if let Some(enabled) = self.decompress {
            options = options.decompress(enabled);
        }
        if let Some(username) = &self.username {
            let password = self.password.clone().unwrap_or_default();
            options = options.basic_auth(username.clone(), password);
        }
        for (name, value) in &self.headers {
            options = options.header(name.clone(), value.clone());
        }
        options
    }
}
