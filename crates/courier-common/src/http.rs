//! Shared HTTP types for the courier crates.

use std::fmt;
use std::str::FromStr;

/// HTTP request methods.
///
/// Both halves of courier only act on GET, POST, PUT and DELETE; the other
/// variants exist so that an inbound request line can always be represented
/// and then rejected with a precise error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// True for the four methods courier exchanges data with.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Get | Self::Post | Self::Put | Self::Delete)
    }

    /// True for methods that may carry file attachments (POST and PUT).
    pub fn accepts_files(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(format!("Invalid HTTP method: {}", s)),
        }
    }
}

/// HTTP status code wrapper with helper methods.
///
/// A code of 0 means no status was ever received (the exchange failed
/// before the remote answered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpStatus(pub u16);

impl HttpStatus {
    pub const NONE: Self = Self(0);
    pub const OK: Self = Self(200);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Returns the status code as u16.
    pub fn code(&self) -> u16 {
        self.0
    }

    /// Returns true when no status was received.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if this is a success status (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl From<u16> for HttpStatus {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<HttpStatus> for u16 {
    fn from(status: HttpStatus) -> Self {
        status.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_from_str() {
        assert_eq!(HttpMethod::from_str("GET").unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::from_str("get").unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::from_str("Delete").unwrap(), HttpMethod::Delete);
        assert!(HttpMethod::from_str("BREW").is_err());
    }

    #[test]
    fn test_supported_methods() {
        assert!(HttpMethod::Get.is_supported());
        assert!(HttpMethod::Delete.is_supported());
        assert!(!HttpMethod::Patch.is_supported());
        assert!(!HttpMethod::Options.is_supported());
    }

    #[test]
    fn test_file_methods() {
        assert!(HttpMethod::Post.accepts_files());
        assert!(HttpMethod::Put.accepts_files());
        assert!(!HttpMethod::Get.accepts_files());
        assert!(!HttpMethod::Delete.accepts_files());
    }

    #[test]
    fn test_http_status_helpers() {
        assert!(HttpStatus::OK.is_success());
        assert!(!HttpStatus(301).is_success());
        assert!(!HttpStatus::INTERNAL_SERVER_ERROR.is_success());
        assert!(HttpStatus::NONE.is_none());
        assert!(!HttpStatus::NONE.is_success());

        let code: u16 = HttpStatus::from(404).into();
        assert_eq!(code, 404);
    }
}
