//! courier.toml configuration handling
//!
//! ```toml
//! [transport]
//! timeout_secs = 30
//! user_agent = "courier/0.1"
//! username = "svc"
//! password = "secret"
//!
//! [transport.headers]
//! X-Device = "logger-7"
//! ```

use anyhow::{Context, Result};
use courier_http::TransportSettings;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CourierConfig {
    /// Transport defaults layered under command-line flags
    pub transport: TransportSettings,
}

impl CourierConfig {
    /// Parse configuration text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid courier configuration")
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("In config file {}", path.display()))
    }
}
