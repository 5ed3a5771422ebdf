// ============================================
// File: crates/vpnrelay-server/src/config.rs
// ============================================
//! # Relay Configuration
//!
//! ## Creation Reason
//! Collects the tunables of the session relay (queue sizes, credential
//! re-check period, reply policy) and the log level into one TOML file.
//!
//! ## Configuration Sections
//! - `session`: per-session queue and credential checking
//! - `router`: the queue shared by every session toward the router
//! - `logging`: log level
//!
//! ## Example Configuration
//! ```toml
//! [session]
//! inbound_queue_capacity = 1000
//! credential_check_interval_secs = 300
//! reply_on_all_violations = false
//!
//! [router]
//! outbound_queue_capacity = 10000
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Every field has a default; an empty file is a valid config
//! - Changes apply to sessions created after the reload only
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ServerError};

/// Accepted values for `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ============================================
// RelayConfig
// ============================================

/// Main relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Per-session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Shared router queue settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or validated.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServerError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ServerError::config_load(&path_str, e.to_string()))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.router.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Serializes configuration to a TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

impl FromStr for RelayConfig {
    type Err = ServerError;

    fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ServerError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================
// SessionConfig
// ============================================

/// Per-session configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Capacity of the queue holding packets on their way to the client.
    #[serde(default = "default_inbound_queue_capacity")]
    pub inbound_queue_capacity: usize,

    /// Seconds between credential validity checks.
    #[serde(default = "default_credential_check_interval_secs")]
    pub credential_check_interval_secs: u64,

    /// Reply "unknown packet" on every rejected packet, not only on bad error codes.
    #[serde(default)]
    pub reply_on_all_violations: bool,
}

fn default_inbound_queue_capacity() -> usize {
    1000
}

fn default_credential_check_interval_secs() -> u64 {
    300
}

impl SessionConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.inbound_queue_capacity == 0 {
            return Err(ServerError::config_invalid(
                "session.inbound_queue_capacity",
                "must be greater than 0",
            ));
        }

        if self.credential_check_interval_secs == 0 {
            return Err(ServerError::config_invalid(
                "session.credential_check_interval_secs",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Returns the credential check period.
    #[must_use]
    pub const fn credential_check_interval(&self) -> Duration {
        Duration::from_secs(self.credential_check_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inbound_queue_capacity: default_inbound_queue_capacity(),
            credential_check_interval_secs: default_credential_check_interval_secs(),
            reply_on_all_violations: false,
        }
    }
}

// ============================================
// RouterConfig
// ============================================

/// Shared router queue configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Capacity of the queue every session pushes validated packets into.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
}

fn default_outbound_queue_capacity() -> usize {
    10_000
}

impl RouterConfig {
    fn validate(&self) -> Result<()> {
        if self.outbound_queue_capacity == 0 {
            return Err(ServerError::config_invalid(
                "router.outbound_queue_capacity",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_queue_capacity(),
        }
    }
}

// ============================================
// LoggingConfig
// ============================================

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(ServerError::config_invalid(
                "logging.level",
                format!("must be one of {}", LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================
// Tests
// ============================================
