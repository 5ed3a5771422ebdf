// ============================================
// File: crates/vpnrelay-server/src/error.rs
// ============================================
//! # Server Error Types
//!
//! ## Main Functionality
//! - `ServerError`: construction, address assignment and configuration errors
//!
//! Per-packet and per-tick failures never surface here; the task that sees
//! them logs and ends the session.
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use std::net::Ipv4Addr;

use thiserror::Error;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server error types.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid parameters (method: {method})")]
    InvalidParams {
        method: &'static str,
    },

    #[error("Invalid context: missing {missing} (method: {method})")]
    InvalidContext {
        method: &'static str,
        missing: &'static str,
    },

    #[error("Virtual address already assigned: {current} (requested {requested})")]
    AddressAlreadyAssigned {
        current: Ipv4Addr,
        requested: Ipv4Addr,
    },

    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        path: String,
        reason: String,
    },

    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        field: String,
        reason: String,
    },
}

impl ServerError {
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad { .. } | Self::ConfigInvalid { .. })
    }

    /// Errors that stop a session from being created at all.
    #[must_use]
    pub const fn is_construction_error(&self) -> bool {
        matches!(self, Self::InvalidParams { .. } | Self::InvalidContext { .. })
    }
}
