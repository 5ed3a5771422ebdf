// ============================================
// File: crates/vpnrelay-transport/src/error.rs
// ============================================
//! # Transport Error Types
//!
//! ## Error Categories
//! 1. **Receive**: the stream failed while waiting for a message
//! 2. **Send**: a message could not be written
//! 3. **Closed**: the stream was shut down underneath us
//!
//! Every one of these ends the session that saw it; retrying belongs to
//! the client reconnecting.
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Transport layer error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Receive operation failed.
    #[error("Failed to receive: {reason}")]
    ReceiveFailed {
        /// Why receive failed
        reason: String,
    },

    /// Send operation failed.
    #[error("Failed to send: {reason}")]
    SendFailed {
        /// Why send failed
        reason: String,
    },

    /// Stream is closed.
    #[error("Stream closed")]
    Closed,
}

impl TransportError {
    /// Creates a receive error.
    pub fn receive_failed(reason: impl Into<String>) -> Self {
        Self::ReceiveFailed {
            reason: reason.into(),
        }
    }

    /// Creates a send error.
    pub fn send_failed(reason: impl Into<String>) -> Self {
        Self::SendFailed {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the stream is gone rather than momentarily failing.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
