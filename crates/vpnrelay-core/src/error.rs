// ============================================
// File: crates/vpnrelay-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Main Functionality
//! - `CoreError`: malformed packet and credential validity failures
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Raw payload is shorter than an IPv4 header needs to be.
    #[error("Packet too short: need {required} bytes, got {actual}")]
    PacketTooShort {
        /// Minimum length required
        required: usize,
        /// Actual payload length
        actual: usize,
    },

    /// Raw payload is not an IPv4 datagram.
    #[error("Expected IPv4, got version {version}")]
    NotIpv4 {
        /// Version nibble found in the header
        version: u8,
    },

    /// Credential expiry time has passed.
    #[error("Credential expired at {expires_at} (now {now})")]
    CredentialExpired {
        /// Expiry claim (unix seconds)
        expires_at: i64,
        /// Time of the check (unix seconds)
        now: i64,
    },

    /// Credential is not valid yet.
    #[error("Credential not valid before {not_before} (now {now})")]
    CredentialNotYetValid {
        /// Not-before claim (unix seconds)
        not_before: i64,
        /// Time of the check (unix seconds)
        now: i64,
    },

    /// Credential claims to be issued in the future.
    #[error("Credential issued in the future at {issued_at} (now {now})")]
    CredentialIssuedInFuture {
        /// Issued-at claim (unix seconds)
        issued_at: i64,
        /// Time of the check (unix seconds)
        now: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CredentialExpired { expires_at: 10, now: 20 };
        assert!(err.to_string().contains("expired at 10"));

        let err = CoreError::NotIpv4 { version: 6 };
        assert!(err.to_string().contains("version 6"));
    }
}
