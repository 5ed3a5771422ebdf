// ============================================
// File: crates/vpnrelay-core/src/protocol/messages.rs
// ============================================
//! # Tunnel Message Definitions
//!
//! ## Creation Reason
//! Defines the one message type a session stream carries in both
//! directions: a status code, a packet kind, and the tunnelled datagram.
//!
//! ## Main Functionality
//! - `ErrorCode`: success or the reason a peer is being told off
//! - `PacketType`: what the payload is
//! - `IpPacket`: the message itself
//!
//! ## ⚠️ Important Note for Next Developer
//! - Numeric values mirror the stream's wire enums; append, never renumber
//! - Unrecognised numbers decode to `Unknown`, never fail
//!
//! ## Last Modified
//! v0.1.0 - Initial message definitions

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ============================================
// ErrorCode
// ============================================

/// Status carried by every message.
///
/// # Values
/// | Value | Code |
/// |-------|------|
/// | 0 | Success |
/// | 1 | Unknown |
/// | 2 | ExpiredCredential |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// Message carries data.
    Success = 0,
    /// Peer sent something the server could not accept.
    Unknown = 1,
    /// Session credential has expired.
    ExpiredCredential = 2,
}

impl ErrorCode {
    /// Converts a wire value, mapping anything unrecognised to `Unknown`.
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Success,
            2 => Self::ExpiredCredential,
            _ => Self::Unknown,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Checks if this is the success code.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Unknown => write!(f, "Unknown"),
            Self::ExpiredCredential => write!(f, "ExpiredCredential"),
        }
    }
}

// ============================================
// PacketType
// ============================================

/// Kind of payload carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum PacketType {
    /// No recognised payload.
    Unknown = 0,
    /// Raw IP datagram.
    Raw = 1,
}

impl PacketType {
    /// Converts a wire value, mapping anything unrecognised to `Unknown`.
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Raw,
            _ => Self::Unknown,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        *self as i32
    }
}

impl std::fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Raw => write!(f, "Raw"),
        }
    }
}

// ============================================
// IpPacket
// ============================================

/// A message on a session stream.
///
/// # Example
/// ```
/// use vpnrelay_core::protocol::{ErrorCode, IpPacket, PacketType};
///
/// let data = IpPacket::raw(vec![0x45; 20]);
/// assert_eq!(data.packet_type, PacketType::Raw);
///
/// let reply = IpPacket::error(ErrorCode::Unknown);
/// assert!(reply.payload.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPacket {
    /// Status code.
    pub error_code: ErrorCode,
    /// Payload kind.
    pub packet_type: PacketType,
    /// Tunnelled datagram, absent on control replies.
    pub payload: Option<Bytes>,
}

impl IpPacket {
    /// Creates a successful raw data message.
    #[must_use]
    pub fn raw(payload: impl Into<Bytes>) -> Self {
        Self {
            error_code: ErrorCode::Success,
            packet_type: PacketType::Raw,
            payload: Some(payload.into()),
        }
    }

    /// Creates a payload-less control message carrying `code`.
    #[must_use]
    pub const fn error(code: ErrorCode) -> Self {
        Self {
            error_code: code,
            packet_type: PacketType::Unknown,
            payload: None,
        }
    }

    /// Returns the payload if it is present and non-empty.
    #[must_use]
    pub fn raw_payload(&self) -> Option<&Bytes> {
        self.payload.as_ref().filter(|p| !p.is_empty())
    }

    /// Returns the payload length, zero when absent.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Bytes::len)
    }
}
