// ============================================
// File: crates/vpnrelay-server/src/handlers/validator.rs
// ============================================
//! # Packet Validator
//!
//! ## Creation Reason
//! Every message a client sends is checked before it is handed to the
//! router. A session may only speak for its own virtual address; one bad
//! packet ends the session.
//!
//! ## Validation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  1. error_code == Success            else ErrorCode         │
//! │  2. packet_type == Raw               else PacketType        │
//! │  3. payload present and non-empty    else MissingPayload    │
//! │  4. virtual address assigned         else AddressUnassigned │
//! │  5. payload is an IPv4 header        else Malformed         │
//! │  6. IPv4 source == virtual address   else SpoofedSource     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//! The first failing step decides the violation.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Stateless; safe to share between sessions
//! - Never modifies the packet
//!
//! ## Last Modified
//! v0.1.0 - Initial validator

use std::net::Ipv4Addr;

use thiserror::Error;

use vpnrelay_core::error::CoreError;
use vpnrelay_core::protocol::{ipv4_source, ErrorCode, IpPacket, PacketType};

// ============================================
// Violation
// ============================================

/// Reason a received packet was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("unexpected error code {0}")]
    ErrorCode(ErrorCode),

    #[error("unexpected packet type {0}")]
    PacketType(PacketType),

    #[error("missing raw payload")]
    MissingPayload,

    #[error("no virtual address assigned")]
    AddressUnassigned,

    #[error("malformed payload: {0}")]
    Malformed(CoreError),

    #[error("source {actual} does not match virtual address {expected}")]
    SpoofedSource {
        expected: Ipv4Addr,
        actual: Ipv4Addr,
    },
}

impl Violation {
    /// Returns `true` for address-level violations (spoofing and friends).
    #[must_use]
    pub const fn is_address_violation(&self) -> bool {
        matches!(
            self,
            Self::AddressUnassigned | Self::Malformed(_) | Self::SpoofedSource { .. }
        )
    }
}

// ============================================
// PacketValidator
// ============================================

/// Checks packets received from a client.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketValidator {
    reply_on_all_violations: bool,
}

impl PacketValidator {
    /// Creates a validator.
    ///
    /// # Arguments
    /// * `reply_on_all_violations` - tell the peer about every rejection,
    ///   not only about bad error codes
    #[must_use]
    pub const fn new(reply_on_all_violations: bool) -> Self {
        Self {
            reply_on_all_violations,
        }
    }

    /// Validates a packet against the session's virtual address.
    ///
    /// # Errors
    /// Returns the first [`Violation`] found.
    pub fn validate(&self, packet: &IpPacket, vpn_ip: Option<Ipv4Addr>) -> Result<(), Violation> {
        if !packet.error_code.is_success() {
            return Err(Violation::ErrorCode(packet.error_code));
        }

        if packet.packet_type != PacketType::Raw {
            return Err(Violation::PacketType(packet.packet_type));
        }

        let raw = packet.raw_payload().ok_or(Violation::MissingPayload)?;

        let expected = vpn_ip.ok_or(Violation::AddressUnassigned)?;

        let actual = ipv4_source(raw).map_err(Violation::Malformed)?;
        if actual != expected {
            return Err(Violation::SpoofedSource { expected, actual });
        }

        Ok(())
    }

    /// Decides whether the peer gets an "unknown packet" reply.
    #[must_use]
    pub const fn should_reply(&self, violation: &Violation) -> bool {
        self.reply_on_all_violations || matches!(violation, Violation::ErrorCode(_))
    }
}

// ============================================
// Tests
// ============================================
