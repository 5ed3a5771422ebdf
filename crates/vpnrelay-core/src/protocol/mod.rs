// ============================================
// File: crates/vpnrelay-core/src/protocol/mod.rs
// ============================================
//! # Tunnel Protocol
//!
//! ## Main Functionality
//! - [`messages`]: the `IpPacket` message exchanged on a session stream
//! - [`ipv4`]: read-only helpers over raw IPv4 datagrams
//!
//! ## Message Shape
//! ```text
//! ┌────────────┬─────────────┬───────────────────────────────┐
//! │ error_code │ packet_type │ payload (raw IPv4 datagram)   │
//! └────────────┴─────────────┴───────────────────────────────┘
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial protocol module

pub mod ipv4;
pub mod messages;

pub use ipv4::ipv4_source;
pub use messages::{ErrorCode, IpPacket, PacketType};
