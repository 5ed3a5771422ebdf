// ============================================
// File: crates/vpnrelay-core/src/lib.rs
// ============================================
//! # vpnrelay Core - Packet and Credential Model
//!
//! ## Creation Reason
//! Holds the data types every other vpnrelay crate agrees on: the tunnel
//! packet message, the helpers that look inside a raw IPv4 datagram, and
//! the parsed credential whose validity window bounds a session's life.
//!
//! ## Main Functionality
//! - [`protocol`]: `IpPacket`, `ErrorCode`, `PacketType`, IPv4 source extraction
//! - [`credential`]: credential claims and time-based validity check
//! - [`time`]: unix timestamp helper
//! - [`error`]: `CoreError`
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              vpnrelay-server                        │
//! │                    │                                │
//! │                    ▼                                │
//! │            vpnrelay-transport                       │
//! │                    │                                │
//! │                    ▼                                │
//! │             vpnrelay-core  ◄── You are here         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - No token signing or parsing lives here; callers hand us parsed claims
//! - Packet parsing stops at the IPv4 source address
//!
//! ## Last Modified
//! v0.1.0 - Initial core types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod credential;
pub mod error;
pub mod protocol;
pub mod time;

pub use credential::{Claims, Credential};
pub use error::{CoreError, Result};
pub use protocol::{ErrorCode, IpPacket, PacketType};
pub use time::Timestamp;
