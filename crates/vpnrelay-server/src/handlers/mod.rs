// ============================================
// File: crates/vpnrelay-server/src/handlers/mod.rs
// ============================================
//! # Packet Handlers
//!
//! ## Main Functionality
//! - [`validator`]: per-packet checks applied before anything reaches the router
//!
//! ## Last Modified
//! v0.1.0 - Initial handlers structure

pub mod validator;

pub use validator::{PacketValidator, Violation};
