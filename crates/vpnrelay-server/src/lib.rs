// ============================================
// File: crates/vpnrelay-server/src/lib.rs
// ============================================
//! # vpnrelay Server Library
//!
//! ## Creation Reason
//! Per-session packet relay engine of the tunnel server. For every
//! authenticated client stream it forwards validated packets to the router
//! and delivers the router's packets back to the client.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`config`]: Relay configuration management
//! - [`services`]: Client sessions and their tasks
//!   - [`services::session`]: `ClientSession`
//!   - [`services::shutdown`]: Shutdown coordination
//!   - [`services::queue`]: Router/session channels
//! - [`handlers`]: Packet validation
//! - [`error`]: Server-specific error types
//!
//! ## Data Flow
//! ```text
//! Client → stream → Reader → Validator → outbound queue → Router
//! Client ← stream ← Writer ← inbound queue ←────────────── Router
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The router, address allocation and credential verification live
//!   outside this crate
//! - Configuration changes require restart (no hot-reload)
//!
//! ## Last Modified
//! v0.1.0 - Initial server library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

// Re-export primary types
pub use config::RelayConfig;
pub use error::{Result, ServerError};
pub use services::{ClientSession, SessionExit, SessionState};
