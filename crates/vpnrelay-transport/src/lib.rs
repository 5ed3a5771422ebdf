// ============================================
// File: crates/vpnrelay-transport/src/lib.rs
// ============================================
//! # vpnrelay Transport - Session Stream Abstraction
//!
//! ## Creation Reason
//! Sessions never see the wire. Whatever carries tunnel messages (an RPC
//! stream, a multiplexed connection, an in-memory pipe in tests) is
//! presented to them through the [`PacketStream`] trait.
//!
//! ## Main Functionality
//! - [`traits`]: `PacketStream` and the `StreamContext` resolved at accept time
//! - [`error`]: `TransportError`
//! - `mock`: in-memory stream for tests (feature `mock`)
//!
//! ## ⚠️ Important Note for Next Developer
//! - `recv` and `send` are called concurrently from two tasks
//! - `recv` must be cancel-safe: a dropped call must not lose a message
//!
//! ## Last Modified
//! v0.1.0 - Initial stream abstraction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{Result, TransportError};
pub use traits::{PacketStream, StreamContext};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockStream;
