// ============================================
// File: crates/vpnrelay-server/src/services/queue.rs
// ============================================
//! # Session Queues
//!
//! Bounded `tokio::sync::mpsc` channels on both sides of the router:
//! - outbound: every session → router (many producers, one consumer)
//! - inbound: router → one session's writer (one producer, one consumer)
//!
//! A full queue makes its producer wait.

use tokio::sync::mpsc;

use vpnrelay_core::protocol::IpPacket;

use crate::config::RouterConfig;

/// Handle sessions push validated packets into.
pub type OutboundSender = mpsc::Sender<IpPacket>;

/// Router end of the outbound queue.
pub type OutboundReceiver = mpsc::Receiver<IpPacket>;

/// Router handle into one session's private queue.
pub type InboundSender = mpsc::Sender<IpPacket>;

/// Writer end of a session's private queue.
pub(crate) type InboundReceiver = mpsc::Receiver<IpPacket>;

/// Creates the queue shared by all sessions toward the router.
#[must_use]
pub fn outbound_channel(config: &RouterConfig) -> (OutboundSender, OutboundReceiver) {
    mpsc::channel(config.outbound_queue_capacity.max(1))
}

/// Creates a session's private queue.
pub(crate) fn inbound_channel(capacity: usize) -> (InboundSender, InboundReceiver) {
    mpsc::channel(capacity.max(1))
}
