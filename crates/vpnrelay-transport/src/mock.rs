// ============================================
// File: crates/vpnrelay-transport/src/mock.rs
// ============================================
//! # Mock Packet Stream
//!
//! ## Creation Reason
//! Provides an in-memory `PacketStream` so session behaviour can be
//! tested without a network or a connection layer.
//!
//! ## Main Functionality
//! - Scripted incoming messages, errors and end of stream
//! - Capture of everything the session sends
//! - Switchable send failures
//!
//! ## ⚠️ Important Note for Next Developer
//! - Test-only; compiled under `cfg(test)` or the `mock` feature
//! - `recv` is cancel-safe: nothing is popped across an await point
//!
//! ## Last Modified
//! v0.1.0 - Initial mock implementation

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use vpnrelay_core::protocol::IpPacket;

use crate::error::{Result, TransportError};
use crate::traits::{PacketStream, StreamContext};

/// Scripted item returned by `recv`.
#[derive(Debug)]
enum Incoming {
    Packet(IpPacket),
    Error(TransportError),
}

// ============================================
// MockStream
// ============================================

/// In-memory stream for testing.
pub struct MockStream {
    context: StreamContext,
    /// Items waiting to be received
    incoming: Mutex<VecDeque<Incoming>>,
    /// Packets the session sent
    sent: Mutex<Vec<IpPacket>>,
    /// End of stream once `incoming` drains
    closed: AtomicBool,
    /// When set, every `send` fails
    fail_sends: AtomicBool,
    /// Completed `recv` calls that yielded a packet
    received: AtomicUsize,
    /// Attempted `send` calls, failed ones included
    send_attempts: AtomicUsize,
    recv_notify: Notify,
    sent_notify: Notify,
}

impl MockStream {
    /// Creates a mock stream carrying `context`.
    #[must_use]
    pub fn new(context: StreamContext) -> Self {
        Self {
            context,
            incoming: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            received: AtomicUsize::new(0),
            send_attempts: AtomicUsize::new(0),
            recv_notify: Notify::new(),
            sent_notify: Notify::new(),
        }
    }

    /// Queues a packet for the next `recv`.
    pub fn inject_packet(&self, packet: IpPacket) {
        self.push(Incoming::Packet(packet));
    }

    /// Queues a receive failure.
    pub fn inject_error(&self, reason: impl Into<String>) {
        self.push(Incoming::Error(TransportError::receive_failed(reason)));
    }

    /// Ends the stream once queued items are drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.recv_notify.notify_one();
    }

    /// Makes subsequent sends fail (or succeed again).
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::Release);
    }

    /// Returns a copy of every packet sent so far.
    #[must_use]
    pub fn sent_packets(&self) -> Vec<IpPacket> {
        self.sent.lock().clone()
    }

    /// Returns the number of packets received by the session.
    #[must_use]
    pub fn received_count(&self) -> usize {
        self.received.load(Ordering::Acquire)
    }

    /// Returns the number of send attempts, including failed ones.
    #[must_use]
    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::Acquire)
    }

    /// Returns the number of items still queued for `recv`.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.incoming.lock().len()
    }

    /// Waits until at least `count` packets have been sent successfully.
    pub async fn wait_for_sent(&self, count: usize) {
        loop {
            let notified = self.sent_notify.notified();
            if self.sent.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn push(&self, item: Incoming) {
        self.incoming.lock().push_back(item);
        self.recv_notify.notify_one();
    }
}

#[async_trait]
impl PacketStream for MockStream {
    async fn recv(&self) -> Result<Option<IpPacket>> {
        loop {
            {
                let mut queue = self.incoming.lock();
                match queue.pop_front() {
                    Some(Incoming::Packet(packet)) => {
                        self.received.fetch_add(1, Ordering::AcqRel);
                        return Ok(Some(packet));
                    }
                    Some(Incoming::Error(err)) => return Err(err),
                    None if self.closed.load(Ordering::Acquire) => return Ok(None),
                    None => {}
                }
            }

            self.recv_notify.notified().await;
        }
    }

    async fn send(&self, packet: IpPacket) -> Result<()> {
        self.send_attempts.fetch_add(1, Ordering::AcqRel);

        if self.fail_sends.load(Ordering::Acquire) {
            return Err(TransportError::send_failed("mock send failure"));
        }

        self.sent.lock().push(packet);
        self.sent_notify.notify_waiters();
        Ok(())
    }

    fn context(&self) -> StreamContext {
        self.context.clone()
    }
}

impl std::fmt::Debug for MockStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStream")
            .field("pending", &self.pending_count())
            .field("sent", &self.sent.lock().len())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl Default for MockStream {
    fn default() -> Self {
        Self::new(StreamContext::default())
    }
}
