// ============================================
// File: crates/vpnrelay-server/src/services/reader.rs
// ============================================
//! # Reader Task
//!
//! ## Main Functionality
//! Drains the client stream, validates every message and forwards the
//! accepted ones to the router queue in receive order.
//!
//! ## Termination
//! Any of these ends the loop:
//! - end of stream or receive error
//! - a validation failure (at most one "unknown packet" reply first)
//! - the router queue closing
//! - the writer stopping the session
//!
//! On the way out the reader clears the running flag and hands the writer
//! its exit notification.
//!
//! ## Last Modified
//! v0.1.0 - Initial reader task

use std::sync::atomic::Ordering;

use tracing::{debug, error, trace, warn};

use vpnrelay_core::protocol::{ErrorCode, IpPacket};
use vpnrelay_transport::TransportError;

use crate::handlers::Violation;
use crate::services::session::ClientSession;

/// Why the reader returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderExit {
    /// The client closed the stream.
    EndOfStream,
    /// Receiving from the stream failed.
    ReceiveFailed(TransportError),
    /// A packet failed validation.
    Violation(Violation),
    /// The router queue is closed.
    RouterClosed,
    /// The session was stopped by the writer.
    Stopped,
    /// Another reader already owns the stream.
    AlreadyStarted,
}

impl ClientSession {
    /// Runs the reading loop until the session ends.
    ///
    /// Never fails; every terminal condition is folded into the returned
    /// [`ReaderExit`]. Only one reader may run per session; a second call
    /// returns [`ReaderExit::AlreadyStarted`] without touching the session.
    pub async fn process_reading(&self) -> ReaderExit {
        if self.reader_started.swap(true, Ordering::AcqRel) {
            warn!(user = %self.user(), "Reader already started");
            return ReaderExit::AlreadyStarted;
        }

        let exit = self.read_loop().await;

        self.shutdown.stop();
        if self.shutdown.notify_exit() {
            debug!(user = %self.user(), "Exit signal sent to writer");
        }
        self.shutdown.task_finished();

        debug!(user = %self.user(), reason = ?exit, "Reader stopped");
        exit
    }

    async fn read_loop(&self) -> ReaderExit {
        loop {
            if !self.shutdown.is_running() {
                return ReaderExit::Stopped;
            }

            let received = tokio::select! {
                received = self.stream.recv() => received,
                () = self.shutdown.stopped() => return ReaderExit::Stopped,
            };

            let packet = match received {
                Ok(Some(packet)) => packet,
                Ok(None) => {
                    debug!(user = %self.user(), origin_ip = %self.origin_ip(), "Stream closed by client");
                    return ReaderExit::EndOfStream;
                }
                Err(e) => {
                    error!(
                        user = %self.user(),
                        origin_ip = %self.origin_ip(),
                        error = %e,
                        "Failed to receive from client"
                    );
                    return ReaderExit::ReceiveFailed(e);
                }
            };

            if let Err(violation) = self.validator.validate(&packet, self.vpn_ip()) {
                self.reject(&violation).await;
                return ReaderExit::Violation(violation);
            }

            let len = packet.payload_len();
            tokio::select! {
                sent = self.outbound.send(packet) => {
                    if sent.is_err() {
                        warn!(user = %self.user(), "Router queue closed");
                        return ReaderExit::RouterClosed;
                    }
                }
                () = self.shutdown.stopped() => return ReaderExit::Stopped,
            }

            self.stats.record_forwarded(len);
            trace!(user = %self.user(), len, "Packet forwarded to router");
        }
    }

    async fn reject(&self, violation: &Violation) {
        self.stats.record_rejected();

        warn!(
            user = %self.user(),
            origin_ip = %self.origin_ip(),
            vpn_ip = ?self.vpn_ip(),
            violation = %violation,
            address = violation.is_address_violation(),
            "Packet rejected"
        );

        if self.validator.should_reply(violation) {
            if let Err(e) = self.stream.send(IpPacket::error(ErrorCode::Unknown)).await {
                error!(user = %self.user(), error = %e, "Failed to send unknown packet reply");
            }
        }
    }
}
