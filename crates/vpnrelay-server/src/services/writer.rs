// ============================================
// File: crates/vpnrelay-server/src/services/writer.rs
// ============================================
//! # Writer Task
//!
//! ## Main Functionality
//! Waits on the first of:
//! 1. a packet on the session's private queue → write it to the client
//! 2. the reader's exit notification → stop
//! 3. the credential check tick → stop with an "expired credential"
//!    reply if the credential is no longer valid
//!
//! ## ⚠️ Important Note for Next Developer
//! - The first check fires one full interval after start
//! - Missed ticks are skipped, never bursted
//! - The expiry reply is best effort; a failed send still ends the session
//! - The writer stops the session but never sends the exit notification
//!
//! ## Last Modified
//! v0.1.0 - Initial writer task

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, trace, warn};

use vpnrelay_core::error::CoreError;
use vpnrelay_core::protocol::{ErrorCode, IpPacket};
use vpnrelay_transport::TransportError;

use crate::services::queue::InboundReceiver;
use crate::services::session::ClientSession;

/// Why the writer returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterExit {
    /// Writing to the stream failed.
    SendFailed(TransportError),
    /// The reader signalled exit.
    ExitSignal,
    /// The credential is no longer valid.
    CredentialExpired(CoreError),
    /// The session was already stopped.
    Stopped,
    /// Another writer already owns the private queue.
    AlreadyStarted,
}

impl ClientSession {
    /// Runs the writing loop until the session ends.
    ///
    /// Only one writer may run per session; a second call returns
    /// [`WriterExit::AlreadyStarted`] without touching the session.
    pub async fn process_writing(&self) -> WriterExit {
        let inbound = self.inbound_rx.lock().take();
        let Some(mut inbound) = inbound else {
            warn!(user = %self.user(), "Writer already started");
            return WriterExit::AlreadyStarted;
        };

        let exit = self.write_loop(&mut inbound).await;

        self.shutdown.stop();
        self.shutdown.task_finished();

        debug!(user = %self.user(), reason = ?exit, "Writer stopped");
        exit
    }

    async fn write_loop(&self, inbound: &mut InboundReceiver) -> WriterExit {
        let period = self.credential_check_interval;
        let mut checker = interval_at(Instant::now() + period, period);
        checker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if !self.shutdown.is_running() {
                return WriterExit::Stopped;
            }

            tokio::select! {
                Some(packet) = inbound.recv() => {
                    let len = packet.payload_len();
                    if let Err(e) = self.stream.send(packet).await {
                        error!(
                            user = %self.user(),
                            origin_ip = %self.origin_ip(),
                            error = %e,
                            "Failed to send to client"
                        );
                        return WriterExit::SendFailed(e);
                    }
                    self.stats.record_delivered(len);
                    trace!(user = %self.user(), len, "Packet delivered to client");
                }
                () = self.shutdown.exit_notified() => {
                    debug!(user = %self.user(), "Exit signal received");
                    return WriterExit::ExitSignal;
                }
                _ = checker.tick() => {
                    if let Err(reason) = self.credential.validate() {
                        self.expire(&reason).await;
                        return WriterExit::CredentialExpired(reason);
                    }
                    trace!(user = %self.user(), "Credential still valid");
                }
            }
        }
    }

    async fn expire(&self, reason: &CoreError) {
        warn!(
            user = %self.user(),
            origin_ip = %self.origin_ip(),
            vpn_ip = ?self.vpn_ip(),
            reason = %reason,
            "Credential no longer valid"
        );

        if let Err(e) = self
            .stream
            .send(IpPacket::error(ErrorCode::ExpiredCredential))
            .await
        {
            error!(user = %self.user(), error = %e, "Failed to send expired credential reply");
        }
    }
}
