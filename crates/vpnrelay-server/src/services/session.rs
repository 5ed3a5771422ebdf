// ============================================
// File: crates/vpnrelay-server/src/services/session.rs
// ============================================
//! # Client Session
//!
//! ## Creation Reason
//! One `ClientSession` exists per authenticated stream. It carries the
//! client's identity and addresses, and owns the two tasks that move
//! packets between the stream and the router.
//!
//! ## Main Functionality
//! - `ClientSession`: identity, addresses, credential, stream, queues
//! - `SessionStats`: lock-free traffic counters
//! - `ClientSession::run`: drives reader and writer until both return
//!
//! ## Session Lifecycle
//! ```text
//! ┌──────────┐   new()    ┌─────────┐  assign_vpn_ip()  ┌──────────┐
//! │  (none)  │ ─────────► │ Created │ ────────────────► │ Routable │
//! └──────────┘            └────┬────┘                   └────┬─────┘
//!                              │          run()              │
//!                              └──────────────┬──────────────┘
//!                                             ▼
//!                              Running ─► Stopping ─► Stopped
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - `vpn_ip` is set once; the router must not route to a session
//!   before `has_vpn_ip()` is true
//! - `origin_ip` is for logs only, never for routing
//! - The session keeps its own inbound sender, so the private queue
//!   stays open for the session's whole life
//!
//! ## Last Modified
//! v0.1.0 - Initial client session

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use vpnrelay_core::credential::Credential;
use vpnrelay_transport::PacketStream;

use crate::config::SessionConfig;
use crate::error::{Result, ServerError};
use crate::handlers::PacketValidator;
use crate::services::queue::{inbound_channel, InboundReceiver, InboundSender, OutboundSender};
use crate::services::reader::ReaderExit;
use crate::services::shutdown::{SessionState, ShutdownSignal};
use crate::services::writer::WriterExit;

/// Stream handle shared by a session's reader and writer.
pub type SharedStream = Arc<dyn PacketStream>;

// ============================================
// Session Statistics
// ============================================

/// Session traffic counters.
#[derive(Debug, Default)]
pub struct SessionStats {
    forwarded_packets: AtomicU64,
    forwarded_bytes: AtomicU64,
    delivered_packets: AtomicU64,
    delivered_bytes: AtomicU64,
    rejected_packets: AtomicU64,
}

impl SessionStats {
    /// Records a packet pushed to the router.
    pub fn record_forwarded(&self, bytes: usize) {
        self.forwarded_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.forwarded_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet written to the client.
    pub fn record_delivered(&self, bytes: usize) {
        self.delivered_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.delivered_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet that failed validation.
    pub fn record_rejected(&self) {
        self.rejected_packets.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            forwarded_packets: self.forwarded_packets.load(Ordering::Relaxed),
            forwarded_bytes: self.forwarded_bytes.load(Ordering::Relaxed),
            delivered_packets: self.delivered_packets.load(Ordering::Relaxed),
            delivered_bytes: self.delivered_bytes.load(Ordering::Relaxed),
            rejected_packets: self.rejected_packets.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Packets pushed to the router
    pub forwarded_packets: u64,
    /// Payload bytes pushed to the router
    pub forwarded_bytes: u64,
    /// Packets written to the client
    pub delivered_packets: u64,
    /// Payload bytes written to the client
    pub delivered_bytes: u64,
    /// Packets that failed validation
    pub rejected_packets: u64,
}

// ============================================
// Session Exit
// ============================================

/// How each task of a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExit {
    /// Reader outcome
    pub reader: ReaderExit,
    /// Writer outcome
    pub writer: WriterExit,
}

// ============================================
// ClientSession
// ============================================

/// Server-side state of one tunnel client.
pub struct ClientSession {
    user: String,
    origin_ip: IpAddr,
    vpn_ip: OnceLock<Ipv4Addr>,
    pub(crate) credential: Arc<Credential>,
    pub(crate) stream: SharedStream,
    pub(crate) shutdown: ShutdownSignal,
    pub(crate) outbound: OutboundSender,
    inbound_tx: InboundSender,
    pub(crate) inbound_rx: Mutex<Option<InboundReceiver>>,
    pub(crate) reader_started: AtomicBool,
    pub(crate) validator: PacketValidator,
    pub(crate) credential_check_interval: Duration,
    pub(crate) stats: SessionStats,
    created_at: Instant,
}

impl ClientSession {
    /// Creates a session for an accepted stream.
    ///
    /// # Arguments
    /// * `stream` - The client stream; `None` if the connection layer had none
    /// * `outbound` - Shared queue toward the router
    /// * `config` - Session settings
    ///
    /// # Errors
    /// - `InvalidParams` if `stream` is `None`
    /// - `InvalidContext` if the stream carries no origin address or credential
    /// - `ConfigInvalid` if `config` has a zero capacity or check interval
    pub fn new(
        stream: Option<SharedStream>,
        outbound: OutboundSender,
        config: &SessionConfig,
    ) -> Result<Self> {
        let stream = stream.ok_or(ServerError::InvalidParams {
            method: "ClientSession::new",
        })?;

        let context = stream.context();
        let origin_ip = context.origin_ip.ok_or(ServerError::InvalidContext {
            method: "ClientSession::new",
            missing: "origin_ip",
        })?;
        let credential = context.credential.ok_or(ServerError::InvalidContext {
            method: "ClientSession::new",
            missing: "credential",
        })?;

        config.validate()?;

        let (inbound_tx, inbound_rx) = inbound_channel(config.inbound_queue_capacity);
        let user = credential.audience().to_string();

        debug!(user = %user, origin_ip = %origin_ip, "Session created");

        Ok(Self {
            user,
            origin_ip,
            vpn_ip: OnceLock::new(),
            credential,
            stream,
            shutdown: ShutdownSignal::new(),
            outbound,
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            reader_started: AtomicBool::new(false),
            validator: PacketValidator::new(config.reply_on_all_violations),
            credential_check_interval: config.credential_check_interval(),
            stats: SessionStats::default(),
            created_at: Instant::now(),
        })
    }

    // ========================================
    // Identity and Addressing
    // ========================================

    /// Returns the user the credential was issued to.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub const fn origin_ip(&self) -> IpAddr {
        self.origin_ip
    }

    #[must_use]
    pub fn vpn_ip(&self) -> Option<Ipv4Addr> {
        self.vpn_ip.get().copied()
    }

    /// Returns `true` once a virtual address has been assigned.
    ///
    /// The router must not deliver to a session before this holds.
    #[must_use]
    pub fn has_vpn_ip(&self) -> bool {
        self.vpn_ip.get().is_some()
    }

    /// Assigns the session's virtual address.
    ///
    /// # Errors
    /// Returns `AddressAlreadyAssigned` if an address is already set.
    pub fn assign_vpn_ip(&self, vpn_ip: Ipv4Addr) -> Result<()> {
        self.vpn_ip
            .set(vpn_ip)
            .map_err(|requested| ServerError::AddressAlreadyAssigned {
                current: self.vpn_ip().unwrap_or(requested),
                requested,
            })?;

        info!(
            user = %self.user,
            origin_ip = %self.origin_ip,
            vpn_ip = %vpn_ip,
            "Virtual address assigned"
        );

        Ok(())
    }

    // ========================================
    // Queues and State
    // ========================================

    /// Returns a handle for delivering packets to this client.
    #[must_use]
    pub fn inbound_sender(&self) -> InboundSender {
        self.inbound_tx.clone()
    }

    #[must_use]
    pub const fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shutdown.state()
    }

    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.created_at.elapsed()
    }

    // ========================================
    // Driving
    // ========================================

    /// Runs the reader and writer concurrently until both have returned.
    pub async fn run(&self) -> SessionExit {
        info!(
            user = %self.user,
            origin_ip = %self.origin_ip,
            vpn_ip = ?self.vpn_ip(),
            "Session started"
        );

        let (reader, writer) = tokio::join!(self.process_reading(), self.process_writing());

        let stats = self.stats.snapshot();
        info!(
            user = %self.user,
            origin_ip = %self.origin_ip,
            vpn_ip = ?self.vpn_ip(),
            reader = ?reader,
            writer = ?writer,
            forwarded = stats.forwarded_packets,
            delivered = stats.delivered_packets,
            rejected = stats.rejected_packets,
            uptime_secs = self.uptime().as_secs(),
            "Session finished"
        );

        SessionExit { reader, writer }
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("user", &self.user)
            .field("origin_ip", &self.origin_ip)
            .field("vpn_ip", &self.vpn_ip())
            .field("state", &self.state())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use vpnrelay_core::credential::Claims;
    use vpnrelay_transport::{MockStream, StreamContext};

    fn context() -> StreamContext {
        StreamContext::new()
            .with_origin_ip("10.0.0.5".parse().unwrap())
            .with_credential(Credential::new(Claims::new("alice")))
    }

    fn session_with(ctx: StreamContext) -> Result<ClientSession> {
        let (tx, _rx) = mpsc::channel(8);
        let stream: SharedStream = Arc::new(MockStream::new(ctx));
        ClientSession::new(Some(stream), tx, &SessionConfig::default())
    }

    #[test]
    fn test_new_takes_user_from_audience() {
        let session = session_with(context()).unwrap();
        assert_eq!(session.user(), "alice");
        assert_eq!(session.origin_ip(), "10.0.0.5".parse::<IpAddr>().unwrap());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_new_without_stream() {
        let (tx, _rx) = mpsc::channel(8);
        let err = ClientSession::new(None, tx, &SessionConfig::default()).unwrap_err();
        assert!(matches!(err, ServerError::InvalidParams { .. }));
    }

    #[test]
    fn test_new_without_origin() {
        let ctx = StreamContext::new().with_credential(Credential::new(Claims::new("alice")));
        let err = session_with(ctx).unwrap_err();
        assert!(matches!(
            err,
            ServerError::InvalidContext {
                missing: "origin_ip",
                ..
            }
        ));
    }

    #[test]
    fn test_new_without_credential() {
        let ctx = StreamContext::new().with_origin_ip("10.0.0.5".parse().unwrap());
        let err = session_with(ctx).unwrap_err();
        assert!(matches!(
            err,
            ServerError::InvalidContext {
                missing: "credential",
                ..
            }
        ));
    }

    #[test]
    fn test_new_rejects_zero_check_interval() {
        let (tx, _rx) = mpsc::channel(8);
        let stream: SharedStream = Arc::new(MockStream::new(context()));
        let config = SessionConfig {
            credential_check_interval_secs: 0,
            ..SessionConfig::default()
        };

        let err = ClientSession::new(Some(stream), tx, &config).unwrap_err();
        assert!(matches!(
            err,
            ServerError::ConfigInvalid { ref field, .. } if field == "session.credential_check_interval_secs"
        ));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_new_rejects_zero_inbound_capacity() {
        let (tx, _rx) = mpsc::channel(8);
        let stream: SharedStream = Arc::new(MockStream::new(context()));
        let config = SessionConfig {
            inbound_queue_capacity: 0,
            ..SessionConfig::default()
        };

        let err = ClientSession::new(Some(stream), tx, &config).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_vpn_ip_assigned_once() {
        let session = session_with(context()).unwrap();
        assert!(!session.has_vpn_ip());
        assert_eq!(session.vpn_ip(), None);

        session.assign_vpn_ip(Ipv4Addr::new(10, 8, 0, 2)).unwrap();
        assert!(session.has_vpn_ip());

        let err = session.assign_vpn_ip(Ipv4Addr::new(10, 8, 0, 3)).unwrap_err();
        assert!(matches!(
            err,
            ServerError::AddressAlreadyAssigned {
                current,
                requested,
            } if current == Ipv4Addr::new(10, 8, 0, 2) && requested == Ipv4Addr::new(10, 8, 0, 3)
        ));
        assert_eq!(session.vpn_ip(), Some(Ipv4Addr::new(10, 8, 0, 2)));
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = SessionStats::default();
        stats.record_forwarded(100);
        stats.record_forwarded(20);
        stats.record_delivered(60);
        stats.record_rejected();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.forwarded_packets, 2);
        assert_eq!(snapshot.forwarded_bytes, 120);
        assert_eq!(snapshot.delivered_packets, 1);
        assert_eq!(snapshot.delivered_bytes, 60);
        assert_eq!(snapshot.rejected_packets, 1);
    }
}
