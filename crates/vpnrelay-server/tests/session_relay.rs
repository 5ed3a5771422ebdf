// ============================================
// File: crates/vpnrelay-server/tests/session_relay.rs
// ============================================
//! Session relay scenarios driven through `MockStream`.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use vpnrelay_core::error::CoreError;
use vpnrelay_core::protocol::ipv4::build_ipv4_header;
use vpnrelay_core::{Claims, Credential, ErrorCode, IpPacket, PacketType, Timestamp};
use vpnrelay_server::config::{RouterConfig, SessionConfig};
use vpnrelay_server::handlers::Violation;
use vpnrelay_server::services::{
    outbound_channel, ClientSession, OutboundReceiver, ReaderExit, SessionExit, SessionState,
    SharedStream, WriterExit,
};
use vpnrelay_transport::{MockStream, StreamContext};

const VPN_IP: Ipv4Addr = Ipv4Addr::new(10, 8, 0, 2);
const SPOOFED_IP: Ipv4Addr = Ipv4Addr::new(10, 8, 0, 3);
const REMOTE_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
const DEADLINE: Duration = Duration::from_secs(5);

// ============================================
// Harness
// ============================================

struct Harness {
    session: Arc<ClientSession>,
    stream: Arc<MockStream>,
    router: OutboundReceiver,
}

impl Harness {
    fn new() -> Self {
        Self::with(valid_credential(), &SessionConfig::default(), &RouterConfig::default())
    }

    fn with(credential: Credential, session: &SessionConfig, router: &RouterConfig) -> Self {
        let context = StreamContext::new()
            .with_origin_ip("10.0.0.5".parse().unwrap())
            .with_credential(credential);
        let stream = Arc::new(MockStream::new(context));
        let shared: SharedStream = stream.clone();

        let (outbound, router) = outbound_channel(router);
        let session = ClientSession::new(Some(shared), outbound, session).unwrap();
        session.assign_vpn_ip(VPN_IP).unwrap();

        Self {
            session: Arc::new(session),
            stream,
            router,
        }
    }

    fn spawn(&self) -> JoinHandle<SessionExit> {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move { session.run().await })
    }

    fn forwarded(&mut self) -> Vec<IpPacket> {
        let mut packets = Vec::new();
        while let Ok(packet) = self.router.try_recv() {
            packets.push(packet);
        }
        packets
    }
}

async fn finish(handle: JoinHandle<SessionExit>) -> SessionExit {
    timeout(DEADLINE, handle)
        .await
        .expect("session did not finish in time")
        .unwrap()
}

fn valid_credential() -> Credential {
    Credential::new(Claims::new("alice").with_expires_at(Timestamp::now().add_secs(3600)))
}

fn expired_credential() -> Credential {
    Credential::new(Claims::new("alice").with_expires_at(Timestamp::now().add_secs(-60)))
}

fn packet_from(src: Ipv4Addr) -> IpPacket {
    IpPacket::raw(build_ipv4_header(src, REMOTE_IP))
}

fn packet_to(dst: Ipv4Addr) -> IpPacket {
    IpPacket::raw(build_ipv4_header(VPN_IP, dst))
}

fn writer_followed(exit: &WriterExit) -> bool {
    matches!(exit, WriterExit::ExitSignal | WriterExit::Stopped)
}

// ============================================
// End-to-End Scenarios
// ============================================

#[tokio::test]
async fn test_forwards_valid_then_stops_on_spoofed_source() {
    let mut harness = Harness::new();
    let good = packet_from(VPN_IP);
    harness.stream.inject_packet(good.clone());
    harness.stream.inject_packet(packet_from(SPOOFED_IP));
    harness.stream.inject_packet(packet_from(VPN_IP));

    let exit = finish(harness.spawn()).await;

    assert_eq!(
        exit.reader,
        ReaderExit::Violation(Violation::SpoofedSource {
            expected: VPN_IP,
            actual: SPOOFED_IP,
        })
    );
    assert!(writer_followed(&exit.writer));

    assert_eq!(harness.forwarded(), vec![good]);
    assert!(harness.stream.sent_packets().is_empty());
    assert_eq!(harness.stream.pending_count(), 1);
    assert_eq!(harness.session.state(), SessionState::Stopped);

    let stats = harness.session.stats().snapshot();
    assert_eq!(stats.forwarded_packets, 1);
    assert_eq!(stats.forwarded_bytes, 20);
    assert_eq!(stats.rejected_packets, 1);
}

#[tokio::test]
async fn test_unknown_error_code_gets_single_reply() {
    let mut harness = Harness::new();
    harness.stream.inject_packet(IpPacket {
        error_code: ErrorCode::Unknown,
        ..packet_from(VPN_IP)
    });
    harness.stream.inject_packet(packet_from(VPN_IP));

    let exit = finish(harness.spawn()).await;

    assert_eq!(
        exit.reader,
        ReaderExit::Violation(Violation::ErrorCode(ErrorCode::Unknown))
    );
    assert_eq!(
        harness.stream.sent_packets(),
        vec![IpPacket::error(ErrorCode::Unknown)]
    );
    assert!(harness.forwarded().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_expired_credential_replies_once_and_stops() {
    let harness = Harness::with(
        expired_credential(),
        &SessionConfig::default(),
        &RouterConfig::default(),
    );
    let handle = harness.spawn();

    // No check before the first full interval.
    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(harness.session.state(), SessionState::Running);
    assert!(harness.stream.sent_packets().is_empty());

    let exit = timeout(Duration::from_secs(600), handle)
        .await
        .expect("session did not finish in time")
        .unwrap();

    assert!(matches!(
        exit.writer,
        WriterExit::CredentialExpired(CoreError::CredentialExpired { .. })
    ));
    assert_eq!(exit.reader, ReaderExit::Stopped);

    let reply = IpPacket::error(ErrorCode::ExpiredCredential);
    assert_eq!(reply.packet_type, PacketType::Unknown);
    assert_eq!(harness.stream.sent_packets(), vec![reply]);

    harness.stream.inject_packet(packet_from(VPN_IP));
    tokio::task::yield_now().await;
    assert_eq!(harness.stream.received_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_credential_stops_even_if_reply_fails() {
    let harness = Harness::with(
        expired_credential(),
        &SessionConfig::default(),
        &RouterConfig::default(),
    );
    harness.stream.set_fail_sends(true);

    let exit = timeout(Duration::from_secs(600), harness.spawn())
        .await
        .expect("session did not finish in time")
        .unwrap();

    assert!(matches!(exit.writer, WriterExit::CredentialExpired(_)));
    assert_eq!(exit.reader, ReaderExit::Stopped);
    assert_eq!(harness.stream.send_attempts(), 1);
    assert!(harness.stream.sent_packets().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_valid_credential_survives_checks() {
    let config = SessionConfig {
        credential_check_interval_secs: 10,
        ..SessionConfig::default()
    };
    let harness = Harness::with(valid_credential(), &config, &RouterConfig::default());
    let handle = harness.spawn();

    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(harness.session.state(), SessionState::Running);

    harness.stream.close();
    let exit = finish(handle).await;
    assert_eq!(exit.reader, ReaderExit::EndOfStream);
    assert!(writer_followed(&exit.writer));
}

// ============================================
// Forwarding and Delivery
// ============================================

#[tokio::test]
async fn test_forwards_in_receive_order() {
    let mut harness = Harness::new();
    let packets: Vec<IpPacket> = (1..=5)
        .map(|i| packet_to(Ipv4Addr::new(192, 168, 1, i)))
        .collect();
    for packet in &packets {
        harness.stream.inject_packet(packet.clone());
    }
    harness.stream.close();

    let exit = finish(harness.spawn()).await;

    assert_eq!(exit.reader, ReaderExit::EndOfStream);
    assert_eq!(harness.forwarded(), packets);
    assert_eq!(harness.session.stats().snapshot().forwarded_packets, 5);
}

#[tokio::test]
async fn test_delivers_router_packets_in_queue_order() {
    let harness = Harness::new();
    let handle = harness.spawn();

    let inbound = harness.session.inbound_sender();
    let packets: Vec<IpPacket> = (1..=3)
        .map(|i| IpPacket::raw(build_ipv4_header(Ipv4Addr::new(1, 1, 1, i), VPN_IP)))
        .collect();
    for packet in &packets {
        inbound.send(packet.clone()).await.unwrap();
    }

    timeout(DEADLINE, harness.stream.wait_for_sent(3))
        .await
        .expect("packets not delivered");
    assert_eq!(harness.stream.sent_packets(), packets);

    harness.stream.close();
    let exit = finish(handle).await;
    assert_eq!(exit.reader, ReaderExit::EndOfStream);
    assert!(writer_followed(&exit.writer));

    let stats = harness.session.stats().snapshot();
    assert_eq!(stats.delivered_packets, 3);
    assert_eq!(stats.delivered_bytes, 60);
}

// ============================================
// Rejections
// ============================================

#[tokio::test]
async fn test_every_rejection_forwards_nothing() {
    let cases = vec![
        (
            IpPacket {
                error_code: ErrorCode::ExpiredCredential,
                ..packet_from(VPN_IP)
            },
            Violation::ErrorCode(ErrorCode::ExpiredCredential),
        ),
        (
            IpPacket {
                packet_type: PacketType::Unknown,
                ..packet_from(VPN_IP)
            },
            Violation::PacketType(PacketType::Unknown),
        ),
        (IpPacket::raw(Vec::new()), Violation::MissingPayload),
        (
            IpPacket {
                payload: None,
                ..IpPacket::raw(Vec::new())
            },
            Violation::MissingPayload,
        ),
        (
            packet_from(SPOOFED_IP),
            Violation::SpoofedSource {
                expected: VPN_IP,
                actual: SPOOFED_IP,
            },
        ),
        (
            IpPacket::raw(vec![0x45, 0, 0]),
            Violation::Malformed(CoreError::PacketTooShort {
                required: 20,
                actual: 3,
            }),
        ),
    ];

    for (packet, expected) in cases {
        let mut harness = Harness::new();
        harness.stream.inject_packet(packet);
        harness.stream.inject_packet(packet_from(VPN_IP));

        let exit = finish(harness.spawn()).await;

        assert_eq!(exit.reader, ReaderExit::Violation(expected.clone()));
        assert!(harness.forwarded().is_empty(), "forwarded after {expected}");
        assert_eq!(harness.session.stats().snapshot().rejected_packets, 1);
        assert_eq!(harness.stream.pending_count(), 1);
    }
}

#[tokio::test]
async fn test_no_reply_for_address_violation_by_default() {
    let harness = Harness::new();
    harness.stream.inject_packet(packet_from(SPOOFED_IP));

    finish(harness.spawn()).await;

    assert!(harness.stream.sent_packets().is_empty());
}

#[tokio::test]
async fn test_reply_on_all_violations() {
    let config = SessionConfig {
        reply_on_all_violations: true,
        ..SessionConfig::default()
    };
    let harness = Harness::with(valid_credential(), &config, &RouterConfig::default());
    harness.stream.inject_packet(packet_from(SPOOFED_IP));

    finish(harness.spawn()).await;

    assert_eq!(
        harness.stream.sent_packets(),
        vec![IpPacket::error(ErrorCode::Unknown)]
    );
}

#[tokio::test]
async fn test_unassigned_session_forwards_nothing() {
    let context = StreamContext::new()
        .with_origin_ip("10.0.0.5".parse().unwrap())
        .with_credential(valid_credential());
    let stream = Arc::new(MockStream::new(context));
    let shared: SharedStream = stream.clone();
    let (outbound, mut router) = outbound_channel(&RouterConfig::default());
    let session = ClientSession::new(Some(shared), outbound, &SessionConfig::default()).unwrap();

    assert!(!session.has_vpn_ip());
    stream.inject_packet(packet_from(VPN_IP));

    let exit = timeout(DEADLINE, session.run()).await.unwrap();

    assert_eq!(exit.reader, ReaderExit::Violation(Violation::AddressUnassigned));
    assert!(matches!(router.try_recv(), Err(TryRecvError::Empty)));
}

// ============================================
// Termination
// ============================================

#[tokio::test]
async fn test_receive_error_stops_both_tasks() {
    let harness = Harness::new();
    harness.stream.inject_error("connection reset");

    let exit = finish(harness.spawn()).await;

    assert!(matches!(exit.reader, ReaderExit::ReceiveFailed(_)));
    assert!(writer_followed(&exit.writer));
    assert_eq!(harness.session.state(), SessionState::Stopped);
}

#[tokio::test]
async fn test_writer_send_failure_stops_reader() {
    let harness = Harness::new();
    harness.stream.set_fail_sends(true);
    let handle = harness.spawn();

    harness
        .session
        .inbound_sender()
        .send(packet_to(REMOTE_IP))
        .await
        .unwrap();

    let exit = finish(handle).await;

    assert!(matches!(exit.writer, WriterExit::SendFailed(_)));
    assert_eq!(exit.reader, ReaderExit::Stopped);
    assert_eq!(harness.session.state(), SessionState::Stopped);
}

#[tokio::test]
async fn test_router_closed_stops_session() {
    let harness = Harness::new();
    let Harness {
        session,
        stream,
        router,
    } = harness;
    drop(router);
    stream.inject_packet(packet_from(VPN_IP));

    let exit = timeout(DEADLINE, session.run()).await.unwrap();

    assert_eq!(exit.reader, ReaderExit::RouterClosed);
    assert_eq!(session.stats().snapshot().forwarded_packets, 0);
}

#[tokio::test]
async fn test_backpressure_released_by_stop() {
    let mut harness = Harness::with(
        valid_credential(),
        &SessionConfig::default(),
        &RouterConfig {
            outbound_queue_capacity: 1,
        },
    );
    for _ in 0..3 {
        harness.stream.inject_packet(packet_from(VPN_IP));
    }
    let handle = harness.spawn();

    // The second packet is read but cannot be queued.
    timeout(DEADLINE, async {
        while harness.stream.received_count() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("reader did not block on the full queue");
    assert_eq!(harness.session.state(), SessionState::Running);

    harness.stream.set_fail_sends(true);
    harness
        .session
        .inbound_sender()
        .send(packet_to(REMOTE_IP))
        .await
        .unwrap();

    let exit = finish(handle).await;

    assert_eq!(exit.reader, ReaderExit::Stopped);
    assert_eq!(harness.forwarded().len(), 1);
    assert_eq!(harness.session.stats().snapshot().forwarded_packets, 1);
    assert_eq!(harness.stream.pending_count(), 1);
}

#[tokio::test]
async fn test_second_writer_is_refused() {
    let harness = Harness::new();
    harness.stream.close();

    finish(harness.spawn()).await;
    assert_eq!(harness.session.state(), SessionState::Stopped);

    let again = harness.session.process_writing().await;
    assert_eq!(again, WriterExit::AlreadyStarted);
    assert_eq!(harness.session.state(), SessionState::Stopped);
}

#[tokio::test]
async fn test_second_reader_is_refused() {
    let harness = Harness::new();
    harness.stream.close();

    let first = timeout(DEADLINE, harness.session.process_reading())
        .await
        .unwrap();
    assert_eq!(first, ReaderExit::EndOfStream);

    let again = harness.session.process_reading().await;
    assert_eq!(again, ReaderExit::AlreadyStarted);

    // The writer has not returned yet.
    assert_eq!(harness.session.state(), SessionState::Stopping);
}

#[tokio::test]
async fn test_zero_check_interval_is_rejected_at_construction() {
    let stream: SharedStream = Arc::new(MockStream::new(
        StreamContext::new()
            .with_origin_ip("10.0.0.5".parse().unwrap())
            .with_credential(valid_credential()),
    ));
    let (outbound, _router) = outbound_channel(&RouterConfig::default());
    let config = SessionConfig {
        credential_check_interval_secs: 0,
        ..SessionConfig::default()
    };

    let err = ClientSession::new(Some(stream), outbound, &config).unwrap_err();
    assert!(err.is_config_error());
}
