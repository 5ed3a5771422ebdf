// ============================================
// File: crates/vpnrelay-core/src/protocol/ipv4.rs
// ============================================
//! # IPv4 Header Helpers
//!
//! Only the fields the relay needs are read; nothing is rewritten.

use std::net::Ipv4Addr;

use crate::error::{CoreError, Result};

/// Minimum IPv4 header size.
pub const IPV4_HEADER_MIN_SIZE: usize = 20;

/// Offset of source IP in IPv4 header.
const IPV4_SRC_OFFSET: usize = 12;

/// Offset of destination IP in IPv4 header.
#[cfg(any(test, feature = "mock"))]
const IPV4_DST_OFFSET: usize = 16;

/// Extracts the source address of an IPv4 datagram.
///
/// # Errors
/// - `PacketTooShort` if the header is truncated
/// - `NotIpv4` if the version nibble is not 4
pub fn ipv4_source(packet: &[u8]) -> Result<Ipv4Addr> {
    if packet.len() < IPV4_HEADER_MIN_SIZE {
        return Err(CoreError::PacketTooShort {
            required: IPV4_HEADER_MIN_SIZE,
            actual: packet.len(),
        });
    }

    let version = packet[0] >> 4;
    if version != 4 {
        return Err(CoreError::NotIpv4 { version });
    }

    let mut octets = [0u8; 4];
    octets.copy_from_slice(&packet[IPV4_SRC_OFFSET..IPV4_SRC_OFFSET + 4]);
    Ok(Ipv4Addr::from(octets))
}

/// Builds a minimal 20-byte IPv4 header for tests.
#[cfg(any(test, feature = "mock"))]
#[must_use]
pub fn build_ipv4_header(src: Ipv4Addr, dst: Ipv4Addr) -> Vec<u8> {
    let mut packet = vec![0u8; IPV4_HEADER_MIN_SIZE];
    packet[0] = 0x45; // Version 4, IHL 5
    packet[3] = 0x14; // Total length = 20
    packet[8] = 64; // TTL
    packet[IPV4_SRC_OFFSET..IPV4_SRC_OFFSET + 4].copy_from_slice(&src.octets());
    packet[IPV4_DST_OFFSET..IPV4_DST_OFFSET + 4].copy_from_slice(&dst.octets());
    packet
}
