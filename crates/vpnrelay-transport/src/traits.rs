// ============================================
// File: crates/vpnrelay-transport/src/traits.rs
// ============================================
//! # Stream Traits
//!
//! ## Creation Reason
//! Defines the bidirectional message stream a session runs over, plus the
//! values the connection layer resolves before handing the stream over.
//!
//! ## Design Philosophy
//! - Async-first with `async_trait`
//! - `&self` receivers so one task can receive while another sends
//! - End of stream is `Ok(None)`, not an error
//!
//! ## Last Modified
//! v0.1.0 - Initial trait definitions

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;

use vpnrelay_core::credential::Credential;
use vpnrelay_core::protocol::IpPacket;

use crate::error::Result;

// ============================================
// StreamContext
// ============================================

/// Values resolved by the connection layer when a stream is accepted.
///
/// Both are optional here; a session refuses to start without them.
#[derive(Debug, Clone, Default)]
pub struct StreamContext {
    /// Transport-level address of the peer.
    pub origin_ip: Option<IpAddr>,
    /// Verified credential presented by the peer.
    pub credential: Option<Arc<Credential>>,
}

impl StreamContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the peer address.
    #[must_use]
    pub const fn with_origin_ip(mut self, origin_ip: IpAddr) -> Self {
        self.origin_ip = Some(origin_ip);
        self
    }

    /// Sets the credential.
    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<Arc<Credential>>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

// ============================================
// PacketStream Trait
// ============================================

/// Bidirectional stream of tunnel messages for one client.
///
/// # Thread Safety
/// Implementations must tolerate a `recv` running concurrently with
/// `send`, and two overlapping `send` calls.
///
/// # Example
/// ```ignore
/// async fn echo<S: PacketStream>(stream: &S) -> Result<()> {
///     while let Some(packet) = stream.recv().await? {
///         stream.send(packet).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait PacketStream: Send + Sync {
    /// Receives the next message.
    ///
    /// # Returns
    /// `Ok(None)` at end of stream.
    ///
    /// # Errors
    /// Returns error if the stream fails.
    async fn recv(&self) -> Result<Option<IpPacket>>;

    /// Sends a message to the peer.
    ///
    /// # Errors
    /// Returns error if the message cannot be written.
    async fn send(&self, packet: IpPacket) -> Result<()>;

    /// Returns the context resolved when the stream was accepted.
    fn context(&self) -> StreamContext;
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpnrelay_core::credential::Claims;

    #[test]
    fn test_context_builder() {
        let ctx = StreamContext::new()
            .with_origin_ip("10.0.0.5".parse().unwrap())
            .with_credential(Credential::new(Claims::new("erin")));

        assert_eq!(ctx.origin_ip, Some("10.0.0.5".parse().unwrap()));
        assert_eq!(ctx.credential.map(|c| c.audience().to_string()), Some("erin".into()));
    }

    #[test]
    fn test_empty_context() {
        let ctx = StreamContext::new();
        assert!(ctx.origin_ip.is_none());
        assert!(ctx.credential.is_none());
    }
}
