// ============================================
// File: crates/vpnrelay-server/src/services/mod.rs
// ============================================
//! # Session Services
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`session`]: `ClientSession`, the per-client state
//! - `reader`: stream → validator → router queue
//! - `writer`: private queue / exit signal / credential tick → stream
//! - [`shutdown`]: running flag and exit handoff shared by both tasks
//! - [`queue`]: channel types linking sessions and the router
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ClientSession                          │
//! │                                                             │
//! │   stream ──► ReaderTask ──► PacketValidator ──► outbound ───┼──► router
//! │                  │                                          │
//! │                  │ stop + exit signal                       │
//! │                  ▼                                          │
//! │   stream ◄── WriterTask ◄── inbound (cap 1000) ◄────────────┼─── router
//! │                  ▲                                          │
//! │                  └── credential check tick                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The router owns sessions; it must check `has_vpn_ip()` before routing
//! - Either task may end the session; the other follows in bounded time
//!
//! ## Last Modified
//! v0.1.0 - Initial services structure

pub mod queue;
mod reader;
pub mod session;
pub mod shutdown;
mod writer;

pub use queue::{outbound_channel, InboundSender, OutboundReceiver, OutboundSender};
pub use reader::ReaderExit;
pub use session::{ClientSession, SessionExit, SessionStats, SharedStream, StatsSnapshot};
pub use shutdown::{SessionState, ShutdownSignal};
pub use writer::WriterExit;
