// ============================================
// File: crates/vpnrelay-core/src/time.rs
// ============================================
//! # Time Utilities
//!
//! ## Creation Reason
//! Credential claims are expressed in unix seconds; this module gives
//! them a small typed wrapper so comparisons read clearly.
//!
//! ## Last Modified
//! v0.1.0 - Initial time utilities

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds.
///
/// # Example
/// ```
/// use vpnrelay_core::time::Timestamp;
///
/// let now = Timestamp::now();
/// let later = now.add_secs(60);
/// assert!(later > now);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Creates a timestamp for the current time.
    ///
    /// A system clock set before the epoch reads as zero.
    #[must_use]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self(secs)
    }

    /// Returns the unix timestamp in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Returns a timestamp `secs` seconds later (negative moves earlier).
    #[must_use]
    pub const fn add_secs(&self, secs: i64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
