// ============================================
// File: crates/vpnrelay-server/src/services/shutdown.rs
// ============================================
//! # Session Shutdown Coordination
//!
//! ## Creation Reason
//! The reader and writer of a session must both stop once either of them
//! decides the session is over, without locks and without either side
//! waiting on the other.
//!
//! ## State Machine
//! ```text
//! ┌─────────┐   stop() (first caller)   ┌──────────┐   both tasks done   ┌─────────┐
//! │ Running │ ────────────────────────► │ Stopping │ ──────────────────► │ Stopped │
//! └─────────┘                           └──────────┘                     └─────────┘
//! ```
//!
//! ## Primitives
//! - `running`: `AtomicBool`, flips true → false exactly once
//! - `stopped`: `watch` channel mirroring the flip, for tasks parked on I/O
//! - `exit`: single-permit `Notify`, reader → writer; storing the permit
//!   never blocks, even if the writer is already gone
//!
//! ## Last Modified
//! v0.1.0 - Initial shutdown coordinator

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{watch, Notify};

/// Number of tasks a session runs.
const SESSION_TASKS: usize = 2;

// ============================================
// SessionState
// ============================================

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Both tasks active.
    Running,
    /// Stop decided; tasks finishing.
    Stopping,
    /// Both tasks returned; resources may be reclaimed.
    Stopped,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

// ============================================
// ShutdownSignal
// ============================================

/// Running flag plus exit handoff shared by a session's two tasks.
#[derive(Debug)]
pub struct ShutdownSignal {
    running: AtomicBool,
    stopped_tx: watch::Sender<bool>,
    exit: Notify,
    exit_sent: AtomicBool,
    finished: AtomicUsize,
}

impl ShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        let (stopped_tx, _) = watch::channel(false);
        Self {
            running: AtomicBool::new(true),
            stopped_tx,
            exit: Notify::new(),
            exit_sent: AtomicBool::new(false),
            finished: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clears the running flag.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn stop(&self) -> bool {
        let first = self
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if first {
            self.stopped_tx.send_replace(true);
        }

        first
    }

    /// Resolves once the running flag has been cleared.
    pub async fn stopped(&self) {
        let mut rx = self.stopped_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Hands the writer its exit notification; later calls are no-ops.
    ///
    /// Returns `true` if this call delivered it.
    pub fn notify_exit(&self) -> bool {
        if self.exit_sent.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.exit.notify_one();
        true
    }

    /// Resolves when the exit notification arrives.
    pub async fn exit_notified(&self) {
        self.exit.notified().await;
    }

    /// Records that one of the session's tasks has returned.
    pub fn task_finished(&self) {
        self.finished.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.finished.load(Ordering::Acquire) >= SESSION_TASKS {
            SessionState::Stopped
        } else if self.is_running() {
            SessionState::Running
        } else {
            SessionState::Stopping
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
