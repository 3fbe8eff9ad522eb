//! Per-peer state machine: request/wait/execute/release, plus the listener
//! fan-out and release daemon that run alongside it.
//!
//! Split into submodules for readability, the way `connection/mod.rs` splits
//! the IRC server's per-client handler by concern:
//! - [`request`] — phase 1-2, non-critical section and the request broadcast
//! - [`wait`] — phase 3, waiting for and entering the critical section
//! - [`release`] — phase 4, releasing the critical section and the
//!   transient release daemon
//! - [`listener`] — the per-peer inbound listener and its dispatcher
//! - [`state_logger`] — the periodic state-dump logger

pub mod listener;
pub mod release;
pub mod request;
pub mod state_logger;
pub mod wait;

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::logging::FileLogger;
use crate::token::Token;

/// How often a busy-wait loop (phase 3's spin, the release daemon's inner
/// loop) re-polls shared state. Bounds CPU usage without introducing a
/// latency floor that matters next to multi-second workload sleeps; see the
/// crate-level design notes' resolution of the "busy-wait CPU cost" open
/// question.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A single participant in the mutual-exclusion protocol.
pub struct Site {
    id: i64,
    num_sites: usize,
    /// `receivedSequenceNumbers`: entry `k` is the highest request number
    /// this site has observed from site `k` (or from itself, at `k = id`).
    /// Guards this site's own view only — never the token's fields.
    received: Mutex<Vec<i64>>,
    /// Outbound channel to every peer, indexed by destination site ID. The
    /// entry at `id` exists (the diagonal is allocated) but is never used.
    outbound: Vec<Sender<i64>>,
    token: Arc<Token>,
    logger: Arc<FileLogger>,
    max_sleep: Duration,
    poll_interval: Duration,
}

impl Site {
    pub fn new(
        id: usize,
        num_sites: usize,
        outbound: Vec<Sender<i64>>,
        token: Arc<Token>,
        logger: Arc<FileLogger>,
        max_sleep: Duration,
    ) -> Arc<Site> {
        Arc::new(Site {
            id: id as i64,
            num_sites,
            received: Mutex::new(vec![-1; num_sites]),
            outbound,
            token,
            logger,
            max_sleep,
            poll_interval: POLL_INTERVAL,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn token(&self) -> &Arc<Token> {
        &self.token
    }

    /// Snapshot of `receivedSequenceNumbers`, for logging and tests.
    pub fn sequence_numbers(&self) -> Vec<i64> {
        self.received.lock().clone()
    }

    fn log_name(&self) -> String {
        format!("site{}.log", self.id)
    }

    /// Append a line to this site's log file (and the common log). Write
    /// failures are not fatal to the simulation; see the crate-level error
    /// design notes.
    pub(crate) fn log(&self, message: &str) {
        if let Err(err) = self.logger.append(&self.log_name(), message) {
            tracing::warn!(site = self.id, error = %err, "failed to write site log");
        }
    }

    /// The indefinite main cycle: non-critical section, request, wait,
    /// execute, release. Never returns; run this on its own thread.
    pub fn run(self: &Arc<Self>) -> ! {
        loop {
            self.execute_non_critical_section();
            self.request_critical_section();
            self.wait_and_execute_critical_section();
            self.release_critical_section();
            self.log("Completed cycle\n");
        }
    }
}
