//! Phase 4 and the transient release daemon.
//!
//! The decoupling between the two is the load-bearing part of the whole
//! algorithm's liveness: `release_critical_section` must return immediately
//! so the site's main cycle can go back to non-critical work, instead of
//! blocking until some peer happens to want the token next.

use std::sync::Arc;
use std::thread;

use super::Site;

impl Site {
    /// Record this site's own highest serviced sequence number, then hand
    /// the token-release obligation to a background thread and return.
    pub(super) fn release_critical_section(self: &Arc<Self>) {
        self.log("Releasing critical section\n");

        let own_seq = {
            let received = self.received.lock();
            received[self.id as usize]
        };
        self.token.set_last_serviced(self.id as usize, own_seq);

        let daemon_site = Arc::clone(self);
        thread::spawn(move || daemon_site.release_daemon());
    }

    /// Runs on its own thread, logically still holding the token's
    /// critical-section lock (see [`crate::token::Token::wait_and_enter_cs`]
    /// for how that lock crossed the thread boundary). Repeatedly scans for
    /// eligible successors — peers before self, for fairness — until one is
    /// found, then hands the token off and exits.
    fn release_daemon(self: Arc<Self>) {
        loop {
            let candidates = self.eligible_candidates();
            self.log(&format!("Updated serviceQueue candidates = {candidates:?}\n"));

            if self.token.try_hand_off(candidates) {
                self.log("Token lock released\n");
                return;
            }

            thread::sleep(self.poll_interval);
        }
    }

    /// Peers whose next-expected request has arrived but not yet been
    /// serviced, followed by self under the same test. Peers-before-self is
    /// the fairness tie-break: the current holder yields to any pending peer
    /// before re-enqueuing itself.
    fn eligible_candidates(&self) -> Vec<usize> {
        let received = self.received.lock();
        let mut candidates = Vec::new();
        for peer in 0..self.num_sites {
            if peer as i64 == self.id {
                continue;
            }
            if received[peer] == self.token.last_serviced(peer) + 1 {
                candidates.push(peer);
            }
        }
        let self_idx = self.id as usize;
        if received[self_idx] == self.token.last_serviced(self_idx) + 1 {
            candidates.push(self_idx);
        }
        candidates
    }
}
