//! Phases 1-2: the non-critical section and the request broadcast.

use super::Site;
use crate::workload::random_sleep;

impl Site {
    /// Phase 1: do non-critical work. Touches no shared state.
    pub(super) fn execute_non_critical_section(&self) {
        self.log("Executing non-critical section\n");
        random_sleep(self.max_sleep);
    }

    /// Phase 2: increment this site's own sequence number under its
    /// internal lock, then broadcast it to every peer. The increment and
    /// the broadcast must not be reordered with respect to each other: a
    /// peer must never observe a sequence number before the local counter
    /// it came from has actually advanced.
    pub(super) fn request_critical_section(&self) {
        self.log("Requesting critical section\n");

        let seq = {
            let mut received = self.received.lock();
            received[self.id as usize] += 1;
            received[self.id as usize]
        };

        for (peer, tx) in self.outbound.iter().enumerate() {
            if peer as i64 == self.id {
                continue;
            }
            self.log(&format!("Sending message {seq} to site {peer}\n"));
            // The receiving site's listener thread lives for the process
            // lifetime (no entity is ever destroyed), so this send cannot
            // fail under this protocol's invariants.
            let _ = tx.send(seq);
        }
    }
}
