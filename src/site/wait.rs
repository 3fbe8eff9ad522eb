//! Phase 3: wait for the token, then execute the critical section.

use super::Site;
use crate::workload::random_sleep;

impl Site {
    pub(super) fn wait_and_execute_critical_section(&self) {
        self.log("Waiting for token\n");
        self.token.wait_and_enter_cs(self.id, self.poll_interval);
        self.log("Received token\n");

        self.log("Executing critical section\n");
        random_sleep(self.max_sleep);
    }
}
