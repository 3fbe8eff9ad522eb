//! Periodic per-site state dump, external to the protocol itself.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::Site;

const LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Log `receivedSequenceNumbers` once a second, for as long as the process
/// runs.
pub fn spawn(site: Arc<Site>) -> JoinHandle<()> {
    thread::spawn(move || loop {
        let snapshot = site.sequence_numbers();
        site.log(&format!("receivedSequenceNumbers = {snapshot:?}\n"));
        thread::sleep(LOG_INTERVAL);
    })
}
