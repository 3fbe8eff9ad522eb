//! Per-peer inbound listeners and their dispatcher.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::Site;

/// Spawn one listener thread per peer (skipping the unused diagonal
/// channel), consuming `inbound` (indexed by sender site ID).
pub fn spawn_listeners(site: Arc<Site>, inbound: Vec<Receiver<i64>>) -> Vec<JoinHandle<()>> {
    let self_id = site.id();
    inbound
        .into_iter()
        .enumerate()
        .filter(|(peer, _)| *peer as i64 != self_id)
        .map(|(peer, rx)| spawn_listener(Arc::clone(&site), peer, rx))
        .collect()
}

/// Listen for messages from a single peer, updating
/// `receivedSequenceNumbers[peer]` by max on every receive. Runs until the
/// sender is dropped (never, in this protocol's lifetime: see the crate's
/// lifecycle note that no entity is ever destroyed).
pub fn spawn_listener(site: Arc<Site>, peer: usize, rx: Receiver<i64>) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(message) = rx.recv() {
            site.log(&format!("Received message {message} from site {peer}\n"));
            {
                let mut received = site.received.lock();
                received[peer] = received[peer].max(message);
            }
            site.log(&format!(
                "Updated receivedSequenceNumbers = {:?}\n",
                site.sequence_numbers()
            ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::FileLogger;
    use crate::token::Token;
    use std::sync::mpsc;
    use std::time::Duration;

    fn dummy_site(id: usize, num_sites: usize) -> Arc<Site> {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(FileLogger::init(&dir.path().join("logs")).unwrap());
        let token = Arc::new(Token::new(num_sites, 0));
        let outbound = (0..num_sites).map(|_| mpsc::channel().0).collect();
        Site::new(id, num_sites, outbound, token, logger, Duration::ZERO)
    }

    #[test]
    fn listener_takes_running_max_of_out_of_order_messages() {
        let site = dummy_site(0, 3);
        let (tx, rx) = mpsc::channel::<i64>();
        let _handle = spawn_listener(Arc::clone(&site), 1, rx);

        let mut observed = Vec::new();
        for m in [3, 1, 2, 5, 4] {
            tx.send(m).unwrap();
            // The running max is monotonic, so it will reach at least `m`
            // once the listener has processed this send.
            let deadline = std::time::Instant::now() + Duration::from_secs(2);
            let running = loop {
                let running = site.sequence_numbers()[1];
                if running >= m || std::time::Instant::now() >= deadline {
                    break running;
                }
                thread::sleep(Duration::from_millis(1));
            };
            observed.push(running);
        }

        assert_eq!(observed, vec![3, 3, 3, 5, 5]);
    }
}
