//! Channel allocation bootstrap and the process-level construction of the
//! token and sites. An external collaborator by design (see the crate-level
//! scope notes): this module owns no protocol logic of its own, only the
//! topology and startup sequencing.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::SimConfig;
use crate::error::InitError;
use crate::logging::FileLogger;
use crate::site::{self, Site};
use crate::token::{self, Token};

/// Allocate an `n`×`n` matrix of unbounded FIFO integer channels.
///
/// Returns `(senders, receivers)` where `senders[i][j]` is site `i`'s
/// outbound channel to site `j`, and `receivers[j][i]` is site `j`'s inbound
/// channel from site `i`. The diagonal (`i == j`) is allocated like any
/// other pair but is never used by the protocol.
pub fn build_channel_matrix(n: usize) -> (Vec<Vec<Sender<i64>>>, Vec<Vec<Receiver<i64>>>) {
    let mut senders: Vec<Vec<Sender<i64>>> = (0..n).map(|_| Vec::with_capacity(n)).collect();
    let mut receivers: Vec<Vec<Receiver<i64>>> = (0..n).map(|_| Vec::with_capacity(n)).collect();

    for i in 0..n {
        for j in 0..n {
            let (tx, rx) = mpsc::channel();
            senders[i].push(tx);
            receivers[j].push(rx);
        }
    }

    (senders, receivers)
}

/// A running simulation: the constructed token, every site, and the handles
/// to their background activities (kept only to avoid detached-thread
/// warnings; this protocol runs forever, so nothing ever joins them).
pub struct Simulation {
    pub token: Arc<Token>,
    pub sites: Vec<Arc<Site>>,
    pub logger: Arc<FileLogger>,
    _handles: Vec<JoinHandle<()>>,
}

/// Initialize logging, allocate the channel matrix, construct the token
/// with `currentOwner := 0`, construct and start every site's concurrent
/// activities.
pub fn spawn(config: SimConfig) -> Result<Simulation, InitError> {
    let logger = Arc::new(FileLogger::init(&config.log_dir)?);

    let token = Arc::new(Token::new(config.num_sites, 0));
    let mut handles = vec![token::spawn_logger(Arc::clone(&token), Arc::clone(&logger))];

    let (mut senders, mut receivers) = build_channel_matrix(config.num_sites);
    let mut sites = Vec::with_capacity(config.num_sites);

    for i in 0..config.num_sites {
        let outbound = std::mem::take(&mut senders[i]);
        let inbound = std::mem::take(&mut receivers[i]);

        let s = Site::new(
            i,
            config.num_sites,
            outbound,
            Arc::clone(&token),
            Arc::clone(&logger),
            config.max_sleep,
        );

        handles.extend(site::listener::spawn_listeners(Arc::clone(&s), inbound));
        handles.push(site::state_logger::spawn(Arc::clone(&s)));
        let run_site = Arc::clone(&s);
        handles.push(std::thread::spawn(move || run_site.run()));

        sites.push(s);
    }

    Ok(Simulation {
        token,
        sites,
        logger,
        _handles: handles,
    })
}
