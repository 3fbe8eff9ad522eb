//! The singleton token: the sole object whose possession authorizes
//! critical-section entry.
//!
//! Two independent synchronization primitives live here, deliberately
//! separated:
//!
//! - `cs_lock` is the literal protocol-level "token lock" from the spec:
//!   whoever holds it has the exclusive right to be executing the critical
//!   section. A site acquires it in [`Token::wait_and_enter_cs`] and then
//!   *forgets* the guard (see the safety note there) so that a different
//!   thread — the release daemon it spawns afterwards — can later release
//!   it via [`Token::try_hand_off`]. This cross-thread handoff is the heart
//!   of the algorithm's liveness design: the current holder must be able to
//!   return to its own next cycle without waiting for a successor to be
//!   chosen.
//! - `state` is an ordinary, always-locked-and-released-within-one-call
//!   mutex guarding the bookkeeping fields (`currentOwner`,
//!   `lastServicedSequenceNumber`, `serviceQueue`). It is read far more
//!   often than `cs_lock` is contended (every site's busy-wait poll locks
//!   it briefly), so keeping it separate avoids any chance of a poller
//!   observing the "forgotten" `cs_lock` state.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::logging::FileLogger;
use crate::queue::FifoQueue;

const LOG_INTERVAL: Duration = Duration::from_secs(1);

struct TokenState {
    current_owner: i64,
    last_serviced: Vec<i64>,
    service_queue: FifoQueue,
}

pub struct Token {
    state: Mutex<TokenState>,
    cs_lock: Mutex<()>,
}

/// Point-in-time view of the token's bookkeeping fields, for logging and
/// tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub current_owner: i64,
    pub last_serviced: Vec<i64>,
    pub service_queue: Vec<i64>,
}

impl Token {
    /// Construct a token for `num_sites` sites, with `initial_owner`
    /// designated as the owner before any request has been made (the
    /// algorithm's bootstrap: see the crate-level design notes on why site 0
    /// may enter the CS without a peer having seen its request).
    pub fn new(num_sites: usize, initial_owner: i64) -> Self {
        Token {
            state: Mutex::new(TokenState {
                current_owner: initial_owner,
                last_serviced: vec![-1; num_sites],
                service_queue: FifoQueue::new(),
            }),
            cs_lock: Mutex::new(()),
        }
    }

    pub fn current_owner(&self) -> i64 {
        self.state.lock().current_owner
    }

    pub fn last_serviced(&self, site: usize) -> i64 {
        self.state.lock().last_serviced[site]
    }

    pub fn snapshot(&self) -> TokenSnapshot {
        let state = self.state.lock();
        TokenSnapshot {
            current_owner: state.current_owner,
            last_serviced: state.last_serviced.clone(),
            service_queue: state.service_queue.as_vec(),
        }
    }

    /// Phase 3: block until `site_id` is the designated owner, then acquire
    /// the critical-section lock.
    ///
    /// Polls `current_owner` through the (cheap, uncontended in the common
    /// case) `state` lock rather than a lock-free atomic read. The spec
    /// only requires that the waiting style eventually observes ownership
    /// changes, not any particular mechanism, so a short-held lock on every
    /// poll is equivalent to the reference's unsynchronized read — and
    /// actually sound under Rust's memory model, unlike the reference's.
    pub fn wait_and_enter_cs(&self, site_id: i64, poll_interval: Duration) {
        loop {
            if self.state.lock().current_owner == site_id {
                break;
            }
            std::thread::sleep(poll_interval);
        }

        let guard = self.cs_lock.lock();
        // Deliberately leak: we are not done with the critical section when
        // this function returns, and the unlock obligation is about to be
        // handed to a thread we haven't spawned yet (the release daemon).
        // `Token::try_hand_off` discharges it later via `force_unlock`.
        std::mem::forget(guard);
    }

    pub fn set_last_serviced(&self, site: usize, value: i64) {
        self.state.lock().last_serviced[site] = value;
    }

    /// Release-daemon step: fold `candidates` into the service queue
    /// (duplicate-suppressed), and if anything is waiting, pop the front,
    /// publish it as the new owner, and release the critical-section lock
    /// that an earlier call to [`Token::wait_and_enter_cs`] left forgotten.
    ///
    /// Returns `true` iff a successor was chosen and the lock was released;
    /// `false` means the caller should keep looping (step 6 of the release
    /// daemon: wait for a new request to make some candidate eligible).
    pub fn try_hand_off(&self, candidates: impl IntoIterator<Item = usize>) -> bool {
        let mut state = self.state.lock();
        for candidate in candidates {
            state.service_queue.push_unique(candidate as i64);
        }
        if state.service_queue.is_empty() {
            return false;
        }
        let next = state
            .service_queue
            .pop()
            .expect("service_queue checked non-empty immediately above");
        state.current_owner = next;
        drop(state);

        // SAFETY: `cs_lock` is currently held-but-forgotten by the site that
        // most recently returned from `wait_and_enter_cs`; `try_hand_off` is
        // only ever invoked by the release daemon that site spawned right
        // after, which is logically the same lock holder discharging its
        // release obligation. We have just published `next` as the new
        // owner under `state`, satisfying the requirement that `currentOwner`
        // is updated before the lock is released.
        unsafe {
            self.cs_lock.force_unlock();
        }
        true
    }
}

/// Log the token's bookkeeping fields once a second, for as long as the
/// process runs.
pub fn spawn_logger(token: Arc<Token>, logger: Arc<FileLogger>) -> JoinHandle<()> {
    thread::spawn(move || loop {
        let snapshot = token.snapshot();
        let _ = logger.append(
            "token.log",
            &format!("currentOwner = {}\n", snapshot.current_owner),
        );
        let _ = logger.append(
            "token.log",
            &format!("lastServicedSequenceNumber = {:?}\n", snapshot.last_serviced),
        );
        let _ = logger.append(
            "token.log",
            &format!("serviceQueue = {:?}\n", snapshot.service_queue),
        );
        thread::sleep(LOG_INTERVAL);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_matches_bootstrap_invariants() {
        let token = Token::new(3, 0);
        let snap = token.snapshot();
        assert_eq!(snap.current_owner, 0);
        assert_eq!(snap.last_serviced, vec![-1, -1, -1]);
        assert!(snap.service_queue.is_empty());
    }

    #[test]
    fn try_hand_off_picks_peers_before_self_when_given_in_that_order() {
        let token = Token::new(3, 0);
        // Caller (site 0's release daemon) is expected to list peers before
        // self; try_hand_off just preserves whatever order it's handed.
        let handed_off = token.try_hand_off([2usize, 0usize]);
        assert!(handed_off);
        assert_eq!(token.current_owner(), 2);
    }

    #[test]
    fn try_hand_off_returns_false_when_nothing_is_waiting() {
        let token = Token::new(2, 0);
        assert!(!token.try_hand_off(std::iter::empty()));
        assert_eq!(token.current_owner(), 0);
    }

    #[test]
    fn service_queue_survives_across_calls_until_drained() {
        let token = Token::new(4, 0);
        // First call enqueues 1, but finds 3 too, hands off to 1.
        assert!(token.try_hand_off([1usize, 3usize]));
        assert_eq!(token.current_owner(), 1);
        // cs_lock is now forgotten-held by "site 1"; simulate it releasing
        // again later and the queue still remembering site 3.
        let guard = token.cs_lock.lock();
        std::mem::forget(guard);
        assert!(token.try_hand_off(std::iter::empty::<usize>()));
        assert_eq!(token.current_owner(), 3);
    }
}
