//! Simulated distributed mutual exclusion over the Suzuki-Kasami broadcast
//! token algorithm.
//!
//! A fixed set of sites each cycle between non-critical work, requesting
//! entry to a single shared critical section, executing it, and releasing
//! it. Exactly one site executes the critical section at a time; the
//! release daemon spawned after every exit keeps the system live even when
//! the current holder has no competing demand of its own.

pub mod config;
pub mod error;
pub mod logging;
pub mod queue;
pub mod site;
pub mod token;
pub mod wiring;
pub mod workload;

pub use config::{Config, SimConfig};
pub use error::InitError;
pub use logging::FileLogger;
pub use queue::FifoQueue;
pub use site::Site;
pub use token::{Token, TokenSnapshot};
pub use wiring::Simulation;
