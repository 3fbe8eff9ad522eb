//! The random-sleep workload simulator.
//!
//! Stands in for "doing actual work" in both the non-critical and critical
//! sections. Parameterized by a bound rather than a hardcoded unit, so tests
//! can inject a few milliseconds instead of the reference's whole seconds
//! without touching any protocol code.

use std::thread;
use std::time::Duration;

use rand::Rng;

/// Block the current thread for a uniformly random duration in
/// `[0, upper_bound)`.
pub fn random_sleep(upper_bound: Duration) {
    if upper_bound.is_zero() {
        return;
    }
    let nanos = rand::thread_rng().gen_range(0..upper_bound.as_nanos());
    thread::sleep(Duration::from_nanos(nanos as u64));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn zero_bound_returns_immediately() {
        let start = Instant::now();
        random_sleep(Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn respects_upper_bound() {
        let bound = Duration::from_millis(20);
        let start = Instant::now();
        random_sleep(bound);
        // Generous slack for scheduler noise; the point is it doesn't sleep
        // for anywhere near the production default of whole seconds.
        assert!(start.elapsed() < bound + Duration::from_millis(200));
    }
}
