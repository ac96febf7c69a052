//! Per-client sliding-window rate limiting.
//!
//! One [`SlidingWindowLimiter`] is constructed per server instance and
//! handed to handlers through shared state — no module-level globals.
//! Hits older than the window are dropped for a key every time that key
//! is touched; idle keys are swept periodically so the map stays bounded.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Sweep idle keys every this many checks.
const SWEEP_INTERVAL: u64 = 1024;

#[derive(Debug, Default)]
struct LimiterState {
    hits: HashMap<String, Vec<Instant>>,
    checks: u64,
}

/// Sliding-window rate limiter keyed by an arbitrary string (client IP).
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max: usize,
    window: Duration,
    state: Mutex<LimiterState>,
}

impl SlidingWindowLimiter {
    /// Allow at most `max` hits per `window` for each key.
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            max,
            window,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Record a hit for `key` and report whether it is allowed.
    ///
    /// Stale hits for the key are evicted first, so the decision is always
    /// over the trailing window.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock().expect("limiter mutex poisoned");

        state.checks += 1;
        if state.checks % SWEEP_INTERVAL == 0 {
            let window = self.window;
            state
                .hits
                .retain(|_, hits| hits.iter().any(|t| now.duration_since(*t) < window));
        }

        let hits = state.hits.entry(key.to_string()).or_default();
        hits.retain(|t| now.duration_since(*t) < self.window);

        if hits.len() >= self.max {
            return false;
        }
        hits.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_max_within_window() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
        assert!(limiter.check("5.6.7.8"));
    }

    #[test]
    fn stale_hits_are_evicted_on_touch() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_millis(10));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("1.2.3.4"));
    }

    #[test]
    fn periodic_sweep_drops_idle_keys() {
        let limiter = SlidingWindowLimiter::new(10, Duration::from_millis(1));
        limiter.check("idle-key");
        std::thread::sleep(Duration::from_millis(5));
        for i in 0..SWEEP_INTERVAL {
            limiter.check(&format!("key-{i}"));
        }
        let state = limiter.state.lock().unwrap();
        assert!(!state.hits.contains_key("idle-key"));
    }
}
