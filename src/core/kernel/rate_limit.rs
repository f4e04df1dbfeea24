use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Call accounting for one endpoint inside the current fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub started: Instant,
    pub count: u32,
}

/// Where an endpoint sits in its window cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No window yet, or the previous one has expired.
    Fresh,
    WithinBudget { remaining: u32 },
    Exhausted,
}

/// Per-endpoint fixed-window call budget.
///
/// Exhaustion only ends when the window expires; further attempts inside the
/// window neither extend nor reset it. Pure bookkeeping, no I/O.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    windows: Mutex<HashMap<String, RateLimitWindow>>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to spend one call of `budget` on `key`. Returns whether the call may proceed.
    pub fn try_acquire(&self, key: &str, budget: u32) -> bool {
        self.try_acquire_at(key, budget, Instant::now())
    }

    pub fn try_acquire_at(&self, key: &str, budget: u32, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = windows.entry(key.to_string()).or_insert(RateLimitWindow {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.started) > self.window {
            debug!(endpoint = key, used = entry.count, "rate limit window reset");
            entry.started = now;
            entry.count = 0;
        }

        if entry.count < budget {
            entry.count += 1;
            true
        } else {
            false
        }
    }

    pub fn state(&self, key: &str, budget: u32) -> WindowState {
        self.state_at(key, budget, Instant::now())
    }

    pub fn state_at(&self, key: &str, budget: u32, now: Instant) -> WindowState {
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        match windows.get(key) {
            None => WindowState::Fresh,
            Some(w) if now.saturating_duration_since(w.started) > self.window => WindowState::Fresh,
            Some(w) if w.count < budget => WindowState::WithinBudget {
                remaining: budget - w.count,
            },
            Some(_) => WindowState::Exhausted,
        }
    }

    /// Current accounting for `key`, if it has ever been called.
    pub fn snapshot(&self, key: &str) -> Option<RateLimitWindow> {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(90);
    const KEY: &str = "GET/api/v3/openOrders";

    #[test]
    fn test_budget_of_three_then_exhausted() {
        let limiter = RateLimiter::new(WINDOW);
        let start = Instant::now();

        assert_eq!(limiter.state_at(KEY, 3, start), WindowState::Fresh);
        assert!(limiter.try_acquire_at(KEY, 3, start));
        assert_eq!(
            limiter.state_at(KEY, 3, start),
            WindowState::WithinBudget { remaining: 2 }
        );
        assert!(limiter.try_acquire_at(KEY, 3, start + Duration::from_secs(1)));
        assert!(limiter.try_acquire_at(KEY, 3, start + Duration::from_secs(2)));
        assert!(!limiter.try_acquire_at(KEY, 3, start + Duration::from_secs(3)));
        assert_eq!(
            limiter.state_at(KEY, 3, start + Duration::from_secs(3)),
            WindowState::Exhausted
        );
        assert_eq!(limiter.snapshot(KEY).unwrap().count, 3);
    }

    #[test]
    fn test_exhaustion_lasts_until_window_elapses() {
        let limiter = RateLimiter::new(WINDOW);
        let start = Instant::now();
        assert!(limiter.try_acquire_at(KEY, 1, start));

        // hammering inside the window changes nothing
        for secs in [10, 45, 89, 90] {
            assert!(!limiter.try_acquire_at(KEY, 1, start + Duration::from_secs(secs)));
        }
        assert_eq!(limiter.snapshot(KEY).unwrap().started, start);

        let later = start + Duration::from_secs(91);
        assert_eq!(limiter.state_at(KEY, 1, later), WindowState::Fresh);
        assert!(limiter.try_acquire_at(KEY, 1, later));
        let window = limiter.snapshot(KEY).unwrap();
        assert_eq!(window.started, later);
        assert_eq!(window.count, 1);
    }

    #[test]
    fn test_endpoints_are_accounted_separately() {
        let limiter = RateLimiter::new(WINDOW);
        let now = Instant::now();
        assert!(limiter.try_acquire_at("GET/api/v3/account", 1, now));
        assert!(!limiter.try_acquire_at("GET/api/v3/account", 1, now));
        assert!(limiter.try_acquire_at("POST/api/v3/account", 1, now));
    }

    #[test]
    fn test_zero_budget_never_admits() {
        let limiter = RateLimiter::new(WINDOW);
        assert!(!limiter.try_acquire(KEY, 0));
        assert_eq!(limiter.state(KEY, 0), WindowState::Exhausted);
    }

    #[test]
    fn test_concurrent_callers_never_overspend() {
        let limiter = std::sync::Arc::new(RateLimiter::new(WINDOW));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..10).filter(|_| limiter.try_acquire(KEY, 25)).count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 25);
    }
}
