// ==========================================
// Tecnova POS - per-caller rate limiting
// ==========================================
// Sliding window: a caller may start at most `max_requests`
// imports within any `window`. State is in-process only.
// ==========================================

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Admission check applied before an import starts.
pub trait RateLimiter: Send + Sync {
    /// Records an attempt for `key`; false when over the limit.
    fn check(&self, key: &str) -> bool;
}

pub struct SlidingWindowRateLimiter {
    max_requests: usize,
    window: Duration,
    state: Mutex<WindowState>,
}

#[derive(Default)]
struct WindowState {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl WindowState {
    /// Drops callers whose newest hit has left the window. Runs at most once per window.
    fn sweep(&mut self, now: Instant, window: Duration) {
        let due = self
            .last_sweep
            .map_or(true, |at| now.saturating_duration_since(at) >= window);
        if !due {
            return;
        }
        let before = self.hits.len();
        self.hits.retain(|_, recent| {
            recent
                .back()
                .is_some_and(|newest| now.saturating_duration_since(*newest) < window)
        });
        self.last_sweep = Some(now);
        if self.hits.len() < before {
            debug!(evicted = before - self.hits.len(), "rate limiter sweep");
        }
    }
}

impl SlidingWindowRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(WindowState::default()),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// `check` with an explicit clock.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.sweep(now, self.window);

        let recent = state.hits.entry(key.to_string()).or_default();
        while let Some(oldest) = recent.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                recent.pop_front();
            } else {
                break;
            }
        }

        if recent.len() >= self.max_requests {
            debug!(key, in_window = recent.len(), "rate limit hit");
            if recent.is_empty() {
                state.hits.remove(key);
            }
            return false;
        }
        recent.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        match self.state.lock() {
            Ok(guard) => guard.hits.len(),
            Err(poisoned) => poisoned.into_inner().hits.len(),
        }
    }
}

impl Default for SlidingWindowRateLimiter {
    /// 30 requests per minute.
    fn default() -> Self {
        Self::new(30, Duration::from_millis(60_000))
    }
}

impl RateLimiter for SlidingWindowRateLimiter {
    fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }
}
