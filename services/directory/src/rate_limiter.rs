//! Rate limiter for throttling failed logins

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed attempts allowed inside one window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub lockout_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300, // 5 minutes
            lockout_seconds: 900, // 15 minutes
        }
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    failures: u32,
    window_start: Instant,
    locked_until: Option<Instant>,
}

impl RateLimiterEntry {
    /// Neither a lockout nor a counting window is still running
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.locked_until {
            Some(until) => now >= until,
            None => now.duration_since(self.window_start) >= window,
        }
    }
}

/// Counts failures per key and locks a key out once it exceeds the limit
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether `key` is currently locked out
    pub async fn is_locked(&self, key: &str) -> bool {
        self.is_locked_at(key, Instant::now()).await
    }

    /// Record a failed attempt for `key`
    pub async fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now()).await
    }

    /// Forget every failure of `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    async fn is_locked_at(&self, key: &str, now: Instant) -> bool {
        let window = Duration::from_secs(self.config.window_seconds);
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| !entry.is_stale(now, window));

        // Whatever survived the sweep is within its window or lockout
        entries
            .get(key)
            .is_some_and(|entry| entry.locked_until.is_some())
    }

    async fn record_failure_at(&self, key: &str, now: Instant) {
        let window = Duration::from_secs(self.config.window_seconds);
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| !entry.is_stale(now, window));

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            failures: 0,
            window_start: now,
            locked_until: None,
        });

        entry.failures += 1;
        if entry.failures >= self.config.max_attempts && entry.locked_until.is_none() {
            entry.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
            warn!(
                "Locked out {} for {} seconds after {} failed attempts",
                key, self.config.lockout_seconds, entry.failures
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts: 3,
            window_seconds: 60,
            lockout_seconds: 120,
        })
    }

    #[tokio::test]
    async fn test_locks_after_max_failures() {
        let limiter = limiter();
        let start = Instant::now();

        limiter.record_failure_at("jane", start).await;
        limiter.record_failure_at("jane", start).await;
        assert!(!limiter.is_locked_at("jane", start).await);

        limiter.record_failure_at("jane", start).await;
        assert!(limiter.is_locked_at("jane", start).await);
        assert!(!limiter.is_locked_at("john", start).await);

        let later = start + Duration::from_secs(121);
        assert!(!limiter.is_locked_at("jane", later).await);
    }

    #[tokio::test]
    async fn test_window_expiry_forgets_failures() {
        let limiter = limiter();
        let start = Instant::now();

        limiter.record_failure_at("jane", start).await;
        limiter.record_failure_at("jane", start).await;

        let next_window = start + Duration::from_secs(61);
        limiter.record_failure_at("jane", next_window).await;
        assert!(!limiter.is_locked_at("jane", next_window).await);
    }

    #[tokio::test]
    async fn test_stale_entries_are_dropped() {
        let limiter = limiter();
        let start = Instant::now();

        for i in 0..100 {
            limiter.record_failure_at(&format!("user{i}"), start).await;
        }
        for _ in 0..3 {
            limiter.record_failure_at("locked", start).await;
        }
        assert_eq!(limiter.tracked_keys().await, 101);

        // Windows have elapsed, the lockout has not
        let after_window = start + Duration::from_secs(61);
        limiter.record_failure_at("fresh", after_window).await;
        assert_eq!(limiter.tracked_keys().await, 2);
        assert!(limiter.is_locked_at("locked", after_window).await);

        let after_lockout = start + Duration::from_secs(121);
        assert!(!limiter.is_locked_at("anyone", after_lockout).await);
        assert_eq!(limiter.tracked_keys().await, 0);
    }

    #[tokio::test]
    async fn test_reset_clears_failures() {
        let limiter = limiter();
        limiter.record_failure("jane").await;
        limiter.record_failure("jane").await;
        limiter.reset("jane").await;
        limiter.record_failure("jane").await;
        assert!(!limiter.is_locked("jane").await);
        assert_eq!(limiter.config().max_attempts, 3);
    }
}
