//! Rate limiting middleware.
//!
//! Fixed-window counter per client IP, with a burst allowance on top.
//! Idle clients are pruned by a background sweep (`spawn_cleanup`).

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::client_key;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    pub window: Duration,
    /// Extra requests above `max_requests` before hard reject.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window: Duration::from_secs(60),
            burst: 30,
        }
    }
}

/// Shared limiter state, cheap to clone into middleware.
#[derive(Clone)]
pub struct RateLimitLayer {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, PartialEq, Eq)]
enum RateLimitResult {
    Allowed,
    BurstUsed,
    Exceeded { retry_after: Duration },
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut state = self.state.lock();

        let entry = state.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        let limit = self.config.max_requests + self.config.burst;
        if entry.count > limit {
            let reset_at = entry.window_start + self.config.window;
            RateLimitResult::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else if entry.count > self.config.max_requests {
            RateLimitResult::BurstUsed
        } else {
            RateLimitResult::Allowed
        }
    }

    /// Drop clients idle for two windows.
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        let before = state.len();
        state.retain(|_, entry| now.duration_since(entry.window_start) < window * 2);
        let pruned = before - state.len();
        if pruned > 0 {
            debug!(pruned, remaining = state.len(), "rate limiter cleanup");
        }
    }

    /// Run `cleanup` every `period` until the handle is aborted
    pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                limiter.cleanup();
            }
        })
    }

    pub fn window(&self) -> Duration {
        self.config.window
    }

    pub fn tracked_clients(&self) -> usize {
        self.state.lock().len()
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitLayer>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_key(&request);

    match limiter.check(ip) {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::BurstUsed => {
            warn!(ip = %ip, "Client is using burst allowance");
            next.run(request).await
        }
        RateLimitResult::Exceeded { retry_after } => {
            let retry_secs = retry_after.as_secs().max(1);
            warn!(ip = %ip, retry_after_secs = retry_secs, "Rate limit exceeded");

            let body = serde_json::json!({
                "error": "rate_limit_exceeded",
                "retry_after_seconds": retry_secs,
            });

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_secs.to_string())],
                axum::Json(body),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, burst: u32) -> RateLimitLayer {
        RateLimitLayer::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
            burst,
        })
    }

    #[test]
    fn test_rate_limit_allows_under_limit() {
        let limiter = limiter(10, 5);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..10 {
            assert_eq!(limiter.check(ip), RateLimitResult::Allowed);
        }
    }

    #[test]
    fn test_rate_limit_burst_then_exceeded() {
        let limiter = limiter(5, 3);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..5 {
            assert_eq!(limiter.check(ip), RateLimitResult::Allowed);
        }
        for _ in 0..3 {
            assert_eq!(limiter.check(ip), RateLimitResult::BurstUsed);
        }
        assert!(matches!(
            limiter.check(ip),
            RateLimitResult::Exceeded { .. }
        ));

        // other clients are unaffected
        let other: IpAddr = "10.0.0.9".parse().unwrap();
        assert_eq!(limiter.check(other), RateLimitResult::Allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 0);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        let start = Instant::now();

        assert_eq!(limiter.check_at(ip, start), RateLimitResult::Allowed);
        assert!(matches!(
            limiter.check_at(ip, start + Duration::from_secs(1)),
            RateLimitResult::Exceeded { .. }
        ));
        assert_eq!(
            limiter.check_at(ip, start + Duration::from_secs(61)),
            RateLimitResult::Allowed
        );
    }

    #[test]
    fn test_cleanup_keeps_active_clients() {
        let limiter = limiter(10, 0);
        limiter.check("127.0.0.1".parse().unwrap());
        limiter.check("10.0.0.2".parse().unwrap());
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.cleanup();
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[tokio::test]
    async fn test_background_cleanup_prunes_idle_clients() {
        let limiter = RateLimitLayer::new(RateLimitConfig {
            max_requests: 10,
            window: Duration::from_millis(10),
            burst: 0,
        });
        for i in 0..20u8 {
            limiter.check(IpAddr::from([10, 0, 0, i]));
        }
        assert_eq!(limiter.tracked_clients(), 20);

        let handle = limiter.spawn_cleanup(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        assert_eq!(limiter.tracked_clients(), 0);
    }
}
