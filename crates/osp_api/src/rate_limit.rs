//! Sliding-window limiter for the public submission route.
//!
//! Clients are keyed by their peer address. `X-Forwarded-For` is only
//! believed when the deployment says a trusted proxy sets it.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use parking_lot::Mutex;

use crate::error::ApiError;

// Peer address unavailable (e.g. not served with connect info)
const UNKNOWN_PEER: &str = "unknown";
const CLEANUP_INTERVAL: u64 = 100;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Default)]
struct State {
    hits: HashMap<String, VecDeque<Instant>>,
    checks: u64,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<State>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::default()),
        }
    }

    /// Records a hit for `client`, or rejects it if the window is full.
    pub fn check(&self, client: &str) -> Result<(), ApiError> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Result<(), ApiError> {
        let cutoff = now.checked_sub(self.config.window);
        let mut state = self.state.lock();

        state.checks += 1;
        if state.checks % CLEANUP_INTERVAL == 0 {
            state
                .hits
                .retain(|_, hits| hits.back().is_some_and(|t| Some(*t) > cutoff));
        }

        let hits = state.hits.entry(client.to_string()).or_default();
        while hits.front().is_some_and(|t| Some(*t) <= cutoff) {
            hits.pop_front();
        }

        if hits.len() >= self.config.max_requests as usize {
            tracing::warn!(
                client,
                requests = hits.len(),
                max = self.config.max_requests,
                "rate limit exceeded"
            );
            return Err(ApiError::RateLimited);
        }

        hits.push_back(now);
        Ok(())
    }
}

/// The key a request is counted under: the peer IP, or the first forwarded
/// hop when `trust_proxy` is set and the header is present.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_PEER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn rejects_once_the_window_is_full() {
        let limiter = limiter(2);
        let now = Instant::now();

        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert!(matches!(limiter.check_at("10.0.0.1", now), Err(ApiError::RateLimited)));

        // Other clients have their own window
        assert!(limiter.check_at("10.0.0.2", now).is_ok());
    }

    #[test]
    fn old_hits_slide_out_of_the_window() {
        let limiter = limiter(1);
        let start = Instant::now();

        assert!(limiter.check_at("10.0.0.1", start).is_ok());
        assert!(limiter.check_at("10.0.0.1", start + Duration::from_secs(30)).is_err());
        assert!(limiter.check_at("10.0.0.1", start + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn client_key_is_the_peer_ip_unless_a_proxy_is_trusted() {
        let peer: SocketAddr = "198.51.100.4:51234".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );

        // Forged header is ignored without a trusted proxy
        assert_eq!(client_key(&headers, Some(peer), false), "198.51.100.4");
        assert_eq!(client_key(&headers, Some(peer), true), "203.0.113.7");

        // Port does not split one host into many clients
        let other_port: SocketAddr = "198.51.100.4:40000".parse().unwrap();
        assert_eq!(client_key(&HeaderMap::new(), Some(other_port), true), "198.51.100.4");

        assert_eq!(client_key(&HeaderMap::new(), None, false), "unknown");
    }
}
