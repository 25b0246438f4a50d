pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;

use std::sync::Arc;

use osp_service::OspService;

use rate_limit::RateLimiter;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OspService>,
    pub limiter: Arc<RateLimiter>,
    /// Largest request body accepted, sized for a full set of uploads.
    pub body_limit: usize,
    /// Believe `X-Forwarded-For` when keying the rate limiter.
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(service: OspService, limiter: RateLimiter, body_limit: usize) -> Self {
        Self {
            service: Arc::new(service),
            limiter: Arc::new(limiter),
            body_limit,
            trust_proxy: false,
        }
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}
