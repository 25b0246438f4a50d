use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use osp_api::rate_limit::{RateLimitConfig, RateLimiter};
use osp_api::routes::app_router;
use osp_api::AppState;
use osp_service::bootstrap::{build_service, seed_if_requested};
use osp_service::config::Config;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let service = build_service(&config).await?;
    seed_if_requested(&service, &config).await?;

    let limiter = RateLimiter::new(RateLimitConfig {
        max_requests: config.submit_rate_limit,
        window: Duration::from_secs(config.submit_rate_window_secs),
    });
    let state = AppState::new(service, limiter, config.upload_body_limit())
        .with_trust_proxy(config.trust_proxy);

    let mut app = app_router(state);
    if let Some(origin) = &config.client_origin {
        let origin: HeaderValue = origin
            .parse()
            .with_context(|| format!("CLIENT_ORIGIN '{}' is not a valid origin", origin))?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);
    // Peer addresses key the submission rate limit
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
