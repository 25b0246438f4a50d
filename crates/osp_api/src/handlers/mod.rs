pub mod admin;
pub mod health;
pub mod requests;
pub mod services;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

pub use health::health_check;

/// Raw `Authorization` header value, handed to the staff gate as-is.
pub(crate) fn credential(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}
