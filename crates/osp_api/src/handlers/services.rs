use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use osp_core::models::service::{Service, ServiceDraft};
use serde_json::{json, Value};
use uuid::Uuid;

use super::credential;
use crate::error::ApiError;
use crate::AppState;

pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.service.list_services().await?))
}

// Staff handlers take path and body as `Result`s so a bad credential is
// reported before a malformed request.

pub async fn create_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ServiceDraft>, JsonRejection>,
) -> Result<Json<Service>, ApiError> {
    state.service.authorize(credential(&headers))?;
    let Json(draft) = body?;

    let service = state
        .service
        .create_service(credential(&headers), draft)
        .await?;
    Ok(Json(service))
}

pub async fn update_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ServiceDraft>, JsonRejection>,
) -> Result<Json<Service>, ApiError> {
    state.service.authorize(credential(&headers))?;
    let Path(id) = id?;
    let Json(draft) = body?;

    let service = state
        .service
        .update_service(credential(&headers), id, draft)
        .await?;
    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    state.service.authorize(credential(&headers))?;
    let Path(id) = id?;

    state.service.delete_service(credential(&headers), id).await?;
    Ok(Json(json!({ "success": true })))
}
