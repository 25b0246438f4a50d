use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use osp_service::tracking::RequestView;
use serde::Deserialize;
use uuid::Uuid;

use super::credential;
use crate::error::ApiError;
use crate::AppState;

pub async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RequestView>>, ApiError> {
    Ok(Json(state.service.list_requests(credential(&headers)).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RequestView>, ApiError> {
    state.service.authorize(credential(&headers))?;
    let Path(id) = id?;

    Ok(Json(state.service.get_request(credential(&headers), id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<RequestView>, ApiError> {
    state.service.authorize(credential(&headers))?;
    let Path(id) = id?;
    let Json(body) = body?;

    let view = state
        .service
        .update_status(credential(&headers), id, &body.status)
        .await?;
    Ok(Json(view))
}
