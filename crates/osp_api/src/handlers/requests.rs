use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Multipart, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use osp_core::models::intake::IntakeForm;
use osp_service::documents::UploadedFile;
use osp_service::intake::Submission;
use osp_service::tracking::RequestView;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::rate_limit::client_key;
use crate::AppState;

/// `POST /api/requests` (multipart).
pub async fn submit_request(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let peer = peer.map(|ConnectInfo(addr)| addr);
    state
        .limiter
        .check(&client_key(&headers, peer, state.trust_proxy))?;

    let submission = read_submission(multipart).await?;
    let request_id = state.service.submit_request(submission).await?;

    Ok(Json(json!({ "success": true, "requestId": request_id })))
}

async fn read_submission(mut multipart: Multipart) -> Result<Submission, ApiError> {
    let mut form = IntakeForm::default();
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "documents" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part for an untouched file input
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                documents.push(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "serviceId" => form.service_id = field.text().await?,
            "fullName" => form.full_name = field.text().await?,
            "phone" => form.phone = field.text().await?,
            "email" => form.email = Some(field.text().await?),
            "address" => form.address = Some(field.text().await?),
            "notes" => form.notes = Some(field.text().await?),
            "utr" => form.utr = field.text().await?,
            other => tracing::debug!(field = %other, "ignoring unknown form field"),
        }
    }

    Ok(Submission { form, documents })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackQuery {
    #[serde(default)]
    request_id: String,
    #[serde(default)]
    phone: String,
}

/// `GET /api/requests/track?requestId=&phone=`
pub async fn track_request(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<RequestView>, ApiError> {
    let view = state.service.track(&query.request_id, &query.phone).await?;
    Ok(Json(view))
}
