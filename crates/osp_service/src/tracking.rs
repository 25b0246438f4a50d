use osp_core::models::request::Request;
use osp_core::models::service::Service;
use osp_core::request_id::{is_well_formed, normalize};
use osp_core::validation::rules::is_valid_phone;
use osp_core::{Error, Result};
use serde::Serialize;

use crate::OspService;

// Same text whichever half was wrong.
const NO_MATCH: &str = "no request matches that request id and phone number";

/// A request as shown outside the store, with its service resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    #[serde(flatten)]
    pub request: Request,
    pub service: Option<Service>,
}

/// Projection for the unauthenticated tracking surface. Any field that should
/// stay staff-only gets stripped here.
pub fn public_view(request: Request, service: Option<Service>) -> RequestView {
    RequestView { request, service }
}

impl OspService {
    /// Public status lookup. Both the request id and the applicant's phone
    /// must match the same request; otherwise `NotFound` with no hint as to
    /// which one was wrong.
    pub async fn track(&self, request_id: &str, phone: &str) -> Result<RequestView> {
        let request_id = normalize(request_id);
        let phone = phone.trim();
        if !is_well_formed(&request_id) || !is_valid_phone(phone) {
            return Err(Error::NotFound(NO_MATCH.to_string()));
        }

        let request = self
            .requests
            .get_by_request_id_and_phone(&request_id, phone)
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound(NO_MATCH.to_string()),
                other => other,
            })?;

        let service = self.services.get(request.service_id).await?;
        Ok(public_view(request, service))
    }
}
