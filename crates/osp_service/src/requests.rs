use std::collections::HashMap;

use osp_core::models::request::RequestStatus;
use osp_core::Result;
use uuid::Uuid;

use crate::notify::LifecycleEvent;
use crate::tracking::RequestView;
use crate::OspService;

// Staff-side request operations. Each one authorizes before touching the store.
impl OspService {
    /// All requests, newest first, with their services resolved.
    pub async fn list_requests(&self, credential: Option<&str>) -> Result<Vec<RequestView>> {
        self.authorize(credential)?;

        let requests = self.requests.list_all().await?;
        let services: HashMap<Uuid, _> = self
            .services
            .list()
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(requests
            .into_iter()
            .map(|request| {
                let service = services.get(&request.service_id).cloned();
                RequestView { request, service }
            })
            .collect())
    }

    pub async fn get_request(&self, credential: Option<&str>, id: Uuid) -> Result<RequestView> {
        self.authorize(credential)?;

        let request = self.requests.get_by_id(id).await?;
        let service = self.services.get(request.service_id).await?;
        Ok(RequestView { request, service })
    }

    /// Moves a request to any of the six statuses, from any status.
    pub async fn update_status(
        &self,
        credential: Option<&str>,
        id: Uuid,
        status: &str,
    ) -> Result<RequestView> {
        let staff = self.authorize(credential)?;
        let status: RequestStatus = status.trim().parse()?;

        let request = self.requests.set_status(id, status).await?;
        tracing::info!(
            request_id = %request.request_id,
            %status,
            staff = %staff.subject,
            "status updated"
        );
        self.notifier.notify(&LifecycleEvent::StatusChanged {
            request_id: request.request_id.clone(),
            phone: request.applicant.phone.clone(),
            status,
        });

        // The write has landed; a failed lookup only loses the service detail.
        let service = match self.services.get(request.service_id).await {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    error = %e,
                    "status updated but service lookup failed"
                );
                None
            }
        };
        Ok(RequestView { request, service })
    }
}
