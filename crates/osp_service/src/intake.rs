use osp_core::models::intake::IntakeForm;
use osp_core::models::request::{Applicant, Request};
use osp_core::models::service::Service;
use osp_core::validation::{ensure_valid, rules::check_document_sufficiency};
use osp_core::{Error, Result};
use uuid::Uuid;

use crate::documents::UploadedFile;
use crate::notify::LifecycleEvent;
use crate::OspService;

/// Inserts attempted before a run of identifier collisions becomes fatal.
pub const MAX_ID_ATTEMPTS: usize = 3;

/// Everything an applicant sends in one go.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub form: IntakeForm,
    pub documents: Vec<UploadedFile>,
}

impl OspService {
    /// Validates, stores documents, allocates an identifier and persists a
    /// `Pending` request. Returns the public request id.
    ///
    /// Either the request exists with all its documents, or nothing does.
    pub async fn submit_request(&self, submission: Submission) -> Result<String> {
        let Submission { form, documents } = submission;

        // 1. Field rules and upload policy, reported together
        let mut errors = self.intake_rules.run(&form);
        errors.extend(self.collector.inspect(&documents));

        // 2. Service must exist
        let service = match self.resolve_service(&form.service_id).await? {
            Some(service) => service,
            None if errors.is_empty() => {
                return Err(Error::NotFound(format!("service {}", form.service_id.trim())));
            }
            None => return Err(Error::Validation(errors)),
        };

        // 3. Document presence against the service checklist
        errors.extend(check_document_sufficiency(&service, documents.len()));
        ensure_valid(errors)?;

        // 4. Upload, then persist. Uploaded blobs are discarded on any failure.
        let stored = self.collector.store(documents).await?;
        let mut request = Request::pending(
            service.id,
            applicant_from(&form),
            form.utr.trim().to_string(),
            form.notes().map(str::to_string),
            stored,
        );

        if let Err(e) = self.persist_with_fresh_id(&mut request).await {
            self.collector.discard(&request.documents).await;
            return Err(e);
        }

        tracing::info!(
            request_id = %request.request_id,
            service = %service.name,
            documents = request.documents.len(),
            "request submitted"
        );
        self.notifier.notify(&LifecycleEvent::RequestCreated {
            request_id: request.request_id.clone(),
            service: service.name.clone(),
            phone: request.applicant.phone.clone(),
        });

        Ok(request.request_id)
    }

    async fn resolve_service(&self, service_id: &str) -> Result<Option<Service>> {
        match Uuid::parse_str(service_id.trim()) {
            Ok(id) => self.services.get(id).await,
            Err(_) => Ok(None),
        }
    }

    /// Identifier collisions are retried with a fresh id; every other
    /// failure, including a reused UTR, is returned as is.
    async fn persist_with_fresh_id(&self, request: &mut Request) -> Result<()> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            request.request_id = self.ids.generate();
            match self.requests.create(request).await {
                Err(Error::Conflict(kind)) if kind.is_retryable() => {
                    tracing::warn!(attempt, request_id = %request.request_id, "request id collision");
                }
                other => return other,
            }
        }

        Err(Error::Internal(format!(
            "could not allocate a unique request id in {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }
}

fn applicant_from(form: &IntakeForm) -> Applicant {
    Applicant {
        full_name: form.full_name.trim().to_string(),
        phone: form.phone.clone(),
        email: form.email().map(str::to_string),
        address: form.address().map(str::to_string),
    }
}
