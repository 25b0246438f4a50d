use osp_core::models::service::{Service, ServiceDraft};
use osp_core::{ConflictKind, Error, Result};
use uuid::Uuid;

use crate::OspService;

/// The services a fresh deployment offers.
pub fn default_catalog() -> Vec<ServiceDraft> {
    vec![
        ServiceDraft::new(
            "PAN Card Application",
            "New PAN / Correction / Reprint",
            299,
            &[
                "Aadhaar Card (Front & Back)",
                "Passport Size Photo",
                "Address Proof (if different)",
            ],
        ),
        ServiceDraft::new(
            "Scholarship Application",
            "State & central scholarship schemes assistance",
            0,
            &[
                "Aadhaar Card",
                "Income Certificate",
                "Caste/Community Certificate (if applicable)",
                "Bank Passbook (first page)",
                "Recent Marksheet",
            ],
        ),
        ServiceDraft::new(
            "Caste Certificate",
            "Application for Caste Certificate",
            149,
            &[
                "Father caste certificate",
                "Proof of Address (POA)",
                "Proof of Date of Birth",
            ],
        ),
        ServiceDraft::new(
            "Income Certificate",
            "Apply through e-district channel",
            149,
            &[
                "Aadhaar Card",
                "Income Proof (salary slip/affidavit)",
                "Address Proof",
                "Passport Size Photo",
            ],
        ),
    ]
}

impl OspService {
    /// Public catalog, sorted by name.
    pub async fn list_services(&self) -> Result<Vec<Service>> {
        self.services.list().await
    }

    pub async fn create_service(
        &self,
        credential: Option<&str>,
        draft: ServiceDraft,
    ) -> Result<Service> {
        let staff = self.authorize(credential)?;
        osp_core::service_validator().validate(&draft)?;

        let service = draft.into_service();
        self.services.create(&service).await?;
        tracing::info!(service = %service.name, staff = %staff.subject, "service created");
        Ok(service)
    }

    pub async fn update_service(
        &self,
        credential: Option<&str>,
        id: Uuid,
        draft: ServiceDraft,
    ) -> Result<Service> {
        let staff = self.authorize(credential)?;
        osp_core::service_validator().validate(&draft)?;

        let existing = self
            .services
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("service {}", id)))?;
        let service = draft.apply_to(&existing);
        self.services.update(&service).await?;
        tracing::info!(service = %service.name, staff = %staff.subject, "service updated");
        Ok(service)
    }

    /// `NotFound` when absent (callers may treat that as already deleted);
    /// `Conflict(ServiceInUse)` while requests still reference it.
    pub async fn delete_service(&self, credential: Option<&str>, id: Uuid) -> Result<()> {
        let staff = self.authorize(credential)?;
        self.services.delete(id).await?;
        tracing::info!(service_id = %id, staff = %staff.subject, "service deleted");
        Ok(())
    }

    /// Installs [`default_catalog`] entries whose names are not taken yet.
    /// Operator path, run from the CLI. Returns how many were inserted.
    pub async fn seed_catalog(&self) -> Result<usize> {
        let mut inserted = 0;
        for draft in default_catalog() {
            let service = draft.into_service();
            match self.services.create(&service).await {
                Ok(()) => {
                    tracing::info!(service = %service.name, "seeded");
                    inserted += 1;
                }
                Err(Error::Conflict(ConflictKind::ServiceName)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(inserted)
    }
}
