pub mod auth;
pub mod blob;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod documents;
pub mod intake;
pub mod notify;
pub mod requests;
pub mod tracking;

use std::sync::Arc;

use osp_core::models::intake::IntakeForm;
use osp_core::models::staff::StaffSubject;
use osp_core::request_id::{RandomRequestIds, RequestIdGenerator};
use osp_core::validation::ValidationEngine;
use osp_core::Result;
use osp_db::{RequestStore, ServiceStore};

use auth::StaffAuthGate;
use blob::BlobStore;
use documents::{DocumentCollector, DocumentPolicy};
use notify::{LogNotifier, Notifier};

/// The request lifecycle, wired to its collaborators.
///
/// Every dependency is injected; nothing here reaches for process globals.
#[derive(Clone)]
pub struct OspService {
    pub(crate) services: Arc<dyn ServiceStore>,
    pub(crate) requests: Arc<dyn RequestStore>,
    pub(crate) auth: Arc<dyn StaffAuthGate>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) ids: Arc<dyn RequestIdGenerator>,
    pub(crate) collector: DocumentCollector,
    pub(crate) intake_rules: Arc<ValidationEngine<IntakeForm>>,
}

impl OspService {
    pub fn new(
        services: Arc<dyn ServiceStore>,
        requests: Arc<dyn RequestStore>,
        blobs: Arc<dyn BlobStore>,
        auth: Arc<dyn StaffAuthGate>,
    ) -> Self {
        Self {
            services,
            requests,
            auth,
            notifier: Arc::new(LogNotifier),
            ids: Arc::new(RandomRequestIds),
            collector: DocumentCollector::new(DocumentPolicy::default(), blobs),
            intake_rules: Arc::new(osp_core::intake_validator()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn RequestIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_document_policy(mut self, policy: DocumentPolicy) -> Self {
        self.collector = self.collector.with_policy(policy);
        self
    }

    pub fn document_policy(&self) -> &DocumentPolicy {
        self.collector.policy()
    }

    /// Staff gate in front of every privileged operation. Transports call it
    /// before decoding anything else from a staff request.
    pub fn authorize(&self, credential: Option<&str>) -> Result<StaffSubject> {
        self.auth.authorize(credential)
    }
}
