//! Process-local stores for tests and `OSP_STORAGE=memory` development runs.
//!
//! One mutex guards the catalog and the requests together so that the
//! uniqueness checks, the service-reference check and the insert happen as a
//! single step, mirroring the constraints the Postgres schema enforces.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use osp_core::models::request::{Request, RequestStatus};
use osp_core::models::service::Service;
use osp_core::{ConflictKind, Error, Result};
use parking_lot::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{RequestStore, ServiceStore};

#[derive(Default)]
struct State {
    services: HashMap<Uuid, Service>,
    requests: HashMap<Uuid, Request>,
    // public request id -> internal id
    by_request_id: HashMap<String, Uuid>,
    utrs: HashSet<String>,
}

impl State {
    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.services
            .values()
            .any(|s| s.name == name && Some(s.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Service>> {
        let state = self.state.lock();
        let mut services: Vec<Service> = state.services.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>> {
        Ok(self.state.lock().services.get(&id).cloned())
    }

    async fn create(&self, service: &Service) -> Result<()> {
        let mut state = self.state.lock();
        if state.name_taken(&service.name, None) {
            return Err(Error::Conflict(ConflictKind::ServiceName));
        }
        state.services.insert(service.id, service.clone());
        Ok(())
    }

    async fn update(&self, service: &Service) -> Result<()> {
        let mut state = self.state.lock();
        if !state.services.contains_key(&service.id) {
            return Err(Error::NotFound(format!("service {}", service.id)));
        }
        if state.name_taken(&service.name, Some(service.id)) {
            return Err(Error::Conflict(ConflictKind::ServiceName));
        }
        state.services.insert(service.id, service.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        if !state.services.contains_key(&id) {
            return Err(Error::NotFound(format!("service {}", id)));
        }
        if state.requests.values().any(|r| r.service_id == id) {
            return Err(Error::Conflict(ConflictKind::ServiceInUse));
        }
        state.services.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn create(&self, request: &Request) -> Result<()> {
        let mut state = self.state.lock();
        if state.by_request_id.contains_key(&request.request_id) {
            return Err(Error::Conflict(ConflictKind::RequestId));
        }
        if state.utrs.contains(&request.utr) {
            return Err(Error::Conflict(ConflictKind::Utr));
        }
        if !state.services.contains_key(&request.service_id) {
            return Err(Error::NotFound(format!("service {}", request.service_id)));
        }

        state.by_request_id.insert(request.request_id.clone(), request.id);
        state.utrs.insert(request.utr.clone());
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Request> {
        self.state
            .lock()
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("request {}", id)))
    }

    async fn get_by_request_id_and_phone(&self, request_id: &str, phone: &str) -> Result<Request> {
        let state = self.state.lock();
        state
            .by_request_id
            .get(request_id)
            .and_then(|id| state.requests.get(id))
            .filter(|r| r.applicant.phone == phone)
            .cloned()
            .ok_or_else(|| Error::NotFound("request".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Request>> {
        let state = self.state.lock();
        let mut requests: Vec<Request> = state.requests.values().cloned().collect();
        // v7 ids are time-ordered, so they break ties within one timestamp.
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    async fn set_status(&self, id: Uuid, status: RequestStatus) -> Result<Request> {
        let mut state = self.state.lock();
        let request = state
            .requests
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("request {}", id)))?;
        request.status = status;
        request.updated_at = OffsetDateTime::now_utc();
        Ok(request.clone())
    }
}
