use async_trait::async_trait;
use osp_core::models::request::{Request, RequestStatus};
use osp_core::models::service::Service;
use osp_core::Result;
use uuid::Uuid;

/// Persistence for the service catalog.
#[async_trait]
pub trait ServiceStore: Send + Sync {
    /// Every service, ordered by name.
    async fn list(&self) -> Result<Vec<Service>>;

    async fn get(&self, id: Uuid) -> Result<Option<Service>>;

    /// Fails with `Conflict(ServiceName)` if the name is taken.
    async fn create(&self, service: &Service) -> Result<()>;

    /// Replaces the stored row with the same id. `NotFound` if absent,
    /// `Conflict(ServiceName)` if the new name belongs to another service.
    async fn update(&self, service: &Service) -> Result<()>;

    /// `NotFound` if absent, `Conflict(ServiceInUse)` while requests point at it.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Persistence for requests. Uniqueness of `request_id` and `utr` is checked
/// and inserted in one atomic step by every implementation.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Inserts the request together with its documents. Fails with
    /// `Conflict(RequestId)` or `Conflict(Utr)` and leaves nothing behind.
    async fn create(&self, request: &Request) -> Result<()>;

    async fn get_by_id(&self, id: Uuid) -> Result<Request>;

    /// Exact match on both fields, `NotFound` otherwise.
    async fn get_by_request_id_and_phone(&self, request_id: &str, phone: &str) -> Result<Request>;

    /// Newest first.
    async fn list_all(&self) -> Result<Vec<Request>>;

    /// Last write wins; bumps `updated_at`.
    async fn set_status(&self, id: Uuid, status: RequestStatus) -> Result<Request>;
}
