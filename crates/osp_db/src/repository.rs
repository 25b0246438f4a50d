use std::collections::HashMap;

use async_trait::async_trait;
use osp_core::models::document::Document;
use osp_core::models::request::{Applicant, Request, RequestStatus};
use osp_core::models::service::Service;
use osp_core::{ConflictKind, Error, Result};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{RequestStore, ServiceStore};

// Constraint names from schema/tables/*.sql
const SERVICES_NAME_KEY: &str = "services_name_key";
const REQUESTS_REQUEST_ID_KEY: &str = "requests_request_id_key";
const REQUESTS_UTR_KEY: &str = "requests_utr_key";

const SERVICE_COLUMNS: &str =
    "id, name, description, required_documents, fee, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, request_id, service_id, applicant_full_name, applicant_phone, \
     applicant_email, applicant_address, utr, notes, status, created_at, updated_at";

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, FromRow)]
struct ServiceRow {
    id: Uuid,
    name: String,
    description: String,
    required_documents: Vec<String>,
    fee: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            name: row.name,
            description: row.description,
            required_documents: row.required_documents,
            fee: row.fee,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RequestRow {
    id: Uuid,
    request_id: String,
    service_id: Uuid,
    applicant_full_name: String,
    applicant_phone: String,
    applicant_email: Option<String>,
    applicant_address: Option<String>,
    utr: String,
    notes: Option<String>,
    status: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl RequestRow {
    fn into_request(self, documents: Vec<Document>) -> Result<Request> {
        let status: RequestStatus = self.status.parse().map_err(|_| {
            Error::Database(format!(
                "request {} has unknown status '{}'",
                self.request_id, self.status
            ))
        })?;

        Ok(Request {
            id: self.id,
            request_id: self.request_id,
            service_id: self.service_id,
            applicant: Applicant {
                full_name: self.applicant_full_name,
                phone: self.applicant_phone,
                email: self.applicant_email,
                address: self.applicant_address,
            },
            utr: self.utr,
            notes: self.notes,
            documents,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    request_id: Uuid,
    url: String,
    original_name: String,
    mime_type: String,
    size_bytes: i64,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            url: row.url,
            original_name: row.original_name,
            mime_type: row.mime_type,
            size: u64::try_from(row.size_bytes).unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Turns unique violations into `Conflict`s by constraint name; everything
/// else becomes an opaque database error.
fn map_db_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(REQUESTS_REQUEST_ID_KEY) => return Error::Conflict(ConflictKind::RequestId),
                Some(REQUESTS_UTR_KEY) => return Error::Conflict(ConflictKind::Utr),
                Some(SERVICES_NAME_KEY) => return Error::Conflict(ConflictKind::ServiceName),
                _ => {}
            }
        }
    }
    Error::Database(err.to_string())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceStore for ServiceRepository {
    async fn list(&self) -> Result<Vec<Service>> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {} FROM services ORDER BY name ASC",
            SERVICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Service::from))
    }

    async fn create(&self, service: &Service) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO services
            (id, name, description, required_documents, fee, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(&service.required_documents)
        .bind(service.fee)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn update(&self, service: &Service) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE services
            SET name = $2, description = $3, required_documents = $4, fee = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(&service.required_documents)
        .bind(service.fee)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("service {}", service.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    Error::Conflict(ConflictKind::ServiceInUse)
                } else {
                    map_db_error(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("service {}", id)));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the documents of every listed request, in upload order.
    async fn documents_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Document>>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT request_id, url, original_name, mime_type, size_bytes
            FROM request_documents
            WHERE request_id = ANY($1)
            ORDER BY request_id, position
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut grouped: HashMap<Uuid, Vec<Document>> = HashMap::new();
        for row in rows {
            grouped.entry(row.request_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn hydrate(&self, row: RequestRow) -> Result<Request> {
        let mut documents = self.documents_for(&[row.id]).await?;
        let docs = documents.remove(&row.id).unwrap_or_default();
        row.into_request(docs)
    }
}

#[async_trait]
impl RequestStore for RequestRepository {
    /// Request row and documents go in together or not at all.
    async fn create(&self, request: &Request) -> Result<()> {
        // If anything errors after this, 'tx' drops and rolls back automatically.
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO requests
            (id, request_id, service_id, applicant_full_name, applicant_phone,
             applicant_email, applicant_address, utr, notes, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(request.id)
        .bind(&request.request_id)
        .bind(request.service_id)
        .bind(&request.applicant.full_name)
        .bind(&request.applicant.phone)
        .bind(&request.applicant.email)
        .bind(&request.applicant.address)
        .bind(&request.utr)
        .bind(&request.notes)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                Error::NotFound(format!("service {}", request.service_id))
            } else {
                map_db_error(e)
            }
        })?;

        for (position, doc) in request.documents.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO request_documents
                (request_id, position, url, original_name, mime_type, size_bytes)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(request.id)
            .bind(position as i32)
            .bind(&doc.url)
            .bind(&doc.original_name)
            .bind(&doc.mime_type)
            .bind(i64::try_from(doc.size).unwrap_or(i64::MAX))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Request> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| Error::NotFound(format!("request {}", id)))?;

        self.hydrate(row).await
    }

    async fn get_by_request_id_and_phone(&self, request_id: &str, phone: &str) -> Result<Request> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE request_id = $1 AND applicant_phone = $2",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| Error::NotFound("request".to_string()))?;

        self.hydrate(row).await
    }

    async fn list_all(&self) -> Result<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests ORDER BY created_at DESC, id DESC",
            REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut documents = self.documents_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let docs = documents.remove(&row.id).unwrap_or_default();
                row.into_request(docs)
            })
            .collect()
    }

    async fn set_status(&self, id: Uuid, status: RequestStatus) -> Result<Request> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "UPDATE requests SET status = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| Error::NotFound(format!("request {}", id)))?;

        self.hydrate(row).await
    }
}
