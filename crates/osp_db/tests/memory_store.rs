use osp_core::models::document::Document;
use osp_core::models::request::{Applicant, Request, RequestStatus};
use osp_core::models::service::{Service, ServiceDraft};
use osp_core::{ConflictKind, Error};
use osp_db::{MemoryStore, RequestStore, ServiceStore};
use uuid::Uuid;

fn service(name: &str) -> Service {
    ServiceDraft::new(name, "", 149, &["Aadhaar Card"]).into_service()
}

fn request(service_id: Uuid, request_id: &str, utr: &str) -> Request {
    let mut request = Request::pending(
        service_id,
        Applicant {
            full_name: "A B".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            address: None,
        },
        utr.to_string(),
        None,
        vec![Document {
            url: "memory://osp-requests/a.pdf".to_string(),
            original_name: "a.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 10,
        }],
    );
    request.request_id = request_id.to_string();
    request
}

#[tokio::test]
async fn catalog_is_sorted_by_name() {
    let store = MemoryStore::new();
    for name in ["Income Certificate", "Caste Certificate", "PAN Card Application"] {
        ServiceStore::create(&store, &service(name)).await.unwrap();
    }

    let names: Vec<String> = store.list().await.unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec!["Caste Certificate", "Income Certificate", "PAN Card Application"]
    );
}

#[tokio::test]
async fn duplicate_service_name_conflicts() {
    let store = MemoryStore::new();
    ServiceStore::create(&store, &service("PAN Card")).await.unwrap();

    let err = ServiceStore::create(&store, &service("PAN Card")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(ConflictKind::ServiceName)));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rename_onto_existing_name_conflicts() {
    let store = MemoryStore::new();
    let pan = service("PAN Card");
    let income = service("Income Certificate");
    ServiceStore::create(&store, &pan).await.unwrap();
    ServiceStore::create(&store, &income).await.unwrap();

    let renamed = ServiceDraft::new("PAN Card", "", 0, &[]).apply_to(&income);
    let err = store.update(&renamed).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(ConflictKind::ServiceName)));

    // Keeping its own name is fine.
    let repriced = ServiceDraft::new("Income Certificate", "", 99, &[]).apply_to(&income);
    store.update(&repriced).await.unwrap();
    assert_eq!(store.get(income.id).await.unwrap().unwrap().fee, 99);
}

#[tokio::test]
async fn delete_reports_missing_and_in_use() {
    let store = MemoryStore::new();
    let pan = service("PAN Card");
    ServiceStore::create(&store, &pan).await.unwrap();
    RequestStore::create(&store, &request(pan.id, "REQ-AAAAAAAAAA", "UTR1"))
        .await
        .unwrap();

    let err = store.delete(pan.id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(ConflictKind::ServiceInUse)));

    let err = store.delete(Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn request_uniqueness_is_enforced_per_field() {
    let store = MemoryStore::new();
    let pan = service("PAN Card");
    ServiceStore::create(&store, &pan).await.unwrap();
    RequestStore::create(&store, &request(pan.id, "REQ-AAAAAAAAAA", "UTR1"))
        .await
        .unwrap();

    let err = RequestStore::create(&store, &request(pan.id, "REQ-AAAAAAAAAA", "UTR2"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(ConflictKind::RequestId)));

    let err = RequestStore::create(&store, &request(pan.id, "REQ-BBBBBBBBBB", "UTR1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(ConflictKind::Utr)));

    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn request_must_reference_an_existing_service() {
    let store = MemoryStore::new();
    let err = RequestStore::create(&store, &request(Uuid::now_v7(), "REQ-AAAAAAAAAA", "UTR1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn tracking_lookup_needs_both_fields() {
    let store = MemoryStore::new();
    let pan = service("PAN Card");
    ServiceStore::create(&store, &pan).await.unwrap();
    RequestStore::create(&store, &request(pan.id, "REQ-AAAAAAAAAA", "UTR1"))
        .await
        .unwrap();

    let found = store
        .get_by_request_id_and_phone("REQ-AAAAAAAAAA", "9876543210")
        .await
        .unwrap();
    assert_eq!(found.documents.len(), 1);

    for (id, phone) in [
        ("REQ-AAAAAAAAAA", "9876543211"),
        ("REQ-BBBBBBBBBB", "9876543210"),
    ] {
        let err = store.get_by_request_id_and_phone(id, phone).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}

#[tokio::test]
async fn set_status_is_last_write_wins() {
    let store = MemoryStore::new();
    let pan = service("PAN Card");
    ServiceStore::create(&store, &pan).await.unwrap();
    let created = request(pan.id, "REQ-AAAAAAAAAA", "UTR1");
    RequestStore::create(&store, &created).await.unwrap();

    store.set_status(created.id, RequestStatus::Verified).await.unwrap();
    let updated = store.set_status(created.id, RequestStatus::Rejected).await.unwrap();

    assert_eq!(updated.status, RequestStatus::Rejected);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(store.get_by_id(created.id).await.unwrap().status, RequestStatus::Rejected);

    let err = store.set_status(Uuid::now_v7(), RequestStatus::Verified).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn list_all_is_newest_first() {
    let store = MemoryStore::new();
    let pan = service("PAN Card");
    ServiceStore::create(&store, &pan).await.unwrap();

    let first = request(pan.id, "REQ-AAAAAAAAAA", "UTR1");
    let second = request(pan.id, "REQ-BBBBBBBBBB", "UTR2");
    RequestStore::create(&store, &first).await.unwrap();
    RequestStore::create(&store, &second).await.unwrap();

    let ids: Vec<String> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.request_id)
        .collect();
    assert_eq!(ids, vec!["REQ-BBBBBBBBBB", "REQ-AAAAAAAAAA"]);
}
