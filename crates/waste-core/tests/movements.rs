//! End-to-end ownership tests for receipt movements.
//!
//! These tests run the create/update flow against the in-memory store with
//! a registry decoded from a base64 configuration value.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use waste_core::error::ValidationError;
use waste_core::{
    CredentialRegistry, Error, ErrorResponse, MemoryStore, MovementService, Receipt, RecordStore,
    TrackingId, UpdateResult,
};

fn service() -> MovementService<MemoryStore> {
    let encoded = STANDARD.encode("qwe=qwe,asd=asd,zxc=zxc");
    let registry = CredentialRegistry::load(&encoded).unwrap();
    MovementService::new(Arc::new(registry), MemoryStore::new())
}

fn movement(api_code: &str) -> Value {
    json!({
        "receivingSiteId": "string",
        "receiverReference": "string",
        "specialHandlingRequirements": "string",
        "apiCode": api_code
    })
}

fn receipt(api_code: &str) -> Receipt {
    Receipt::from_movement(movement(api_code)).unwrap()
}

fn message(err: &Error) -> String {
    ErrorResponse::from(err).message
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_records_revision_one_with_api_code() {
    let service = service();
    let id = TrackingId::new("25KLD3AB").unwrap();

    let record = service
        .create_receipt_movement(&id, receipt("asd"))
        .await
        .unwrap();

    assert_eq!(record.revision, 1);
    assert_eq!(record.created_at, record.last_updated_at);
    assert_eq!(record.receipt.as_value(), &json!({ "movement": movement("asd") }));

    let original = service.store().get_revision_one(&id).await.unwrap().unwrap();
    assert_eq!(original.revision, 1);
    assert_eq!(original.receipt.api_code().as_str(), "asd");
}

#[tokio::test]
async fn test_create_with_invalid_api_code_writes_nothing() {
    let service = service();
    let id = TrackingId::new("25KLD3AC").unwrap();

    let err = service
        .create_receipt_movement(&id, receipt("invalid"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(ValidationError::InvalidApiCode)));
    assert_eq!(
        ErrorResponse::from(&err),
        ErrorResponse::new(400, "ValidationError", "apiCode must be valid")
    );
    assert!(service.store().get(&id).await.unwrap().is_none());
    assert!(service.store().history(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_existing_tracking_id_conflicts() {
    let service = service();
    let id = TrackingId::new("25KLD3AD").unwrap();

    service
        .create_receipt_movement(&id, receipt("asd"))
        .await
        .unwrap();
    let err = service
        .create_receipt_movement(&id, receipt("zxc"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Conflict { .. }));
    assert_eq!(ErrorResponse::from(&err).status_code, 409);

    let original = service.store().get_revision_one(&id).await.unwrap().unwrap();
    assert_eq!(original.receipt.api_code().as_str(), "asd");
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_by_owner_then_rejects_other_organisation() {
    let service = service();
    let id = TrackingId::new("25KLD3AE").unwrap();

    service
        .create_receipt_movement(&id, receipt("asd"))
        .await
        .unwrap();

    let result = service
        .update_receipt_movement(&id, movement("asd"))
        .await
        .unwrap();
    assert_eq!(result, UpdateResult::matched(2));

    let err = service
        .update_receipt_movement(&id, movement("zxc"))
        .await
        .unwrap_err();
    assert_eq!(
        message(&err),
        "apiCode must relate to the same Organisation that created the original waste item record"
    );
    assert_eq!(ErrorResponse::from(&err).status_code, 400);

    let current = service.store().get(&id).await.unwrap().unwrap();
    assert_eq!(current.revision, 2);
}

#[tokio::test]
async fn test_update_never_created_tracking_id() {
    let service = service();
    let id = TrackingId::new("NEVERCREATED").unwrap();

    let err = service
        .update_receipt_movement(&id, movement("asd"))
        .await
        .unwrap_err();

    assert_eq!(message(&err), "wasteTrackingId must be valid");
}

#[tokio::test]
async fn test_update_with_invalid_api_code_regardless_of_tracking_id() {
    let service = service();
    let known = TrackingId::new("25KLD3AF").unwrap();
    let unknown = TrackingId::new("25KLD3AG").unwrap();

    service
        .create_receipt_movement(&known, receipt("qwe"))
        .await
        .unwrap();

    for id in [&known, &unknown] {
        let err = service
            .update_receipt_movement(id, movement("invalid"))
            .await
            .unwrap_err();
        assert_eq!(message(&err), "apiCode must be valid");
    }
}

#[tokio::test]
async fn test_many_updates_preserve_revision_one() {
    let service = service();
    let id = TrackingId::new("25KLD3AH").unwrap();
    let updates = 7u32;

    service
        .create_receipt_movement(&id, receipt("zxc"))
        .await
        .unwrap();
    let original = service.store().get_revision_one(&id).await.unwrap();

    for n in 0..updates {
        let mut update = movement("zxc");
        update["receiverReference"] = json!(format!("update-{n}"));
        service.update_receipt_movement(&id, update).await.unwrap();
    }

    let current = service.store().get(&id).await.unwrap().unwrap();
    assert_eq!(current.revision, updates + 1);
    assert_eq!(current.receipt.movement()["receiverReference"], "update-6");
    assert_eq!(service.store().get_revision_one(&id).await.unwrap(), original);

    let revisions: Vec<u32> = service
        .store()
        .history(&id)
        .await
        .unwrap()
        .iter()
        .map(|entry| entry.revision)
        .collect();
    assert_eq!(revisions, (1..=updates + 1).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_ownership_follows_revision_one_not_latest_api_code() {
    // Two codes for one organisation; the latest revision carries the second.
    let encoded = STANDARD.encode("code-a=org-1,code-b=org-1,code-c=org-2");
    let registry = CredentialRegistry::load(&encoded).unwrap();
    let service = MovementService::new(Arc::new(registry), MemoryStore::new());
    let id = TrackingId::new("25KLD3AJ").unwrap();

    service
        .create_receipt_movement(&id, receipt("code-a"))
        .await
        .unwrap();
    service
        .update_receipt_movement(&id, movement("code-b"))
        .await
        .unwrap();

    let err = service
        .update_receipt_movement(&id, movement("code-c"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::OrganisationMismatch)
    ));

    let result = service
        .update_receipt_movement(&id, movement("code-a"))
        .await
        .unwrap();
    assert_eq!(result.revision, Some(3));
}
