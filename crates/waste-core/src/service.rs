//! Create and update orchestration for receipt movements.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::authorization::AuthorizationValidator;
use crate::credentials::CredentialRegistry;
use crate::repo::{Receipt, ReceiptPath, UpdateResult, WasteMovementRecord};
use crate::traits::RecordStore;
use crate::types::TrackingId;
use crate::{Error, Result};

/// Authorizes receipt movement requests and applies them to a store.
#[derive(Debug)]
pub struct MovementService<S> {
    registry: Arc<CredentialRegistry>,
    store: S,
}

impl<S: RecordStore> MovementService<S> {
    /// Create a service checking requests against `registry` and applying
    /// them to `store`.
    pub fn new(registry: Arc<CredentialRegistry>, store: S) -> Self {
        Self { registry, store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn validator(&self) -> AuthorizationValidator<'_> {
        AuthorizationValidator::new(&self.registry)
    }

    /// Create a waste input from a receipt.
    ///
    /// Nothing is written unless the receipt's API code is issued.
    #[instrument(skip(self, receipt))]
    pub async fn create_receipt_movement(
        &self,
        tracking_id: &TrackingId,
        receipt: Receipt,
    ) -> Result<WasteMovementRecord> {
        let organisation = self.validator().authorize_create(&receipt.api_code())?;
        let record = self.store.create(tracking_id, receipt).await?;

        debug!(organisation = %organisation, "Created receipt movement");

        Ok(record)
    }

    /// Replace the movement section of an existing waste input.
    ///
    /// The movement's API code must belong to the organisation that created
    /// the record.
    ///
    /// # Errors
    ///
    /// Authorization failures, [`Error::NotFound`] when no current record
    /// exists, and storage failures.
    #[instrument(skip(self, movement))]
    pub async fn update_receipt_movement(
        &self,
        tracking_id: &TrackingId,
        movement: Value,
    ) -> Result<UpdateResult> {
        let api_code = Receipt::movement_api_code(&movement)?;
        let organisation = self
            .validator()
            .authorize_update(&api_code, tracking_id, &self.store)
            .await?;

        let result = self
            .store
            .update(tracking_id, &movement, &ReceiptPath::movement())
            .await?;

        if result.matched_count == 0 {
            return Err(Error::NotFound {
                tracking_id: tracking_id.clone(),
            });
        }

        debug!(
            organisation = %organisation,
            revision = ?result.revision,
            "Updated receipt movement"
        );

        Ok(result)
    }
}
