//! Ownership checks for create and update requests.
//!
//! A create only needs a resolvable API code. An update additionally needs
//! the API code to resolve to the organisation that created revision 1 of
//! the record, as recorded in the history.

use tracing::{debug, instrument, warn};

use crate::Result;
use crate::credentials::CredentialRegistry;
use crate::error::{StorageError, ValidationError};
use crate::traits::HistoryLookup;
use crate::types::{ApiCode, OrganisationId, TrackingId};

/// Resolves and checks the organisation behind a request.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationValidator<'a> {
    registry: &'a CredentialRegistry,
}

impl<'a> AuthorizationValidator<'a> {
    /// Create a validator resolving organisations through `registry`.
    pub fn new(registry: &'a CredentialRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the organisation for a create request.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidApiCode`] if the code is not issued.
    pub fn authorize_create(&self, api_code: &ApiCode) -> Result<OrganisationId> {
        match self.registry.resolve_organisation(api_code) {
            Some(organisation) => Ok(organisation.clone()),
            None => {
                warn!("Rejected request with unknown api code");
                Err(ValidationError::InvalidApiCode.into())
            }
        }
    }

    /// Resolve the organisation for an update request and check that it
    /// created the record.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidApiCode`] if the code is not issued,
    ///   whether or not the tracking id exists
    /// - [`ValidationError::InvalidTrackingId`] if there is no revision 1
    ///   history entry for the tracking id
    /// - [`ValidationError::OrganisationMismatch`] if the original API code
    ///   resolves to another organisation, or no longer resolves
    /// - storage errors from the lookup are passed through unchanged
    #[instrument(skip_all, fields(%tracking_id))]
    pub async fn authorize_update<H>(
        &self,
        api_code: &ApiCode,
        tracking_id: &TrackingId,
        history: &H,
    ) -> Result<OrganisationId>
    where
        H: HistoryLookup + ?Sized,
    {
        let organisation = self.authorize_create(api_code)?;

        let original = match history.revision_one(tracking_id).await? {
            Some(entry) => entry,
            None => {
                warn!("Rejected update for unknown tracking id");
                return Err(ValidationError::InvalidTrackingId.into());
            }
        };

        if !original.is_original() || original.tracking_id != *tracking_id {
            return Err(StorageError::Integrity {
                tracking_id: tracking_id.clone(),
                reason: format!(
                    "history lookup returned revision {} of {} instead of revision 1",
                    original.revision, original.tracking_id
                ),
            }
            .into());
        }

        let original_organisation = self
            .registry
            .resolve_organisation(&original.receipt.api_code());

        if original_organisation != Some(&organisation) {
            warn!(
                organisation = %organisation,
                original_organisation = ?original_organisation.map(OrganisationId::as_str),
                "Rejected update from a different organisation"
            );
            return Err(ValidationError::OrganisationMismatch.into());
        }

        debug!(organisation = %organisation, "Authorized update");

        Ok(organisation)
    }
}
