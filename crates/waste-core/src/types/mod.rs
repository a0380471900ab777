//! Core identifier types.
//!
//! These types enforce their invariants at construction time, so an
//! invalid tracking id or organisation id cannot be passed around.

mod api_code;
mod organisation_id;
mod tracking_id;

pub use api_code::ApiCode;
pub use organisation_id::OrganisationId;
pub use tracking_id::TrackingId;
