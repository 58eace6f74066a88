pub mod aggregate;
pub mod classify;
pub mod diagnostics;
mod error;
pub mod identity;
pub mod index;
pub mod model;
pub mod overrides;
pub mod resolve;
pub mod sort_key;

pub use aggregate::{
    FoilBatch, FoilStatus, OfficerRef, OfficerStatus, ReconcileOptions, Report, Summary,
    reconcile,
};
pub use classify::{ComplaintSet, ComplaintStatus, ReceivedIndex, classify};
pub use diagnostics::{Diagnostics, Warning};
pub use error::CoreError;
pub use identity::IdentityKey;
pub use index::OfficerIndex;
pub use model::{
    Allegation, CanonicalDb, Complaint, ComplaintId, ExternalRecord, Officer, OfficerId,
    ReceivedReport, requested_records,
};
pub use overrides::ManualOverrides;
pub use resolve::{ResolveError, Resolver};
pub use sort_key::{BLANK_FOIL_ID, ComplaintOrder, compare_complaint_ids, compare_foil_ids};
