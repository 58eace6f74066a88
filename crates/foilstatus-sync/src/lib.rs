//! Collaborators feeding a reconciliation run: snapshot, roster, and received-report listing.

mod error;
pub mod files;
pub mod listing;
pub mod roster;

#[cfg(feature = "http")]
pub mod http;

pub use error::SyncError;
pub use files::{load_overrides, load_received, load_roster, load_snapshot};
pub use listing::{StoredFile, complaint_id_from_file_name, reports_in_folder};
pub use roster::parse_roster;

#[cfg(feature = "http")]
pub use http::{DriveClient, fetch_roster};
