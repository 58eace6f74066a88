//! Local-file loaders for every reconciliation input.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use foilstatus_core::{CanonicalDb, ExternalRecord, ManualOverrides, ReceivedReport};
use tracing::info;

use crate::error::SyncError;
use crate::listing::parse_received_json;
use crate::roster::parse_roster;

fn open(path: &Path) -> Result<BufReader<File>, SyncError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Load the canonical officer/complaint snapshot.
pub fn load_snapshot(path: &Path) -> Result<CanonicalDb, SyncError> {
    let db = CanonicalDb::from_reader(open(path)?)?;
    info!(
        path = %path.display(),
        officers = db.officers.len(),
        complaints = db.complaints.len(),
        "loaded canonical snapshot"
    );
    Ok(db)
}

/// Load a roster CSV, keeping requested rows only.
pub fn load_roster(path: &Path) -> Result<Vec<ExternalRecord>, SyncError> {
    parse_roster(open(path)?)
}

/// Load an offline received-report listing.
pub fn load_received(path: &Path) -> Result<Vec<ReceivedReport>, SyncError> {
    let reports = parse_received_json(open(path)?)?;
    info!(path = %path.display(), reports = reports.len(), "loaded received listing");
    Ok(reports)
}

/// Merge an override file into `overrides`.
pub fn load_overrides(path: &Path, overrides: &mut ManualOverrides) -> Result<(), SyncError> {
    let json = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let read = overrides.extend_from_json_str(&json)?;
    info!(path = %path.display(), entries = read, total = overrides.len(), "loaded overrides");
    Ok(())
}
