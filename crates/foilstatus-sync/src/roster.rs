//! Request-tracking roster, exported from the tracking sheet as CSV.

use std::io::Read;

use foilstatus_core::ExternalRecord;
use serde::Deserialize;
use tracing::info;

use crate::error::SyncError;

/// One sheet row, keyed by the sheet's own column headers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RosterRow {
    first_name: Option<String>,
    last_name: Option<String>,
    rank: Option<String>,
    command: Option<String>,
    shield_no: Option<String>,
    #[serde(rename = "Requester")]
    requester: Option<String>,
    #[serde(rename = "CCRB Response Deadline")]
    deadline_date: Option<String>,
    #[serde(rename = "Received")]
    received_date: Option<String>,
    #[serde(rename = "Submitted Date")]
    submitted_date: Option<String>,
    #[serde(rename = "FOIL Id")]
    foil_id: Option<String>,
}

impl From<RosterRow> for ExternalRecord {
    fn from(row: RosterRow) -> Self {
        Self {
            last_name: cell(row.last_name).unwrap_or_default(),
            first_name: cell(row.first_name).unwrap_or_default(),
            shield_no: cell(row.shield_no),
            requester: cell(row.requester),
            foil_id: cell(row.foil_id),
            submitted_date: cell(row.submitted_date),
            deadline_date: cell(row.deadline_date),
            rank: cell(row.rank),
            command: cell(row.command),
            received_date: cell(row.received_date),
        }
    }
}

/// Parse every roster row, requested or not.
pub fn parse_roster_all<R: Read>(reader: R) -> Result<Vec<ExternalRecord>, SyncError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.deserialize::<RosterRow>() {
        records.push(ExternalRecord::from(row?));
    }
    Ok(records)
}

/// Parse the roster, keeping only rows with a requester or a FOIL id.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<ExternalRecord>, SyncError> {
    let all = parse_roster_all(reader)?;
    let total = all.len();
    let requested = foilstatus_core::requested_records(all);
    info!(rows = total, requested = requested.len(), "parsed roster");
    Ok(requested)
}

fn cell(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
