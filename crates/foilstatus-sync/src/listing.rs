//! Received closing reports, derived from the stored-document listing.
//!
//! Reports are filed as `<FOIL folder>/<complaint id><anything>.pdf`. Nested
//! folders are not walked, and a PDF whose name starts with digits is assumed
//! to be a closing report. The extension is matched as written: `.PDF` is not
//! a report.

use std::io::Read;
use std::sync::LazyLock;

use foilstatus_core::ReceivedReport;
use regex::Regex;
use serde::Deserialize;

use crate::error::SyncError;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

static REPORT_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+).*\.pdf$").unwrap());

/// A file entry as returned by the file API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

impl StoredFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Complaint id encoded in a closing-report file name, e.g. `"201904321 CCRB.pdf"`.
pub fn complaint_id_from_file_name(name: &str) -> Option<&str> {
    REPORT_FILE_RE
        .captures(name.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Closing reports among the files of one batch folder.
pub fn reports_in_folder(folder_name: &str, files: &[StoredFile]) -> Vec<ReceivedReport> {
    files
        .iter()
        .filter(|f| !f.is_folder())
        .filter_map(|f| complaint_id_from_file_name(&f.name))
        .map(|complaint_id| ReceivedReport {
            batch_id: folder_name.to_string(),
            complaint_id: complaint_id.to_string(),
        })
        .collect()
}

/// Parse an offline listing: a JSON array of `{ "batch_id", "complaint_id" }`.
pub fn parse_received_json<R: Read>(reader: R) -> Result<Vec<ReceivedReport>, SyncError> {
    Ok(serde_json::from_reader(reader)?)
}
