//! Non-fatal problems found during a reconciliation run.
//!
//! Every warning is also emitted through `tracing` as it is recorded, so a
//! console run shows them without inspecting the report.

use serde::Serialize;
use tracing::warn;

use crate::model::{ComplaintId, ExternalRecord, OfficerId};
use crate::resolve::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A roster row matched no officer, or more than one.
    UnresolvedRecord {
        record: ExternalRecord,
        error: ResolveError,
    },
    /// An officer references a complaint absent from the complaint database.
    MissingComplaint {
        officer_id: OfficerId,
        complaint_id: ComplaintId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unresolved(&mut self, record: &ExternalRecord, error: ResolveError) {
        warn!(
            last_name = %record.last_name,
            first_name = %record.first_name,
            shield_no = record.shield_no.as_deref().unwrap_or(""),
            foil_id = record.foil_id.as_deref().unwrap_or(""),
            candidates = ?error.candidates(),
            "cannot find officer: {error}"
        );
        self.warnings.push(Warning::UnresolvedRecord {
            record: record.clone(),
            error,
        });
    }

    pub fn missing_complaint(&mut self, officer_id: &str, complaint_id: &str) {
        warn!(officer_id, complaint_id, "complaint not in canonical database");
        self.warnings.push(Warning::MissingComplaint {
            officer_id: officer_id.to_string(),
            complaint_id: complaint_id.to_string(),
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Resolution failures, in roster order.
    pub fn unresolved_records(&self) -> impl Iterator<Item = (&ExternalRecord, &ResolveError)> {
        self.warnings.iter().filter_map(|w| match w {
            Warning::UnresolvedRecord { record, error } => Some((record, error)),
            _ => None,
        })
    }

    pub fn missing_complaints(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().filter_map(|w| match w {
            Warning::MissingComplaint { complaint_id, .. } => Some(complaint_id.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
