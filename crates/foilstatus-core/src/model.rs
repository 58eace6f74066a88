//! Canonical officer/complaint snapshot and the transient records reconciled
//! against it.
//!
//! The snapshot is a JSON document keyed by officer id and complaint id. Ids
//! and shield numbers appear as either JSON strings or numbers depending on
//! the exporter, so every such field is normalised to a `String` on load.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::CoreError;

pub type OfficerId = String;
pub type ComplaintId = String;

/// Disposition fragment marking an allegation as awaiting an APU decision.
pub const DECISION_PENDING: &str = "decision pending";

/// A canonical officer from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    /// Always equal to the snapshot map key once loaded through [`CanonicalDb`].
    #[serde(alias = "unique_mos", default, deserialize_with = "scalar_or_default")]
    pub unique_id: OfficerId,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub shield_no: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_list")]
    pub shield_no_history: Vec<Option<String>>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub complaints: Vec<ComplaintId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allegation {
    #[serde(alias = "nypd_disposition", default)]
    pub disposition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(default)]
    pub allegations: Vec<Allegation>,
}

impl Complaint {
    /// True when any allegation's disposition mentions "Decision Pending".
    ///
    /// Matching is a case-insensitive substring test: dispositions arrive as
    /// free text ("APU Decision Pending", "Pending: decision pending"), not as
    /// a closed set of values.
    pub fn is_pending(&self) -> bool {
        self.allegations.iter().any(|a| {
            a.disposition
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(DECISION_PENDING))
        })
    }
}

/// Read-only snapshot of every canonical officer and complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDb {
    #[serde(default)]
    pub officers: BTreeMap<OfficerId, Officer>,
    #[serde(default)]
    pub complaints: BTreeMap<ComplaintId, Complaint>,
}

impl CanonicalDb {
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let db: Self = serde_json::from_str(json).map_err(CoreError::Snapshot)?;
        Ok(db.backfill_ids())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CoreError> {
        let db: Self = serde_json::from_reader(reader).map_err(CoreError::Snapshot)?;
        Ok(db.backfill_ids())
    }

    pub fn officer(&self, id: &str) -> Option<&Officer> {
        self.officers.get(id)
    }

    pub fn complaint(&self, id: &str) -> Option<&Complaint> {
        self.complaints.get(id)
    }

    /// Pending status of a complaint; unknown complaints are never pending.
    pub fn is_pending(&self, complaint_id: &str) -> bool {
        self.complaint(complaint_id).is_some_and(Complaint::is_pending)
    }

    /// The map key is the officer id; an embedded id that is missing or
    /// disagrees with it is replaced.
    fn backfill_ids(mut self) -> Self {
        for (id, officer) in self.officers.iter_mut() {
            let embedded = officer.unique_id.trim();
            if !embedded.is_empty() && embedded != id {
                warn!(
                    officer_id = %id,
                    embedded = %embedded,
                    "snapshot officer id disagrees with its key"
                );
            }
            if embedded != id {
                officer.unique_id = id.clone();
            }
        }
        self
    }
}

/// One row of the request-tracking roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub last_name: String,
    pub first_name: String,
    pub shield_no: Option<String>,
    pub requester: Option<String>,
    pub foil_id: Option<String>,
    pub submitted_date: Option<String>,
    pub deadline_date: Option<String>,
    pub rank: Option<String>,
    pub command: Option<String>,
    pub received_date: Option<String>,
}

impl ExternalRecord {
    /// Rows that were never requested (no requester and no FOIL id) are not
    /// part of the reconciliation.
    pub fn is_requested(&self) -> bool {
        has_text(&self.requester) || has_text(&self.foil_id)
    }

    /// The FOIL id, or `None` when blank.
    pub fn foil_id(&self) -> Option<&str> {
        self.foil_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Keep only roster rows that were actually requested, preserving order.
pub fn requested_records(records: Vec<ExternalRecord>) -> Vec<ExternalRecord> {
    records.into_iter().filter(ExternalRecord::is_requested).collect()
}

/// A stored closing-report document: the batch folder it was filed under and
/// the complaint id taken from its file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceivedReport {
    pub batch_id: String,
    pub complaint_id: ComplaintId,
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

// ── Scalar normalisation ──

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(#[allow(dead_code)] bool),
}

impl Scalar {
    fn into_string(self) -> Option<String> {
        let s = match self {
            Scalar::Str(s) => s.trim().to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::UInt(n) => n.to_string(),
            Scalar::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                format!("{}", f as i64)
            }
            Scalar::Float(f) => f.to_string(),
            // Exporters write `false` for "no shield".
            Scalar::Bool(_) => return None,
        };
        (!s.is_empty()).then_some(s)
    }
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(value.and_then(Scalar::into_string))
}

fn scalar_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar(deserializer)?.unwrap_or_default())
}

fn optional_scalar_list<'de, D>(deserializer: D) -> Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<Option<Scalar>>> = Option::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.and_then(Scalar::into_string))
        .collect())
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar_list(deserializer)?
        .into_iter()
        .flatten()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "officers": {
            "1587": {
                "unique_mos": "1587",
                "last_name": "LEE",
                "first_name": "JAMES",
                "shield_no": 4411,
                "shield_no_history": [1200, "", null],
                "complaints": ["12345", 67890]
            },
            "2000": {
                "last_name": "SMITH",
                "first_name": "JOHN",
                "shield_no": null
            }
        },
        "complaints": {
            "12345": {
                "allegations": [
                    { "nypd_disposition": "Substantiated" },
                    { "nypd_disposition": "APU Decision Pending" }
                ]
            },
            "67890": { "allegations": [ { "nypd_disposition": null } ] }
        }
    }"#;

    #[test]
    fn snapshot_normalises_scalars() {
        let db = CanonicalDb::from_json_str(SNAPSHOT).unwrap();
        let lee = db.officer("1587").unwrap();
        assert_eq!(lee.unique_id, "1587");
        assert_eq!(lee.shield_no.as_deref(), Some("4411"));
        assert_eq!(
            lee.shield_no_history,
            vec![Some("1200".to_string()), None, None]
        );
        assert_eq!(lee.complaints, vec!["12345", "67890"]);
    }

    #[test]
    fn wide_and_float_ids_keep_their_digits() {
        let db = CanonicalDb::from_json_str(
            r#"{ "officers": { "9": {
                "shield_no": 18446744073709551615,
                "complaints": [201904321.0, false]
            } } }"#,
        )
        .unwrap();
        let officer = db.officer("9").unwrap();
        assert_eq!(officer.shield_no.as_deref(), Some("18446744073709551615"));
        assert_eq!(officer.complaints, vec!["201904321"]);
    }

    #[test]
    fn embedded_id_follows_map_key() {
        let db = CanonicalDb::from_json_str(
            r#"{ "officers": { "A": { "unique_mos": "B", "last_name": "X" } } }"#,
        )
        .unwrap();
        assert_eq!(db.officer("A").unwrap().unique_id, "A");
    }

    #[test]
    fn missing_unique_id_falls_back_to_map_key() {
        let db = CanonicalDb::from_json_str(SNAPSHOT).unwrap();
        let smith = db.officer("2000").unwrap();
        assert_eq!(smith.unique_id, "2000");
        assert!(smith.shield_no.is_none());
        assert!(smith.complaints.is_empty());
    }

    #[test]
    fn pending_matches_disposition_substring() {
        let db = CanonicalDb::from_json_str(SNAPSHOT).unwrap();
        assert!(db.is_pending("12345"));
        assert!(!db.is_pending("67890"));
    }

    #[test]
    fn pending_ignores_case() {
        let complaint = Complaint {
            allegations: vec![Allegation {
                disposition: Some("apu decision pending".into()),
            }],
        };
        assert!(complaint.is_pending());
    }

    #[test]
    fn unknown_complaint_is_not_pending() {
        let db = CanonicalDb::from_json_str(SNAPSHOT).unwrap();
        assert!(!db.is_pending("999"));
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let err = CanonicalDb::from_json_str("{\"officers\": 3}").unwrap_err();
        assert!(matches!(err, CoreError::Snapshot(_)));
    }

    #[test]
    fn requested_filter_keeps_requester_or_foil() {
        let rows = vec![
            ExternalRecord {
                last_name: "A".into(),
                requester: Some("jr".into()),
                ..Default::default()
            },
            ExternalRecord {
                last_name: "B".into(),
                foil_id: Some("2021-12".into()),
                ..Default::default()
            },
            ExternalRecord {
                last_name: "C".into(),
                requester: Some("  ".into()),
                ..Default::default()
            },
        ];
        let kept: Vec<String> = requested_records(rows)
            .into_iter()
            .map(|r| r.last_name)
            .collect();
        assert_eq!(kept, vec!["A", "B"]);
    }

    #[test]
    fn blank_foil_id_reads_as_none() {
        let record = ExternalRecord {
            foil_id: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(record.foil_id(), None);
    }
}
