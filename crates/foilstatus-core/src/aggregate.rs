//! Reconciliation of the roster against the canonical database and the
//! received-document listing.
//!
//! One call to [`reconcile`] is one run: it builds the officer index, resolves
//! every roster row, groups rows into FOIL batches, and classifies complaints
//! per officer, per batch, and overall. Bad rows are recorded in the report's
//! [`Diagnostics`] and skipped; the run itself cannot fail.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::{ComplaintSet, ReceivedIndex, classify};
use crate::diagnostics::Diagnostics;
use crate::index::OfficerIndex;
use crate::model::{CanonicalDb, ExternalRecord, Officer, OfficerId, ReceivedReport};
use crate::overrides::ManualOverrides;
use crate::resolve::Resolver;
use crate::sort_key::{BLANK_FOIL_ID, ComplaintOrder, compare_foil_ids};

/// Complaint orderings used when building a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    pub officer_order: ComplaintOrder,
    pub batch_order: ComplaintOrder,
    pub all_order: ComplaintOrder,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            officer_order: ComplaintOrder::OFFICER_DISPLAY,
            batch_order: ComplaintOrder::BATCH_DISPLAY,
            all_order: ComplaintOrder::ALL_COMPLAINTS,
        }
    }
}

/// Roster rows sharing a FOIL id, with the officers they resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoilBatch {
    pub foil_id: String,
    /// Resolved officers, once each, in roster order.
    pub officers: Vec<OfficerId>,
    /// Taken from the first roster row of the batch.
    pub submitted_date: Option<String>,
    pub deadline_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfficerRef {
    pub officer_id: OfficerId,
    pub last_name: String,
    pub first_name: String,
}

impl From<&Officer> for OfficerRef {
    fn from(officer: &Officer) -> Self {
        Self {
            officer_id: officer.unique_id.clone(),
            last_name: officer.last_name.clone(),
            first_name: officer.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfficerStatus {
    pub officer: OfficerRef,
    pub complaints: ComplaintSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoilStatus {
    pub foil_id: String,
    pub submitted_date: Option<String>,
    pub deadline_date: Option<String>,
    pub officers: Vec<OfficerRef>,
    pub complaints: ComplaintSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Distinct resolved officers.
    pub officers: usize,
    /// Distinct complaints across resolved officers.
    pub requested: usize,
    /// Requested complaints without a closing report.
    pub remaining: usize,
    /// Remaining complaints awaiting an APU decision.
    pub pending: usize,
    /// Stored closing-report documents, requested or not.
    pub received: usize,
    /// Distinct FOIL batches, `BLANK` included.
    pub foils: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub summary: Summary,
    /// Sorted by last name, then first name.
    pub officers: Vec<OfficerStatus>,
    /// Sorted by FOIL id, `BLANK` last.
    pub foils: Vec<FoilStatus>,
    /// Every requested complaint.
    pub complaints: ComplaintSet,
    pub diagnostics: Diagnostics,
}

/// Run one reconciliation.
pub fn reconcile(
    roster: &[ExternalRecord],
    received: &[ReceivedReport],
    db: &CanonicalDb,
    overrides: &ManualOverrides,
    options: &ReconcileOptions,
) -> Report {
    let index = OfficerIndex::build(db);
    let resolver = Resolver::new(&index, overrides, db);
    let received = ReceivedIndex::new(received);
    let mut diagnostics = Diagnostics::new();

    // 1. Resolve each roster row once; failures are recorded and dropped.
    let resolved: Vec<Option<&Officer>> = roster
        .iter()
        .map(|record| match resolver.resolve(record) {
            Ok(officer) => Some(officer),
            Err(err) => {
                diagnostics.unresolved(record, err);
                None
            }
        })
        .collect();

    // 2. Distinct officers and FOIL batches.
    let mut officers = distinct_officers(&resolved);
    let batches = group_foil_batches(roster, &resolved);

    // 3. Per officer.
    sort_officers(&mut officers);
    let officer_statuses: Vec<OfficerStatus> = officers
        .iter()
        .map(|officer| OfficerStatus {
            officer: OfficerRef::from(*officer),
            complaints: classify(&officer.complaints, &received, db, options.officer_order),
        })
        .collect();

    // 4. Per batch: the union of its officers' complaints.
    let foil_statuses: Vec<FoilStatus> = batches
        .into_iter()
        .map(|batch| {
            let members: Vec<&Officer> = batch
                .officers
                .iter()
                .filter_map(|id| db.officer(id))
                .collect();
            let complaints = classify(
                members.iter().flat_map(|o| o.complaints.iter()),
                &received,
                db,
                options.batch_order,
            );
            FoilStatus {
                foil_id: batch.foil_id,
                submitted_date: batch.submitted_date,
                deadline_date: batch.deadline_date,
                officers: members.into_iter().map(OfficerRef::from).collect(),
                complaints,
            }
        })
        .collect();

    // 5. Overall.
    let mut flagged: HashSet<&str> = HashSet::new();
    for officer in &officers {
        for complaint_id in &officer.complaints {
            if db.complaint(complaint_id).is_none() && flagged.insert(complaint_id) {
                diagnostics.missing_complaint(&officer.unique_id, complaint_id);
            }
        }
    }

    let complaints = classify(
        officers.iter().flat_map(|o| o.complaints.iter()),
        &received,
        db,
        options.all_order,
    );

    let summary = Summary {
        officers: officers.len(),
        requested: complaints.all.len(),
        remaining: complaints.waiting.len(),
        pending: complaints.waiting_pending().count(),
        received: received.document_count(),
        foils: foil_statuses.len(),
    };

    info!(
        roster = roster.len(),
        officers = summary.officers,
        requested = summary.requested,
        remaining = summary.remaining,
        pending = summary.pending,
        received = summary.received,
        foils = summary.foils,
        warnings = diagnostics.len(),
        "reconciliation complete"
    );

    Report {
        summary,
        officers: officer_statuses,
        foils: foil_statuses,
        complaints,
        diagnostics,
    }
}

/// Group roster rows into FOIL batches, sorted with `BLANK` last.
///
/// `resolved[i]` is the officer row `roster[i]` resolved to. Rows that did not
/// resolve still create their batch.
pub fn group_foil_batches(roster: &[ExternalRecord], resolved: &[Option<&Officer>]) -> Vec<FoilBatch> {
    let mut batches: Vec<FoilBatch> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (record, officer) in roster.iter().zip(resolved) {
        let foil_id = record.foil_id().unwrap_or(BLANK_FOIL_ID);
        let pos = *positions.entry(foil_id.to_string()).or_insert_with(|| {
            batches.push(FoilBatch {
                foil_id: foil_id.to_string(),
                officers: Vec::new(),
                submitted_date: record.submitted_date.clone(),
                deadline_date: record.deadline_date.clone(),
            });
            batches.len() - 1
        });

        if let Some(officer) = officer {
            let batch = &mut batches[pos];
            if !batch.officers.contains(&officer.unique_id) {
                batch.officers.push(officer.unique_id.clone());
            }
        }
    }

    batches.sort_by(|a, b| compare_foil_ids(&a.foil_id, &b.foil_id));
    batches
}

/// Sort officers by last name, then first name; officer id breaks ties.
pub fn sort_officers(officers: &mut [&Officer]) {
    officers.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.unique_id.cmp(&b.unique_id))
    });
}

fn distinct_officers<'a>(resolved: &[Option<&'a Officer>]) -> Vec<&'a Officer> {
    let mut seen: HashSet<&str> = HashSet::new();
    resolved
        .iter()
        .flatten()
        .copied()
        .filter(|&o| seen.insert(o.unique_id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Allegation, Complaint};

    fn officer(id: &str, last: &str, first: &str, shield: Option<&str>, complaints: &[&str]) -> Officer {
        Officer {
            unique_id: id.into(),
            last_name: last.into(),
            first_name: first.into(),
            shield_no: shield.map(String::from),
            shield_no_history: Vec::new(),
            complaints: complaints.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn complaint(disposition: &str) -> Complaint {
        Complaint {
            allegations: vec![Allegation {
                disposition: Some(disposition.into()),
            }],
        }
    }

    fn row(last: &str, first: &str, shield: Option<&str>, foil: Option<&str>) -> ExternalRecord {
        ExternalRecord {
            last_name: last.into(),
            first_name: first.into(),
            shield_no: shield.map(String::from),
            requester: Some("team".into()),
            foil_id: foil.map(String::from),
            submitted_date: Some(format!("submitted {}", foil.unwrap_or("-"))),
            deadline_date: Some(format!("deadline {}", foil.unwrap_or("-"))),
            ..Default::default()
        }
    }

    fn report(batch: &str, complaint_id: &str) -> ReceivedReport {
        ReceivedReport {
            batch_id: batch.into(),
            complaint_id: complaint_id.into(),
        }
    }

    fn db() -> CanonicalDb {
        let officers = vec![
            officer("10", "ZIMMER", "ANNA", Some("111"), &["100", "12345"]),
            officer("20", "ADAMS", "BOB", Some("222"), &["12345", "300", "999"]),
            officer("1587", "LEE", "JAMES", Some("4411"), &["500"]),
            officer("31", "SMITH", "JOHN", None, &["700"]),
            officer("32", "SMITH", "JOHN", None, &["701"]),
        ];
        let mut db = CanonicalDb {
            officers: officers
                .into_iter()
                .map(|o| (o.unique_id.clone(), o))
                .collect(),
            complaints: Default::default(),
        };
        db.complaints.insert("100".into(), complaint("Substantiated"));
        db.complaints.insert("12345".into(), complaint("APU Decision Pending"));
        db.complaints.insert("300".into(), complaint("APU Decision Pending"));
        db.complaints.insert("500".into(), complaint("Unfounded"));
        db.complaints.insert("700".into(), complaint("Unfounded"));
        db.complaints.insert("701".into(), complaint("Unfounded"));
        // "999" is deliberately absent.
        db
    }

    fn roster() -> Vec<ExternalRecord> {
        vec![
            row("Zimmer", "Anna", Some("111"), Some("B2")),
            row("ADAMS", "BOB", Some("222"), Some("B2")),
            row("LEE", "JAMES", None, None),
            row("SMITH", "JOHN", None, Some("A1")),
            row("ADAMS", "BOB", Some("222"), Some("A1")),
            row("Zimmer", "Anna", Some("111"), Some("B2")),
        ]
    }

    fn received() -> Vec<ReceivedReport> {
        vec![
            report("B2", "100"),
            report("B2", "999"),
            report("A1", "100"),
            report("misc", "424242"),
        ]
    }

    fn run() -> Report {
        reconcile(
            &roster(),
            &received(),
            &db(),
            &ManualOverrides::curated(),
            &ReconcileOptions::default(),
        )
    }

    fn ids(set: &ComplaintSet) -> Vec<&str> {
        set.all.iter().map(|c| c.complaint_id.as_str()).collect()
    }

    #[test]
    fn summary_counts() {
        let report = run();
        assert_eq!(
            report.summary,
            Summary {
                officers: 3,
                requested: 5,
                remaining: 3,
                pending: 2,
                received: 4,
                foils: 3,
            }
        );
    }

    #[test]
    fn remaining_is_requested_minus_received() {
        let report = run();
        let marked = report.complaints.all.iter().filter(|c| c.received).count();
        assert_eq!(report.summary.remaining, report.summary.requested - marked);
    }

    #[test]
    fn officers_sorted_by_name() {
        let report = run();
        let names: Vec<&str> = report
            .officers
            .iter()
            .map(|s| s.officer.last_name.as_str())
            .collect();
        assert_eq!(names, vec!["ADAMS", "LEE", "ZIMMER"]);
    }

    #[test]
    fn officer_complaints_ascending() {
        let report = run();
        let adams = &report.officers[0];
        assert_eq!(ids(&adams.complaints), vec!["300", "999", "12345"]);
        assert!(adams.complaints.all[1].received);
        assert!(!adams.complaints.all[1].pending);
        assert!(!adams.complaints.completed);
    }

    #[test]
    fn all_complaints_descending() {
        let report = run();
        assert_eq!(
            ids(&report.complaints),
            vec!["12345", "999", "500", "300", "100"]
        );
    }

    #[test]
    fn batches_sorted_blank_last() {
        let report = run();
        let foils: Vec<&str> = report.foils.iter().map(|f| f.foil_id.as_str()).collect();
        assert_eq!(foils, vec!["A1", "B2", "BLANK"]);
    }

    #[test]
    fn batch_unions_complaints_once() {
        let report = run();
        let b2 = &report.foils[1];
        let officers: Vec<&str> = b2.officers.iter().map(|o| o.officer_id.as_str()).collect();
        assert_eq!(officers, vec!["10", "20"]);
        assert_eq!(ids(&b2.complaints), vec!["100", "300", "999", "12345"]);
        assert_eq!(b2.submitted_date.as_deref(), Some("submitted B2"));
    }

    #[test]
    fn unresolved_row_still_creates_batch() {
        let report = run();
        let a1 = &report.foils[0];
        assert_eq!(a1.foil_id, "A1");
        let officers: Vec<&str> = a1.officers.iter().map(|o| o.officer_id.as_str()).collect();
        assert_eq!(officers, vec!["20"]);

        let unresolved: Vec<&str> = report
            .diagnostics
            .unresolved_records()
            .map(|(r, _)| r.last_name.as_str())
            .collect();
        assert_eq!(unresolved, vec!["SMITH"]);
    }

    #[test]
    fn override_resolves_blank_batch_officer() {
        let report = run();
        let blank = &report.foils[2];
        assert_eq!(blank.foil_id, "BLANK");
        assert_eq!(blank.officers[0].officer_id, "1587");
        assert!(!blank.complaints.completed);
    }

    #[test]
    fn missing_complaint_is_flagged_once() {
        let report = run();
        assert_eq!(
            report.diagnostics.missing_complaints().collect::<Vec<_>>(),
            vec!["999"]
        );
    }

    #[test]
    fn empty_roster_yields_empty_report() {
        let report = reconcile(
            &[],
            &received(),
            &db(),
            &ManualOverrides::empty(),
            &ReconcileOptions::default(),
        );
        assert_eq!(report.summary.officers, 0);
        assert_eq!(report.summary.requested, 0);
        assert_eq!(report.summary.received, 4);
        assert!(report.foils.is_empty());
        assert!(report.complaints.completed);
    }

    #[test]
    fn group_batches_keeps_first_dates() {
        let rows = vec![
            row("A", "A", None, Some("X")),
            ExternalRecord {
                submitted_date: Some("later".into()),
                ..row("B", "B", None, Some("X"))
            },
        ];
        let batches = group_foil_batches(&rows, &[None, None]);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].submitted_date.as_deref(), Some("submitted X"));
        assert!(batches[0].officers.is_empty());
    }
}
