//! Received / waiting / pending classification of complaint sets.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{CanonicalDb, ComplaintId, ReceivedReport};
use crate::sort_key::ComplaintOrder;

/// Status of one complaint's closing report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplaintStatus {
    pub complaint_id: ComplaintId,
    pub received: bool,
    /// An allegation is awaiting an APU decision.
    pub pending: bool,
}

/// A classified set of complaints.
///
/// `received` and `waiting` partition `all`, each keeping the order of `all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplaintSet {
    pub all: Vec<ComplaintStatus>,
    pub received: Vec<ComplaintStatus>,
    pub waiting: Vec<ComplaintStatus>,
    /// Every closing report in the set has been received.
    pub completed: bool,
}

impl Default for ComplaintSet {
    fn default() -> Self {
        Self {
            all: Vec::new(),
            received: Vec::new(),
            waiting: Vec::new(),
            completed: true,
        }
    }
}

impl ComplaintSet {
    /// Waiting complaints that are held up by a pending APU decision.
    pub fn waiting_pending(&self) -> impl Iterator<Item = &ComplaintStatus> {
        self.waiting.iter().filter(|c| c.pending)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Complaint ids that have a stored closing report, from any batch.
#[derive(Debug, Clone, Default)]
pub struct ReceivedIndex {
    ids: HashSet<ComplaintId>,
    documents: usize,
}

impl ReceivedIndex {
    pub fn new(reports: &[ReceivedReport]) -> Self {
        Self {
            ids: reports.iter().map(|r| r.complaint_id.clone()).collect(),
            documents: reports.len(),
        }
    }

    pub fn contains(&self, complaint_id: &str) -> bool {
        self.ids.contains(complaint_id)
    }

    /// Number of stored documents, duplicates and unrequested ones included.
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// Number of distinct complaint ids with a document.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Classify a set of complaint ids.
///
/// Duplicate ids are reported once. Complaints missing from `db` are kept and
/// treated as not pending.
pub fn classify<I, S>(
    complaint_ids: I,
    received: &ReceivedIndex,
    db: &CanonicalDb,
    order: ComplaintOrder,
) -> ComplaintSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut ids: Vec<String> = Vec::new();
    for id in complaint_ids {
        let id = id.as_ref();
        if seen.insert(id.to_string()) {
            ids.push(id.to_string());
        }
    }
    order.sort(&mut ids);

    let all: Vec<ComplaintStatus> = ids
        .into_iter()
        .map(|complaint_id| ComplaintStatus {
            received: received.contains(&complaint_id),
            pending: db.is_pending(&complaint_id),
            complaint_id,
        })
        .collect();

    let (received, waiting): (Vec<_>, Vec<_>) = all.iter().cloned().partition(|c| c.received);

    ComplaintSet {
        completed: waiting.is_empty(),
        all,
        received,
        waiting,
    }
}
