//! Orderings for complaint ids and FOIL batch ids.
//!
//! Complaint ids are numeric strings of varying width ("999", "12345"), so a
//! plain string comparison puts "999" after "12345". Comparison here works on
//! the numeric value instead.
//!
//! # Rules
//!
//! - Numeric ids compare by value: leading zeros stripped, shorter digit run
//!   first, then digit by digit. No fixed integer width is assumed.
//! - Ids that compare equal by value ("007" and "7") fall back to string order.
//! - Non-numeric ids (malformed file names, blanks) sort after every numeric id.
//! - FOIL ids sort lexically, with the `BLANK` sentinel always last.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Batch id for roster rows without a FOIL id.
pub const BLANK_FOIL_ID: &str = "BLANK";

/// Direction in which a complaint listing is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintOrder {
    /// Oldest complaint first; used for per-officer and per-batch listings.
    #[default]
    Ascending,
    /// Most recent complaint first; used for the global complaint table.
    Descending,
}

impl ComplaintOrder {
    /// Per-officer console listings read oldest to newest.
    pub const OFFICER_DISPLAY: Self = Self::Ascending;
    /// Per-batch listings follow the officer listing.
    pub const BATCH_DISPLAY: Self = Self::Ascending;
    /// The global table shows the most recent complaints first.
    pub const ALL_COMPLAINTS: Self = Self::Descending;

    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Ascending => compare_complaint_ids(a, b),
            Self::Descending => compare_complaint_ids(b, a),
        }
    }

    pub fn sort<T: AsRef<str>>(self, ids: &mut [T]) {
        ids.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

/// Ascending numeric comparison of two complaint ids.
pub fn compare_complaint_ids(a: &str, b: &str) -> Ordering {
    match (numeric_digits(a), numeric_digits(b)) {
        (Some(da), Some(db)) => da
            .len()
            .cmp(&db.len())
            .then_with(|| da.cmp(db))
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Batch ordering: lexical by FOIL id, `BLANK` last.
pub fn compare_foil_ids(a: &str, b: &str) -> Ordering {
    match (a == BLANK_FOIL_ID, b == BLANK_FOIL_ID) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

/// The significant digits of an all-digit id, or `None` when `s` is not numeric.
fn numeric_digits(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = s.trim_start_matches('0');
    // All zeros: keep one so "0" and "000" still compare equal by value.
    Some(if significant.is_empty() { "0" } else { significant })
}
