//! Manual identity overrides.
//!
//! Roster rows drift from the canonical database: officers are promoted past
//! the rank that carries a shield number, change their name, or get entered
//! with a typo. The override table pins such keys to a specific officer and is
//! consulted before the index.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::identity::IdentityKey;
use crate::model::OfficerId;

/// Curated overrides shipped with the tool.
const CURATED: &[(&str, &str)] = &[
    ("STEVENS:ANTHONY:25283", "73109"),
    ("SHEPPARD:TARIK:0", "31361"),
    ("ORTIZ:STEVEN:0", "61403"),
    ("OCONNELL:JOHN:0", "1635"),
    ("MERVIN:BENNET:0", "6232"),
    ("MCCARTHY:JAMES:0", "61824"),
    ("LEE:JAMES:0", "1587"),
    ("GALLAGHER:WILLIAM:0", "35669"),
    ("ALEXANDER:BRIAN:0", "19707"),
    ("BUTLER:MICHAEL:0", "34930"),
    ("HENDERSON:ROBERT:0", "80598"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualOverrides {
    entries: BTreeMap<IdentityKey, OfficerId>,
}

impl ManualOverrides {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The curated table.
    pub fn curated() -> Self {
        let mut overrides = Self::empty();
        for (key, officer_id) in CURATED {
            if let Ok(key) = IdentityKey::parse(key) {
                overrides.insert(key, *officer_id);
            }
        }
        overrides
    }

    /// Parse a JSON object of `"LAST:FIRST:SHIELD": "officer id"` pairs.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let mut overrides = Self::empty();
        overrides.extend_from_json_str(json)?;
        Ok(overrides)
    }

    /// Merge entries from a JSON object into this table; later entries
    /// replace earlier ones for the same key. Returns the number of entries read.
    /// Nothing is merged when any key is malformed.
    pub fn extend_from_json_str(&mut self, json: &str) -> Result<usize, CoreError> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(CoreError::Overrides)?;
        let parsed = raw
            .iter()
            .map(|(key, officer_id)| Ok((IdentityKey::parse(key)?, officer_id.trim())))
            .collect::<Result<Vec<_>, CoreError>>()?;
        for (key, officer_id) in &parsed {
            self.insert(key.clone(), *officer_id);
        }
        Ok(parsed.len())
    }

    pub fn insert(&mut self, key: IdentityKey, officer_id: impl Into<OfficerId>) {
        self.entries.insert(key, officer_id.into());
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&OfficerId> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
