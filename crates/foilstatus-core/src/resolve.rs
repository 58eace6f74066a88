//! Resolution of roster rows to canonical officers.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::identity::IdentityKey;
use crate::index::OfficerIndex;
use crate::model::{CanonicalDb, ExternalRecord, Officer, OfficerId};
use crate::overrides::ManualOverrides;

/// Why a roster row could not be matched to exactly one officer.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ResolveError {
    #[error("no officer matches {key}")]
    Unknown { key: IdentityKey },

    #[error("{key} matches {} officers: {}", .candidates.len(), .candidates.join(", "))]
    Ambiguous {
        key: IdentityKey,
        candidates: Vec<OfficerId>,
    },

    #[error("override for {key} names officer {officer_id}, which is not in the database")]
    OverrideTargetMissing {
        key: IdentityKey,
        officer_id: OfficerId,
    },
}

impl ResolveError {
    pub fn key(&self) -> &IdentityKey {
        match self {
            Self::Unknown { key }
            | Self::Ambiguous { key, .. }
            | Self::OverrideTargetMissing { key, .. } => key,
        }
    }

    /// Officers that were considered, for manual follow-up.
    pub fn candidates(&self) -> &[OfficerId] {
        match self {
            Self::Ambiguous { candidates, .. } => candidates,
            Self::OverrideTargetMissing { officer_id, .. } => std::slice::from_ref(officer_id),
            Self::Unknown { .. } => &[],
        }
    }
}

/// Read-only view over the index, the override table, and the officer
/// database. Resolution never mutates any of them.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a OfficerIndex,
    overrides: &'a ManualOverrides,
    officers: &'a BTreeMap<OfficerId, Officer>,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a OfficerIndex, overrides: &'a ManualOverrides, db: &'a CanonicalDb) -> Self {
        Self {
            index,
            overrides,
            officers: &db.officers,
        }
    }

    pub fn resolve(&self, record: &ExternalRecord) -> Result<&'a Officer, ResolveError> {
        self.resolve_key(&IdentityKey::for_record(record))
    }

    /// Overrides win over the index, even when the index has a unique match.
    pub fn resolve_key(&self, key: &IdentityKey) -> Result<&'a Officer, ResolveError> {
        if let Some(officer_id) = self.overrides.get(key) {
            return self
                .officers
                .get(officer_id)
                .ok_or_else(|| ResolveError::OverrideTargetMissing {
                    key: key.clone(),
                    officer_id: officer_id.clone(),
                });
        }

        match self.index.lookup(key) {
            [officer_id] => self
                .officers
                .get(officer_id)
                .ok_or_else(|| ResolveError::Unknown { key: key.clone() }),
            [] => Err(ResolveError::Unknown { key: key.clone() }),
            candidates => Err(ResolveError::Ambiguous {
                key: key.clone(),
                candidates: candidates.to_vec(),
            }),
        }
    }
}
