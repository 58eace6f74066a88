//! Identity-key index over the canonical officer database.

use std::collections::HashMap;

use tracing::debug;

use crate::identity::IdentityKey;
use crate::model::{CanonicalDb, OfficerId};

/// Multi-valued lookup from identity key to the officers registered under it.
///
/// Built once per run from a [`CanonicalDb`] and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct OfficerIndex {
    buckets: HashMap<IdentityKey, Vec<OfficerId>>,
}

impl OfficerIndex {
    pub fn build(db: &CanonicalDb) -> Self {
        let mut buckets: HashMap<IdentityKey, Vec<OfficerId>> = HashMap::new();

        // Buckets hold the map key, the id resolution looks officers up by.
        // `officers` is a BTreeMap, so bucket order follows officer id.
        for (officer_id, officer) in &db.officers {
            for key in IdentityKey::for_officer(officer) {
                buckets.entry(key).or_default().push(officer_id.clone());
            }
        }

        let index = Self { buckets };
        debug!(
            keys = index.len(),
            ambiguous = index.ambiguous_keys().count(),
            "built officer index"
        );
        index
    }

    /// Officers registered under `key`; empty when the key is unknown.
    pub fn lookup(&self, key: &IdentityKey) -> &[OfficerId] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys shared by more than one officer.
    pub fn ambiguous_keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.buckets
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
