//! Identity keys joining roster rows to canonical officers.
//!
//! A key is `LAST:FIRST:SHIELD`, upper-cased, with a missing or blank shield
//! number written as `0`. Keys are not unique: namesakes without a shield
//! collide, and one officer owns a key for every shield number they have held.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{ExternalRecord, Officer};

/// Shield placeholder used when a record carries no shield number.
pub const NO_SHIELD: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(last_name: &str, first_name: &str, shield_no: Option<&str>) -> Self {
        let shield = shield_no
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_SHIELD);
        Self(format!(
            "{}:{}:{}",
            last_name.trim().to_uppercase(),
            first_name.trim().to_uppercase(),
            shield.to_uppercase()
        ))
    }

    pub fn for_record(record: &ExternalRecord) -> Self {
        Self::new(
            &record.last_name,
            &record.first_name,
            record.shield_no.as_deref(),
        )
    }

    /// Every key an officer answers to: the current shield first, then each
    /// historical shield, without repeats.
    pub fn for_officer(officer: &Officer) -> Vec<Self> {
        let shields = std::iter::once(officer.shield_no.as_deref())
            .chain(officer.shield_no_history.iter().map(|s| s.as_deref()));

        let mut keys: Vec<Self> = Vec::new();
        for shield in shields {
            let key = Self::new(&officer.last_name, &officer.first_name, shield);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Parse a hand-written key such as `"Lee:James:"`, normalising it the
    /// same way keys built from records are.
    ///
    /// The key must have exactly three `:`-separated parts with non-blank
    /// names; only the shield may be empty.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyOverrideKey(raw.to_string()));
        }
        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [last, first, shield] if !last.trim().is_empty() && !first.trim().is_empty() => {
                Ok(Self::new(last, first, Some(shield)))
            }
            _ => Err(CoreError::MalformedOverrideKey(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
