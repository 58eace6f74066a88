use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid canonical snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error("invalid override table: {0}")]
    Overrides(#[source] serde_json::Error),

    #[error("override key {0:?} is empty")]
    EmptyOverrideKey(String),

    #[error("override key {0:?} is not of the form LAST:FIRST:SHIELD")]
    MalformedOverrideKey(String),
}
