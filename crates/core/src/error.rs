#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A query, insert or row scan failed in the persistence adapter.
    #[error("Storage fault: {0}")]
    Storage(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
