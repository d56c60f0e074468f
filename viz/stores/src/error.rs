use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Dataset entry not found. key: {0}")]
    NotFound(String),
    #[error("Error reading dataset. cause: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error parsing dataset. cause: {0}")]
    Format(String),
    #[error("Fetch cancelled.")]
    Cancelled,
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Format(error.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(error: csv::Error) -> Self {
        StoreError::Format(error.to_string())
    }
}
