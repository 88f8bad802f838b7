use thiserror::Error;

/// Errors from the search service's upstream calls
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Weather API key is not configured")]
    MissingApiKey,
}

impl SearchError {
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        SearchError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}
