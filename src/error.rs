use thiserror::Error;

/// Errors produced while selecting an image or classifying it.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The selected file is not an image.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The request never produced an HTTP response.
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("API request failed: {status}")]
    Status { status: u16 },
    /// A JSON result was requested but the body does not parse.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClassifyError {
    /// Transport failures and non-2xx statuses are reported as one class.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, ClassifyError::Network(_) | ClassifyError::Status { .. })
    }
}
