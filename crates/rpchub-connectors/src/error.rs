use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Transport-level failures shared by every backend client. Adapters map
/// these onto the call-level error kind matching the phase they occurred in
/// (schema fetch vs dispatch).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request signing failed: {0}")]
    Signing(String),
}
