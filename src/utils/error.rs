use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unauthorized: the remote service rejected the API credentials")]
    Unauthorized,

    #[error("Unexpected HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Item {id} rejected by the remote service: {reason}")]
    ItemRejected { id: String, reason: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },
}

impl TrackError {
    /// True for whole-call failures (connectivity, protocol); false for
    /// per-item rejections that leave sibling operations unaffected.
    pub fn is_whole_call(&self) -> bool {
        !matches!(self, TrackError::ItemRejected { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
