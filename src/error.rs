// Error types for webstash.
// Covers caller input errors, stored-record corruption, and transport failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid key: keys must be non-empty strings")]
    InvalidKey,

    #[error("Store already contains item with key: {0}, use update() or set overwrite")]
    DuplicateKey(String),

    #[error("Value for option `{field}` must be of type: {expected}")]
    ConfigType {
        field: String,
        expected: &'static str,
    },

    #[error("Missing url: a url must be provided or registered for the resource")]
    MissingUrl,

    #[error("Invalid expiry: {0} days does not give a representable expiry time")]
    InvalidExpiry(f64),

    #[error("Invalid version: app version must be a non-empty string")]
    InvalidVersion,

    #[error("JSON parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Transport failed: {0}")]
    TransportFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Attribute path not found: {0}")]
    PathNotFound(String),

    #[error("Attribute paths can only target existing items, not create them: {0}")]
    AttributeOnCreate(String),

    #[error("Unsupported request method: {0}")]
    InvalidMethod(String),

    #[error("Callback failed: {0}")]
    Callback(String),

    #[error("Caching is disabled")]
    Disabled,
}

impl StoreError {
    /// True for errors caused by unreadable stored or received JSON.
    pub fn is_parse(&self) -> bool {
        matches!(self, StoreError::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
