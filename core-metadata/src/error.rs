use core_library::WorkId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Invalid metadata for {id}: {message}")]
    InvalidMetadata { id: WorkId, message: String },

    #[error("Cover storage failed: {0}")]
    CoverStorage(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
