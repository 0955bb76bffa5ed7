use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns the underlying `io::ErrorKind` when this error wraps an IO failure
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            BridgeError::Io(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// True when the error reports a path that already exists
    pub fn is_already_exists(&self) -> bool {
        self.io_kind() == Some(std::io::ErrorKind::AlreadyExists)
    }

    /// True when the error reports a missing path
    pub fn is_not_found(&self) -> bool {
        self.io_kind() == Some(std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
