use bridge_traits::error::BridgeError;
use core_library::{LibraryError, WorkId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Folder name '{0}' does not contain an RJ###### code")]
    InvalidFolderName(String),

    #[error("Failed to prepare asset directory {path:?}: {source}")]
    AssetRoot {
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to list content folders in {path:?}: {source}")]
    FolderListing {
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to check folder {path:?} of {id}: {source}")]
    PresenceCheck {
        id: WorkId,
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to remove {id} from the catalog: {source}")]
    CatalogDelete {
        id: WorkId,
        #[source]
        source: LibraryError,
    },

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Catalog error: {0}")]
    Library(#[from] LibraryError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
