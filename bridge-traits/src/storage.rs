//! Storage and File System Abstractions
//!
//! Provides a platform-agnostic trait for the file operations the sync core
//! performs: enumerating content folders, checking that a folder still exists,
//! and writing or deleting cover assets.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;
use tracing::warn;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// File system access trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn store_cover(fs: &dyn FileSystemAccess, dir: &Path, data: Bytes) -> Result<()> {
///     fs.write_file(&dir.join("RJ000001.jpg"), data).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    ///
    /// Errors other than "not found" (e.g. permission denied) are returned
    /// rather than reported as absence.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Create a single directory
    ///
    /// Fails with an `AlreadyExists` IO error if the directory is present, so
    /// callers can decide whether that is acceptable.
    async fn create_dir(&self, path: &Path) -> Result<()>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Write data to a file, creating it if it doesn't exist
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// List all entries in a directory
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// List the names of the immediate subdirectories of `path`, sorted
    ///
    /// Regular files are skipped. Entries that vanish between the listing and
    /// the metadata lookup (including dangling symlinks) are skipped, and so
    /// are names that are not valid UTF-8; both are logged at warn.
    async fn list_subdirectories(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in self.list_directory(path).await? {
            match self.metadata(&entry).await {
                Ok(metadata) if metadata.is_directory => {}
                Ok(_) => continue,
                Err(e) if e.is_not_found() => {
                    warn!(entry = ?entry, "Skipping entry that cannot be resolved");
                    continue;
                }
                Err(e) => return Err(e),
            }
            match entry.file_name().and_then(|n| n.to_str()) {
                Some(name) => names.push(name.to_string()),
                None => warn!(entry = ?entry, "Skipping folder with a non UTF-8 name"),
            }
        }
        names.sort();
        Ok(names)
    }
}
