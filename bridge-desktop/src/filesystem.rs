//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileMetadata, FileSystemAccess},
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Stateless: every path is supplied by the caller, so one instance can serve
/// any number of content roots.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Create a new file system accessor
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let metadata = fs::metadata(path).await.map_err(Self::map_io_error)?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified_at: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64),
            is_directory: metadata.is_dir(),
        })
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory tree");
        Ok(())
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }

        fs::write(path, data.as_ref())
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(path).await.map_err(Self::map_io_error)?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(Self::map_io_error)?
        {
            entries.push(entry.path());
        }

        debug!(path = ?path, count = entries.len(), "Listed directory");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_delete() {
        let dir = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();
        let test_file = dir.path().join("nested").join("RJ000001.jpg");

        let data = Bytes::from("cover bytes");
        fs.write_file(&test_file, data.clone()).await.unwrap();
        assert!(fs.exists(&test_file).await.unwrap());

        assert_eq!(std::fs::read(&test_file).unwrap(), data.as_ref());

        fs.delete_file(&test_file).await.unwrap();
        assert!(!fs.exists(&test_file).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_dir_reports_already_exists() {
        let dir = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();
        let images = dir.path().join("Images");

        fs.create_dir(&images).await.unwrap();
        let err = fs.create_dir(&images).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();

        let err = fs
            .delete_file(&dir.path().join("missing.jpg"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_subdirectories_skips_files() {
        let dir = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();

        fs.create_dir(&dir.path().join("RJ000002")).await.unwrap();
        fs.create_dir(&dir.path().join("RJ000001")).await.unwrap();
        fs.write_file(&dir.path().join("notes.txt"), Bytes::from("x"))
            .await
            .unwrap();

        let names = fs.list_subdirectories(dir.path()).await.unwrap();
        assert_eq!(names, vec!["RJ000001".to_string(), "RJ000002".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_subdirectories_skips_dangling_symlinks() {
        let dir = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();

        fs.create_dir(&dir.path().join("RJ000001")).await.unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("stale-link")).unwrap();

        let names = fs.list_subdirectories(dir.path()).await.unwrap();
        assert_eq!(names, vec!["RJ000001".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_subdirectories_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();

        fs.create_dir(&dir.path().join("RJ000001")).await.unwrap();
        let raw = dir.path().join(OsStr::from_bytes(b"RJ000002\xff"));
        if std::fs::create_dir(&raw).is_err() {
            // Some filesystems refuse non UTF-8 names outright
            return;
        }

        let names = fs.list_subdirectories(dir.path()).await.unwrap();
        assert_eq!(names, vec!["RJ000001".to_string()]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();

        assert!(fs
            .list_subdirectories(&dir.path().join("does-not-exist"))
            .await
            .is_err());
    }
}
