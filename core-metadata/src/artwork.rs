//! Cover Artwork - Fetch, Store and Remove Work Covers
//!
//! Every catalog record may have one cover image, stored as
//! `<asset_dir>/RJ######.jpg`. Covers are best-effort: a missing or failed
//! cover never invalidates the record it belongs to.
//!
//! ## Overview
//!
//! - [`CoverStore`] persists and removes cover bytes by work identifier
//! - [`FileCoverStore`] keeps them in a directory through [`FileSystemAccess`]
//! - [`ArtworkService`] downloads a cover from the cover URL template and
//!   hands it to the store
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::artwork::{ArtworkService, FileCoverStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(FileCoverStore::new(file_system, "/srv/works/Images"));
//! let service = ArtworkService::new(http_client, store, "https://hvdb.me/WorkImages/RJ{code}.jpg");
//!
//! let stored = service.download_cover(id).await?;
//! ```

use crate::error::{MetadataError, Result};
use crate::template;
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_library::WorkId;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// File extension of stored covers
pub const COVER_EXTENSION: &str = "jpg";

/// Persistent storage for cover images
#[async_trait]
pub trait CoverStore: Send + Sync {
    /// Store (or replace) the cover of `id`
    async fn save(&self, id: WorkId, data: Bytes) -> Result<()>;

    /// Remove the cover of `id`
    ///
    /// # Returns
    /// - `Ok(true)` if a cover was removed
    /// - `Ok(false)` if there was no cover to remove
    async fn delete(&self, id: WorkId) -> Result<bool>;

    /// Whether a cover is stored for `id`
    async fn exists(&self, id: WorkId) -> Result<bool>;
}

/// Cover store backed by a directory on the file system
pub struct FileCoverStore {
    file_system: Arc<dyn FileSystemAccess>,
    asset_dir: PathBuf,
}

impl FileCoverStore {
    pub fn new(file_system: Arc<dyn FileSystemAccess>, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            file_system,
            asset_dir: asset_dir.into(),
        }
    }

    /// Location of the cover for `id` (`<asset_dir>/RJ######.jpg`)
    pub fn path_for(&self, id: WorkId) -> PathBuf {
        self.asset_dir.join(format!("{}.{}", id, COVER_EXTENSION))
    }
}

#[async_trait]
impl CoverStore for FileCoverStore {
    async fn save(&self, id: WorkId, data: Bytes) -> Result<()> {
        let path = self.path_for(id);
        self.file_system.write_file(&path, data).await?;
        debug!(work = %id, path = ?path, "Stored cover");
        Ok(())
    }

    async fn delete(&self, id: WorkId) -> Result<bool> {
        let path = self.path_for(id);
        match self.file_system.delete_file(&path).await {
            Ok(()) => {
                debug!(work = %id, path = ?path, "Deleted cover");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, id: WorkId) -> Result<bool> {
        Ok(self.file_system.exists(&self.path_for(id)).await?)
    }
}

/// Downloads covers and hands them to a [`CoverStore`]
pub struct ArtworkService {
    http_client: Arc<dyn HttpClient>,
    store: Arc<dyn CoverStore>,
    cover_url_template: String,
}

impl ArtworkService {
    /// Create a new ArtworkService
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client used for cover downloads
    /// * `store` - where downloaded covers are kept
    /// * `cover_url_template` - cover URL with `{code}` and/or `{id}` placeholders
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        store: Arc<dyn CoverStore>,
        cover_url_template: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            store,
            cover_url_template: cover_url_template.into(),
        }
    }

    /// The cover store covers are written to
    pub fn store(&self) -> &Arc<dyn CoverStore> {
        &self.store
    }

    /// Remote location of the cover for `id`
    pub fn cover_url(&self, id: WorkId) -> String {
        template::expand(&self.cover_url_template, id)
    }

    /// Fetch the cover image of `id`
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - the image
    /// - `Ok(None)` - the endpoint answered without a usable image
    /// - `Err` - the request itself failed
    pub async fn fetch_cover(&self, id: WorkId) -> Result<Option<Bytes>> {
        let url = self.cover_url(id);
        let request = HttpRequest::new(HttpMethod::Get, url.as_str());

        let response = self.http_client.execute(request).await.map_err(|e| {
            MetadataError::NetworkError(format!("Cover fetch for {} failed: {}", id, e))
        })?;

        if !response.is_success() {
            debug!(work = %id, status = response.status, url = %url, "No cover available");
            return Ok(None);
        }

        if response.body.is_empty() {
            debug!(work = %id, url = %url, "Cover response was empty");
            return Ok(None);
        }

        Ok(Some(response.body))
    }

    /// Download the cover of `id` and store it
    ///
    /// Returns `Ok(false)` when no cover was available to store.
    pub async fn download_cover(&self, id: WorkId) -> Result<bool> {
        let Some(data) = self.fetch_cover(id).await? else {
            return Ok(false);
        };

        let size = data.len();
        self.store
            .save(id, data)
            .await
            .map_err(|e| MetadataError::CoverStorage(format!("{}: {}", id, e)))?;

        info!(work = %id, size, "Cover stored");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::TokioFileSystem;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::HttpResponse;
    use mockall::mock;
    use std::collections::HashMap;
    use tempfile::TempDir;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    const TEMPLATE: &str = "https://covers.test/WorkImages/RJ{code}.jpg";

    fn id(raw: u32) -> WorkId {
        WorkId::new(raw).unwrap()
    }

    fn file_store(dir: &TempDir) -> Arc<FileCoverStore> {
        Arc::new(FileCoverStore::new(
            Arc::new(TokioFileSystem::new()),
            dir.path().join("Images"),
        ))
    }

    fn ok_response(status: u16, body: &'static [u8]) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from_static(body),
        }
    }

    #[test]
    fn test_cover_path() {
        let store = FileCoverStore::new(Arc::new(TokioFileSystem::new()), "/srv/Images");
        assert_eq!(
            store.path_for(id(100_001)),
            PathBuf::from("/srv/Images/RJ100001.jpg")
        );
        assert_eq!(
            store.path_for(id(7)),
            PathBuf::from("/srv/Images/RJ000007.jpg")
        );
    }

    #[tokio::test]
    async fn test_file_store_save_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        store.save(id(1), Bytes::from_static(b"jpeg")).await.unwrap();
        assert!(store.exists(id(1)).await.unwrap());
        assert!(dir.path().join("Images").join("RJ000001.jpg").exists());

        assert!(store.delete(id(1)).await.unwrap());
        assert!(!store.exists(id(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_delete_missing() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        assert!(!store.delete(id(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_download_cover_stores_image() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.url == "https://covers.test/WorkImages/RJ123456.jpg")
            .times(1)
            .returning(|_| Ok(ok_response(200, b"\xFF\xD8\xFFimage")));

        let service = ArtworkService::new(Arc::new(http), store.clone(), TEMPLATE);
        assert!(service.download_cover(id(123_456)).await.unwrap());

        let stored = std::fs::read(store.path_for(id(123_456))).unwrap();
        assert_eq!(stored, b"\xFF\xD8\xFFimage");
    }

    #[tokio::test]
    async fn test_download_cover_not_found_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(ok_response(404, b"")));

        let service = ArtworkService::new(Arc::new(http), store.clone(), TEMPLATE);
        assert!(!service.download_cover(id(5)).await.unwrap());
        assert!(!store.exists(id(5)).await.unwrap());
    }

    #[tokio::test]
    async fn test_download_cover_network_failure() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("timed out".to_string())));

        let service = ArtworkService::new(Arc::new(http), store, TEMPLATE);
        let err = service.download_cover(id(5)).await.unwrap_err();
        assert!(matches!(err, MetadataError::NetworkError(_)));
    }
}
