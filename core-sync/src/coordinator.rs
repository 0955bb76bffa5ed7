//! # Sync Coordinator
//!
//! Reconciles the work catalog with the content root.
//!
//! ## Workflow
//!
//! 1. **Bootstrapping**: create the asset directory (an existing one is fine)
//! 2. **Cleaning up**: remove records whose folder disappeared, with their covers
//! 3. **Ingesting**: list the content folders, then create records for new ones
//! 4. **Done**: log the summary and release the catalog connection
//!
//! Any fatal error in steps 1-3 moves the run to `Failed` and is returned to
//! the caller; no partial summary is produced. Cleanup always finishes before
//! the folder listing starts.
//!
//! Cover downloads started during ingestion keep running after [`SyncCoordinator::run`]
//! returns. Call [`SyncCoordinator::wait_for_background_tasks`] to settle them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{SyncConfig, SyncCoordinator};
//!
//! let coordinator = SyncCoordinator::new(
//!     SyncConfig::from(&core_config),
//!     repository,
//!     file_system,
//!     metadata_source,
//!     artwork,
//! );
//!
//! let summary = coordinator.run().await?;
//! coordinator.wait_for_background_tasks().await;
//! println!("Skipped {} folders", summary.skipped());
//! ```

use crate::{
    cleanup::CleanupPass,
    ingestion::IngestionPass,
    job::{SyncJob, SyncSummary},
    Result, SyncError,
};
use bridge_traits::storage::FileSystemAccess;
use core_library::WorkRepository;
use core_metadata::{ArtworkService, MetadataSource};
use core_runtime::{CleanupFailurePolicy, CoreConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument};

/// Settings the coordinator needs from the runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Directory holding the content folders
    pub root_dir: PathBuf,
    /// Name of the cover directory under `root_dir`
    pub asset_dir_name: String,
    /// Cleanup pass failure handling
    pub cleanup_failure_policy: CleanupFailurePolicy,
}

impl SyncConfig {
    /// Directory holding cover assets
    pub fn asset_dir(&self) -> PathBuf {
        self.root_dir.join(&self.asset_dir_name)
    }
}

impl From<&CoreConfig> for SyncConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            asset_dir_name: config.asset_dir_name.clone(),
            cleanup_failure_policy: config.cleanup_failure_policy,
        }
    }
}

/// Drives one reconciliation run through its phases
pub struct SyncCoordinator {
    config: SyncConfig,
    repository: Arc<dyn WorkRepository>,
    file_system: Arc<dyn FileSystemAccess>,
    metadata: Arc<dyn MetadataSource>,
    artwork: Arc<ArtworkService>,
    background: TaskTracker,
}

impl SyncCoordinator {
    pub fn new(
        config: SyncConfig,
        repository: Arc<dyn WorkRepository>,
        file_system: Arc<dyn FileSystemAccess>,
        metadata: Arc<dyn MetadataSource>,
        artwork: Arc<ArtworkService>,
    ) -> Self {
        Self {
            config,
            repository,
            file_system,
            metadata,
            artwork,
            background: TaskTracker::new(),
        }
    }

    /// Run a full reconciliation
    ///
    /// # Errors
    ///
    /// Returns the fatal error that moved the run to `Failed`: asset
    /// directory creation, a cleanup failure, or the folder listing.
    pub async fn run(&self) -> Result<SyncSummary> {
        let job = SyncJob::new();
        info!(job_id = %job.id, root = ?self.config.root_dir, "Starting catalog sync");
        self.run_phases(job).await
    }

    /// Wait until every spawned cover download has finished
    pub async fn wait_for_background_tasks(&self) {
        self.background.close();
        debug!(pending = self.background.len(), "Waiting for cover downloads");
        self.background.wait().await;
        self.background.reopen();
    }

    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn run_phases(&self, job: SyncJob) -> Result<SyncSummary> {
        if let Err(e) = self.bootstrap().await {
            return Err(Self::abort(job, e));
        }

        let job = job.begin_cleanup()?;
        let cleanup = match self.cleanup_pass().run().await {
            Ok(report) => report,
            Err(e) => return Err(Self::abort(job, e)),
        };

        // Cleanup has fully completed here; ingestion starts from a settled catalog
        let job = job.begin_ingestion()?;
        let folders = match self.list_candidate_folders().await {
            Ok(folders) => folders,
            Err(e) => return Err(Self::abort(job, e)),
        };
        let ingestion = self.ingestion_pass().run(&folders).await;

        let summary = SyncSummary {
            job_id: job.id,
            cleanup,
            ingestion,
        };
        let job = job.complete(summary.clone())?;

        info!(
            ingested = summary.ingested(),
            skipped = summary.skipped(),
            rejected = summary.ingestion.rejected,
            removed = summary.removed(),
            duration_ms = job.duration_ms().unwrap_or_default(),
            "Finished scan. Skipped {} folders already in database.",
            summary.skipped()
        );

        self.repository.close().await?;
        Ok(summary)
    }

    /// Create the asset directory; an existing one is accepted
    async fn bootstrap(&self) -> Result<()> {
        let asset_dir = self.config.asset_dir();
        match self.file_system.create_dir(&asset_dir).await {
            Ok(()) => {
                info!(path = ?asset_dir, "Created asset directory");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                debug!(path = ?asset_dir, "Asset directory already exists");
                Ok(())
            }
            Err(source) => Err(SyncError::AssetRoot {
                path: asset_dir,
                source,
            }),
        }
    }

    /// Immediate subdirectories of the content root, minus the asset directory
    async fn list_candidate_folders(&self) -> Result<Vec<String>> {
        let root = &self.config.root_dir;
        let mut folders = self
            .file_system
            .list_subdirectories(root)
            .await
            .map_err(|source| SyncError::FolderListing {
                path: root.clone(),
                source,
            })?;

        folders.retain(|name| name != &self.config.asset_dir_name);
        debug!(count = folders.len(), "Listed content folders");
        Ok(folders)
    }

    fn cleanup_pass(&self) -> CleanupPass {
        CleanupPass::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.file_system),
            Arc::clone(self.artwork.store()),
            self.config.root_dir.clone(),
            self.config.cleanup_failure_policy,
        )
    }

    fn ingestion_pass(&self) -> IngestionPass {
        IngestionPass::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.metadata),
            Arc::clone(&self.artwork),
            self.background.clone(),
        )
    }

    fn abort(job: SyncJob, error: SyncError) -> SyncError {
        let phase = job.phase;
        error!(phase = %phase, error = %error, "Sync failed");
        if let Err(e) = job.fail(error.to_string()) {
            debug!(error = %e, "Job was already terminal");
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_from_core_config() {
        let core = CoreConfig::builder()
            .root_dir("/srv/works")
            .metadata_url_template("http://localhost/api/RJ{code}")
            .asset_dir_name("Covers")
            .cleanup_failure_policy(CleanupFailurePolicy::Isolate)
            .build()
            .unwrap();

        let config = SyncConfig::from(&core);
        assert_eq!(config.root_dir, PathBuf::from("/srv/works"));
        assert_eq!(config.asset_dir(), PathBuf::from("/srv/works/Covers"));
        assert_eq!(config.cleanup_failure_policy, CleanupFailurePolicy::Isolate);
    }
}
