//! # Ingestion Pass
//!
//! Creates catalog records for content folders the catalog does not know yet.
//!
//! Folders are processed concurrently on the current task and every folder is
//! isolated: a bad name, a failed metadata fetch or a failed insert only
//! affects that folder's outcome. Cover downloads are spawned on a
//! [`TaskTracker`] and are not awaited by the pass.

use crate::identifier::extract_work_id;
use core_library::{WorkId, WorkRecord, WorkRepository};
use core_metadata::{ArtworkService, MetadataSource};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// What happened to one candidate folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderOutcome {
    /// The name carries no work code
    Rejected,
    /// A record with this identifier already exists
    AlreadyPresent,
    /// Lookup, metadata fetch or insert failed
    Failed,
    /// A new record was inserted
    Ingested,
}

/// Outcome counts of an ingestion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub already_present: u64,
    pub failed: u64,
    pub rejected: u64,
    pub ingested: u64,
}

impl IngestionReport {
    /// Folders that did not produce a record
    pub fn skipped(&self) -> u64 {
        self.already_present + self.failed + self.rejected
    }

    /// Folders examined
    pub fn total(&self) -> u64 {
        self.already_present + self.failed + self.rejected + self.ingested
    }

    pub fn record(&mut self, outcome: FolderOutcome) {
        match outcome {
            FolderOutcome::Rejected => self.rejected += 1,
            FolderOutcome::AlreadyPresent => self.already_present += 1,
            FolderOutcome::Failed => self.failed += 1,
            FolderOutcome::Ingested => self.ingested += 1,
        }
    }
}

impl FromIterator<FolderOutcome> for IngestionReport {
    fn from_iter<I: IntoIterator<Item = FolderOutcome>>(iter: I) -> Self {
        let mut report = Self::default();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}

/// Diffs content folders against the catalog and creates new records
pub struct IngestionPass {
    repository: Arc<dyn WorkRepository>,
    metadata: Arc<dyn MetadataSource>,
    artwork: Arc<ArtworkService>,
    tracker: TaskTracker,
}

impl IngestionPass {
    /// Create a pass whose cover downloads are spawned on `tracker`
    pub fn new(
        repository: Arc<dyn WorkRepository>,
        metadata: Arc<dyn MetadataSource>,
        artwork: Arc<ArtworkService>,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            repository,
            metadata,
            artwork,
            tracker,
        }
    }

    /// Process every folder and return the joined outcome counts
    pub async fn run(&self, folders: &[String]) -> IngestionReport {
        debug!(folders = folders.len(), "Ingesting content folders");

        let outcomes = join_all(folders.iter().map(|folder| self.ingest_folder(folder))).await;
        let report: IngestionReport = outcomes.into_iter().collect();

        info!(
            ingested = report.ingested,
            skipped = report.skipped(),
            rejected = report.rejected,
            "Ingestion pass finished"
        );
        report
    }

    /// Bring one folder into the catalog
    pub async fn ingest_folder(&self, folder: &str) -> FolderOutcome {
        let id = match extract_work_id(folder) {
            Ok(id) => id,
            Err(e) => {
                warn!(folder, error = %e, "Skipping folder");
                return FolderOutcome::Rejected;
            }
        };

        match self.repository.count_by_id(id).await {
            Ok(0) => {}
            Ok(_) => {
                debug!(work = %id, folder, "Already in catalog");
                return FolderOutcome::AlreadyPresent;
            }
            Err(e) => {
                warn!(work = %id, error = %e, "Catalog lookup failed");
                return FolderOutcome::Failed;
            }
        }

        info!(work = %id, folder, "Found new folder, fetching metadata");

        let metadata = match self.metadata.fetch(id).await {
            Ok(metadata) => {
                info!(work = %id, title = %metadata.title, "Fetched metadata");
                metadata
            }
            Err(e) => {
                warn!(work = %id, error = %e, "Failed to fetch metadata");
                return FolderOutcome::Failed;
            }
        };

        self.spawn_cover_download(id);

        let record = WorkRecord::new(id, folder, metadata);
        match self.repository.insert(&record).await {
            Ok(()) => {
                info!(work = %id, title = %record.metadata.title, "Metadata saved");
                FolderOutcome::Ingested
            }
            Err(e) => {
                warn!(work = %id, error = %e, "Failed to insert record");
                FolderOutcome::Failed
            }
        }
    }

    fn spawn_cover_download(&self, id: WorkId) {
        let artwork = Arc::clone(&self.artwork);
        self.tracker.spawn(async move {
            match artwork.download_cover(id).await {
                Ok(true) => {}
                Ok(false) => debug!(work = %id, "Cover not available"),
                Err(e) => warn!(work = %id, error = %e, "Cover download failed"),
            }
        });
    }
}
