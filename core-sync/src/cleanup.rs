//! # Cleanup Pass
//!
//! Removes catalog records whose content folder no longer exists, together
//! with their cover asset.
//!
//! Every record is checked concurrently on the current task. The record
//! deletion decides the outcome; the cover deletion that follows it is
//! best-effort and only logged.
//!
//! With [`CleanupFailurePolicy::FailFast`] the first failed record check or
//! deletion fails the whole pass. With [`CleanupFailurePolicy::Isolate`]
//! failures are counted in the report and the pass carries on.

use crate::{Result, SyncError};
use bridge_traits::storage::FileSystemAccess;
use core_library::{WorkEntry, WorkRepository};
use core_metadata::CoverStore;
use core_runtime::CleanupFailurePolicy;
use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome counts of a cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Records examined
    pub checked: u64,
    /// Records removed because their folder was gone
    pub removed: u64,
    /// Removed records whose cover could not be deleted (absent or failed)
    pub covers_missing: u64,
    /// Records that could not be checked or removed (isolated failures only)
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Present,
    Removed { cover_deleted: bool },
}

impl CleanupReport {
    fn record(&mut self, outcome: RecordOutcome) {
        if let RecordOutcome::Removed { cover_deleted } = outcome {
            self.removed += 1;
            if !cover_deleted {
                self.covers_missing += 1;
            }
        }
    }
}

/// Diffs catalog records against the content root and removes orphans
pub struct CleanupPass {
    repository: Arc<dyn WorkRepository>,
    file_system: Arc<dyn FileSystemAccess>,
    covers: Arc<dyn CoverStore>,
    root_dir: PathBuf,
    policy: CleanupFailurePolicy,
}

impl CleanupPass {
    pub fn new(
        repository: Arc<dyn WorkRepository>,
        file_system: Arc<dyn FileSystemAccess>,
        covers: Arc<dyn CoverStore>,
        root_dir: impl Into<PathBuf>,
        policy: CleanupFailurePolicy,
    ) -> Self {
        Self {
            repository,
            file_system,
            covers,
            root_dir: root_dir.into(),
            policy,
        }
    }

    /// Run the pass to completion
    ///
    /// # Errors
    ///
    /// Fails if the catalog cannot be listed, and under `FailFast` on the
    /// first record whose check or deletion fails.
    pub async fn run(&self) -> Result<CleanupReport> {
        let entries = self.repository.list_all().await?;
        let mut report = CleanupReport {
            checked: entries.len() as u64,
            ..CleanupReport::default()
        };

        debug!(records = entries.len(), policy = ?self.policy, "Checking catalog records");

        let checks = entries.iter().map(|entry| self.check_record(entry));

        match self.policy {
            CleanupFailurePolicy::FailFast => {
                for outcome in try_join_all(checks).await? {
                    report.record(outcome);
                }
            }
            CleanupFailurePolicy::Isolate => {
                for result in join_all(checks).await {
                    match result {
                        Ok(outcome) => report.record(outcome),
                        Err(e) => {
                            warn!(error = %e, "Record cleanup failed");
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        info!(
            checked = report.checked,
            removed = report.removed,
            failed = report.failed,
            "Cleanup pass finished"
        );
        Ok(report)
    }

    async fn check_record(&self, entry: &WorkEntry) -> Result<RecordOutcome> {
        let path = self.root_dir.join(&entry.dir);

        let present = self
            .file_system
            .exists(&path)
            .await
            .map_err(|source| SyncError::PresenceCheck {
                id: entry.id,
                path: path.clone(),
                source,
            })?;

        if present {
            return Ok(RecordOutcome::Present);
        }

        info!(work = %entry.id, dir = %entry.dir, "Folder is missing from filesystem, removing from catalog");

        let deleted = self
            .repository
            .delete(entry.id)
            .await
            .map_err(|source| SyncError::CatalogDelete {
                id: entry.id,
                source,
            })?;

        if !deleted {
            debug!(work = %entry.id, "Record was already gone");
        }

        let cover_deleted = match self.covers.delete(entry.id).await {
            Ok(true) => true,
            Ok(false) => {
                debug!(work = %entry.id, "No cover to delete");
                false
            }
            Err(e) => {
                warn!(work = %entry.id, error = %e, "Failed to delete cover");
                false
            }
        };

        Ok(RecordOutcome::Removed { cover_deleted })
    }
}
