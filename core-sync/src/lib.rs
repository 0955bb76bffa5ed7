//! # Catalog Sync Core
//!
//! Reconciles the persisted work catalog with a directory of `RJ######`
//! content folders.
//!
//! ## Components
//!
//! - [`identifier`]: folder name → [`core_library::WorkId`]
//! - [`cleanup::CleanupPass`]: removes records whose folder disappeared
//! - [`ingestion::IngestionPass`]: creates records for new folders
//! - [`coordinator::SyncCoordinator`]: runs both passes under the
//!   [`job::SyncJob`] state machine and reports a [`job::SyncSummary`]

pub mod cleanup;
pub mod coordinator;
pub mod error;
pub mod identifier;
pub mod ingestion;
pub mod job;

pub use cleanup::{CleanupPass, CleanupReport};
pub use coordinator::{SyncConfig, SyncCoordinator};
pub use error::{Result, SyncError};
pub use identifier::extract_work_id;
pub use ingestion::{FolderOutcome, IngestionPass, IngestionReport};
pub use job::{SyncJob, SyncJobId, SyncPhase, SyncSummary};
