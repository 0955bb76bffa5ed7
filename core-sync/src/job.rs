//! # Sync Job State Machine
//!
//! Tracks one reconciliation run through its phases with validated
//! transitions.
//!
//! ## State Machine
//!
//! ```text
//! Bootstrapping → CleaningUp → Ingesting → Done
//!       ↓              ↓            ↓
//!       └──────────→ Failed ←──────┘
//! ```
//!
//! `Done` and `Failed` are terminal. A job is never persisted; its id tags
//! the tracing span of the run and its summary is handed back to the caller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let job = SyncJob::new();
//! let job = job.begin_cleanup()?;
//! let job = job.begin_ingestion()?;
//! let job = job.complete(summary)?;
//! ```

use crate::cleanup::CleanupReport;
use crate::ingestion::IngestionReport;
use crate::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncJobId(Uuid);

impl SyncJobId {
    /// Create a new random sync job ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SyncJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SyncJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Phase Types
// ============================================================================

/// The phase a sync run is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Preparing the asset directory
    Bootstrapping,
    /// Removing records whose folder disappeared
    CleaningUp,
    /// Creating records for new folders
    Ingesting,
    /// Summary emitted, catalog connection released
    Done,
    /// A fatal error ended the run
    Failed,
}

impl SyncPhase {
    /// Check if this phase ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Done | SyncPhase::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::Bootstrapping => "bootstrapping",
            SyncPhase::CleaningUp => "cleaning_up",
            SyncPhase::Ingesting => "ingesting",
            SyncPhase::Done => "done",
            SyncPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Final accounting of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub job_id: SyncJobId,
    pub cleanup: CleanupReport,
    pub ingestion: IngestionReport,
}

impl SyncSummary {
    /// Folders that did not produce a new record (already present or failed)
    pub fn skipped(&self) -> u64 {
        self.ingestion.skipped()
    }

    /// Records created by this run
    pub fn ingested(&self) -> u64 {
        self.ingestion.ingested
    }

    /// Records removed by this run
    pub fn removed(&self) -> u64 {
        self.cleanup.removed
    }
}

// ============================================================================
// Sync Job Entity
// ============================================================================

/// A sync run with state machine semantics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJob {
    /// Unique identifier for this run
    pub id: SyncJobId,
    /// Current phase
    pub phase: SyncPhase,
    /// Summary (only available when done)
    pub summary: Option<SyncSummary>,
    /// Error message if failed
    pub error_message: Option<String>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal phase
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncJob {
    /// Create a new job in the `Bootstrapping` phase
    pub fn new() -> Self {
        Self {
            id: SyncJobId::new(),
            phase: SyncPhase::Bootstrapping,
            summary: None,
            error_message: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Enter the cleanup phase
    ///
    /// # Errors
    ///
    /// Returns an error if the job is not bootstrapping
    pub fn begin_cleanup(mut self) -> Result<Self> {
        self.transition(SyncPhase::CleaningUp)?;
        Ok(self)
    }

    /// Enter the ingestion phase
    ///
    /// # Errors
    ///
    /// Returns an error if the job is not cleaning up
    pub fn begin_ingestion(mut self) -> Result<Self> {
        self.transition(SyncPhase::Ingesting)?;
        Ok(self)
    }

    /// Mark the job as done with its summary
    ///
    /// # Errors
    ///
    /// Returns an error if the job is not ingesting
    pub fn complete(mut self, summary: SyncSummary) -> Result<Self> {
        self.transition(SyncPhase::Done)?;
        self.completed_at = Some(Utc::now());
        self.summary = Some(summary);
        Ok(self)
    }

    /// Mark the job as failed with an error message
    ///
    /// # Errors
    ///
    /// Returns an error if the job is already in a terminal phase
    pub fn fail(mut self, error_message: String) -> Result<Self> {
        self.transition(SyncPhase::Failed)?;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(error_message);
        Ok(self)
    }

    /// Duration of the run in milliseconds, once it has finished
    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    fn transition(&mut self, to: SyncPhase) -> Result<()> {
        self.validate_transition(to)?;
        self.phase = to;
        Ok(())
    }

    /// Validate a phase transition
    fn validate_transition(&self, to: SyncPhase) -> Result<()> {
        let valid = !self.phase.is_terminal()
            && matches!(
                (self.phase, to),
                (SyncPhase::Bootstrapping, SyncPhase::CleaningUp)
                    | (SyncPhase::CleaningUp, SyncPhase::Ingesting)
                    | (SyncPhase::Ingesting, SyncPhase::Done)
                    | (SyncPhase::Bootstrapping, SyncPhase::Failed)
                    | (SyncPhase::CleaningUp, SyncPhase::Failed)
                    | (SyncPhase::Ingesting, SyncPhase::Failed)
            );

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.phase.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.phase.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}

impl Default for SyncJob {
    fn default() -> Self {
        Self::new()
    }
}
