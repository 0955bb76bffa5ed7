//! Metadata source abstraction

use crate::error::Result;
use async_trait::async_trait;
use core_library::{WorkId, WorkMetadata};

/// Supplies descriptive metadata for a work
///
/// A failed lookup is final for the current run; implementations do not
/// retry.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata for `id`
    ///
    /// # Errors
    ///
    /// Returns error if the source is unreachable, answers with a non-success
    /// status, or returns a payload that does not describe a work.
    async fn fetch(&self, id: WorkId) -> Result<WorkMetadata>;
}
