//! Folder name to work identifier extraction

use crate::{Result, SyncError};
use core_library::WorkId;
use regex::Regex;
use std::sync::LazyLock;

static WORK_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RJ(\d{6})").expect("work code pattern is valid"));

/// Extract the work identifier from a content folder name
///
/// The first `RJ` followed by six digits wins, wherever it appears in the
/// name (`[Circle] RJ123456 Title` → `123456`). A seventh digit does not
/// prevent a match.
///
/// # Errors
///
/// Returns [`SyncError::InvalidFolderName`] when no code is present or the
/// code is `RJ000000`.
pub fn extract_work_id(folder_name: &str) -> Result<WorkId> {
    WORK_CODE
        .captures(folder_name)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
        .and_then(WorkId::new)
        .ok_or_else(|| SyncError::InvalidFolderName(folder_name.to_string()))
}
