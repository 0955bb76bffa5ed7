//! # Work Metadata & Cover Assets
//!
//! Fetches descriptive metadata for works from an external source and
//! manages the cover images stored next to the catalog.
//!
//! - [`MetadataSource`]: identifier in, [`core_library::WorkMetadata`] out
//! - [`providers::HttpMetadataSource`]: JSON endpoint addressed by a URL template
//! - [`artwork`]: cover download, storage and removal

pub mod artwork;
pub mod error;
pub mod providers;
pub mod source;
pub mod template;

pub use artwork::{ArtworkService, CoverStore, FileCoverStore};
pub use error::{MetadataError, Result};
pub use providers::HttpMetadataSource;
pub use source::MetadataSource;
