//! # Catalog Management Module
//!
//! Owns the persisted work catalog and provides the repository used by the
//! sync core to read and write it.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite connection pooling and the embedded schema migration
//! - Domain models for works, circles, tags and voice actors
//! - The `WorkRepository` trait and its SQLite implementation

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{LibraryError, Result};
pub use models::{Circle, Tag, VoiceActor, WorkEntry, WorkId, WorkMetadata, WorkRecord};
pub use repositories::{SqliteWorkRepository, WorkRepository};
