//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations for catalog access.
//!
//! - Traits define the interface the sync core depends on
//! - SQLite implementations use sqlx for async database access
//! - All operations return `Result<T>` for error handling

pub mod work;

pub use work::{SqliteWorkRepository, WorkRepository};
