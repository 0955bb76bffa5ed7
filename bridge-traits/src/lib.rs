//! # Host Bridge Traits
//!
//! Platform abstraction traits the sync core depends on.
//!
//! ## Overview
//!
//! This crate defines the contract between the reconciliation core and the
//! concrete I/O it needs. The core never touches `tokio::fs` or `reqwest`
//! directly; it talks to these traits so tests can substitute in-memory fakes
//! and hosts can inject their own adapters.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP requests (metadata and cover fetches)
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Folder enumeration, presence checks, asset files
//!
//! The desktop implementations live in `bridge-desktop`.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Keep `std::io::Error` intact (`BridgeError::Io`) so callers can inspect the kind
//! - Include error context (e.g., file paths, HTTP status)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`
//! across the tasks of a sync run.
//!
//! ## Examples
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
//!
//! async fn fetch(client: &dyn HttpClient) -> bridge_traits::error::Result<serde_json::Value> {
//!     let response = client
//!         .execute(HttpRequest::new(HttpMethod::Get, "https://example.com/RJ000001.json"))
//!         .await?;
//!     response.json()
//! }
//! ```

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FileMetadata, FileSystemAccess};
