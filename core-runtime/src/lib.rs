//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the catalog sync core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the configuration value handed to the sync coordinator and
//! the logging conventions used throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CleanupFailurePolicy, CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
