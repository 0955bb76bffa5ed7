//! # Core Configuration Module
//!
//! Provides configuration management for the catalog sync core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds every setting a sync run needs. The value is passed
//! explicitly into the sync coordinator, so several runs (or tests) can use
//! distinct content roots side by side.
//!
//! Configuration can also be loaded from a JSON file with camelCase keys:
//!
//! ```json
//! {
//!   "rootDir": "/srv/works",
//!   "metadataUrlTemplate": "https://metadata.example/works/RJ{code}.json",
//!   "cleanupFailurePolicy": "failFast"
//! }
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .root_dir("/srv/works")
//!     .metadata_url_template("https://metadata.example/works/RJ{code}.json")
//!     .build()?;
//! ```
//!
//! ## Templates
//!
//! URL templates accept two placeholders:
//! - `{code}` - zero-padded six digit work code (`000123`)
//! - `{id}` - the raw numeric identifier (`123`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default name of the cover asset directory under the content root
pub const DEFAULT_ASSET_DIR_NAME: &str = "Images";

/// Default cover image endpoint
pub const DEFAULT_COVER_URL_TEMPLATE: &str = "https://hvdb.me/WorkImages/RJ{code}.jpg";

/// Default database file name, created under the content root
pub const DEFAULT_DATABASE_FILE_NAME: &str = "db.sqlite3";

/// How the cleanup pass reacts when deleting one stale record fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CleanupFailurePolicy {
    /// The first failed deletion aborts the pass and the run
    #[default]
    FailFast,
    /// Failed deletions are logged and counted; the pass carries on
    Isolate,
}

/// Core configuration for a sync run.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Directory scanned for `RJ######` content folders
    pub root_dir: PathBuf,

    /// Path to the SQLite catalog file
    pub database_path: PathBuf,

    /// Name of the cover asset directory under `root_dir`
    pub asset_dir_name: String,

    /// Metadata endpoint template
    pub metadata_url_template: String,

    /// Cover image endpoint template
    pub cover_url_template: String,

    /// Cleanup pass failure handling
    pub cleanup_failure_policy: CleanupFailurePolicy,

    /// User agent sent with every HTTP request
    pub user_agent: String,
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Loads configuration from a JSON file.
    ///
    /// Keys are camelCase. Missing optional keys take their defaults and the
    /// result is validated exactly like a builder-made config.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        CoreConfigBuilder::from_json_file(path)?.build()
    }

    /// Parses configuration from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        CoreConfigBuilder::from_json_str(raw)?.build()
    }

    /// Directory holding cover assets (`<root_dir>/<asset_dir_name>`)
    pub fn asset_dir(&self) -> PathBuf {
        self.root_dir.join(&self.asset_dir_name)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Root directory and database path are not empty
    /// - The asset directory is a single plain path component
    /// - Both URL templates carry at least one placeholder
    pub fn validate(&self) -> Result<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(Error::Config("Root directory cannot be empty".to_string()));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        let mut components = Path::new(&self.asset_dir_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(Error::Config(format!(
                    "Asset directory name must be a single path component, got '{}'",
                    self.asset_dir_name
                )))
            }
        }

        validate_template("metadata", &self.metadata_url_template)?;
        validate_template("cover", &self.cover_url_template)?;

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("User agent cannot be empty".to_string()));
        }

        Ok(())
    }
}

fn validate_template(kind: &str, template: &str) -> Result<()> {
    if template.trim().is_empty() {
        return Err(Error::Config(format!("The {} URL template is not set", kind)));
    }
    if !template.contains("{code}") && !template.contains("{id}") {
        return Err(Error::Config(format!(
            "The {} URL template must contain {{code}} or {{id}}: {}",
            kind, template
        )));
    }
    Ok(())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Debug, Default, Clone)]
pub struct CoreConfigBuilder {
    root_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
    asset_dir_name: Option<String>,
    metadata_url_template: Option<String>,
    cover_url_template: Option<String>,
    cleanup_failure_policy: Option<CleanupFailurePolicy>,
    user_agent: Option<String>,
}

impl CoreConfigBuilder {
    /// Seeds a builder from a JSON config file, leaving room for overrides
    /// before [`build()`](CoreConfigBuilder::build).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Seeds a builder from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: FileConfig = serde_json::from_str(raw)?;
        Ok(file.into_builder())
    }

    /// Sets the content root directory (required).
    pub fn root_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the database path.
    ///
    /// Default: `<root_dir>/db.sqlite3`
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the cover asset directory name.
    ///
    /// Default: `Images`
    pub fn asset_dir_name(mut self, name: impl Into<String>) -> Self {
        self.asset_dir_name = Some(name.into());
        self
    }

    /// Sets the metadata endpoint template (required).
    pub fn metadata_url_template(mut self, template: impl Into<String>) -> Self {
        self.metadata_url_template = Some(template.into());
        self
    }

    /// Sets the cover image endpoint template.
    pub fn cover_url_template(mut self, template: impl Into<String>) -> Self {
        self.cover_url_template = Some(template.into());
        self
    }

    /// Sets how the cleanup pass handles a failed deletion.
    pub fn cleanup_failure_policy(mut self, policy: CleanupFailurePolicy) -> Self {
        self.cleanup_failure_policy = Some(policy);
        self
    }

    /// Sets the HTTP user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the root directory or metadata template is
    /// missing, or when [`CoreConfig::validate`] rejects the result.
    pub fn build(self) -> Result<CoreConfig> {
        let root_dir = self
            .root_dir
            .ok_or_else(|| Error::Config("Root directory is required".to_string()))?;

        let metadata_url_template = self.metadata_url_template.ok_or_else(|| {
            Error::Config("Metadata URL template is required".to_string())
        })?;

        let database_path = self
            .database_path
            .unwrap_or_else(|| root_dir.join(DEFAULT_DATABASE_FILE_NAME));

        let config = CoreConfig {
            root_dir,
            database_path,
            asset_dir_name: self
                .asset_dir_name
                .unwrap_or_else(|| DEFAULT_ASSET_DIR_NAME.to_string()),
            metadata_url_template,
            cover_url_template: self
                .cover_url_template
                .unwrap_or_else(|| DEFAULT_COVER_URL_TEMPLATE.to_string()),
            cleanup_failure_policy: self.cleanup_failure_policy.unwrap_or_default(),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| format!("catalog-sync/{}", env!("CARGO_PKG_VERSION"))),
        };

        config.validate()?;
        Ok(config)
    }
}

/// On-disk representation of the configuration file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FileConfig {
    root_dir: PathBuf,
    #[serde(default)]
    database_path: Option<PathBuf>,
    #[serde(default)]
    asset_dir_name: Option<String>,
    metadata_url_template: String,
    #[serde(default)]
    cover_url_template: Option<String>,
    #[serde(default)]
    cleanup_failure_policy: Option<CleanupFailurePolicy>,
    #[serde(default)]
    user_agent: Option<String>,
}

impl FileConfig {
    fn into_builder(self) -> CoreConfigBuilder {
        CoreConfigBuilder {
            root_dir: Some(self.root_dir),
            database_path: self.database_path,
            asset_dir_name: self.asset_dir_name,
            metadata_url_template: Some(self.metadata_url_template),
            cover_url_template: self.cover_url_template,
            cleanup_failure_policy: self.cleanup_failure_policy,
            user_agent: self.user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const METADATA: &str = "https://metadata.example/works/RJ{code}.json";

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfig::builder()
            .root_dir("/srv/works")
            .metadata_url_template(METADATA)
            .build()
            .unwrap();

        assert_eq!(config.root_dir, PathBuf::from("/srv/works"));
        assert_eq!(config.database_path, PathBuf::from("/srv/works/db.sqlite3"));
        assert_eq!(config.asset_dir_name, "Images");
        assert_eq!(config.asset_dir(), PathBuf::from("/srv/works/Images"));
        assert_eq!(config.cover_url_template, DEFAULT_COVER_URL_TEMPLATE);
        assert_eq!(config.cleanup_failure_policy, CleanupFailurePolicy::FailFast);
        assert!(config.user_agent.starts_with("catalog-sync/"));
    }

    #[test]
    fn test_builder_requires_root_dir() {
        let err = CoreConfig::builder()
            .metadata_url_template(METADATA)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Root directory"));
    }

    #[test]
    fn test_builder_requires_metadata_template() {
        let err = CoreConfig::builder().root_dir("/srv/works").build().unwrap_err();
        assert!(err.to_string().contains("Metadata URL template"));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let result = CoreConfig::builder()
            .root_dir("/srv/works")
            .metadata_url_template("https://metadata.example/works")
            .build();
        assert!(result.is_err());

        let result = CoreConfig::builder()
            .root_dir("/srv/works")
            .metadata_url_template(METADATA)
            .cover_url_template("https://covers.example/static.jpg")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_asset_dir_must_be_single_component() {
        for bad in ["", "a/b", "..", "/abs"] {
            let result = CoreConfig::builder()
                .root_dir("/srv/works")
                .metadata_url_template(METADATA)
                .asset_dir_name(bad)
                .build();
            assert!(result.is_err(), "asset dir '{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_from_json_str() {
        let config = CoreConfig::from_json_str(
            r#"{
                "rootDir": "/srv/works",
                "databasePath": "/var/lib/catalog.db",
                "metadataUrlTemplate": "https://metadata.example/{id}",
                "cleanupFailurePolicy": "isolate"
            }"#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/catalog.db"));
        assert_eq!(config.cleanup_failure_policy, CleanupFailurePolicy::Isolate);
        assert_eq!(config.asset_dir_name, "Images");
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = CoreConfig::from_json_str(
            r#"{"rootDir": "/srv", "metadataUrlTemplate": "x/{id}", "rootdir": "/typo"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rootDir": "/srv/works", "metadataUrlTemplate": "{}"}}"#,
            METADATA
        )
        .unwrap();

        let config = CoreConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.metadata_url_template, METADATA);
    }

    #[test]
    fn test_from_missing_file() {
        let err = CoreConfig::from_json_file("/definitely/not/here/config.json").unwrap_err();
        assert!(matches!(err, Error::ConfigFile { .. }));
    }

    #[test]
    fn test_root_dir_override_moves_default_database() {
        let config = CoreConfigBuilder::from_json_str(
            r#"{"rootDir": "/srv/works", "metadataUrlTemplate": "x/{id}"}"#,
        )
        .unwrap()
        .root_dir("/mnt/other")
        .build()
        .unwrap();

        assert_eq!(config.root_dir, PathBuf::from("/mnt/other"));
        assert_eq!(config.database_path, PathBuf::from("/mnt/other/db.sqlite3"));
    }
}
