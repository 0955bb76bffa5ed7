//! External Metadata Providers
//!
//! - HTTP/JSON - a metadata endpoint addressed by a URL template

pub mod http;

pub use http::HttpMetadataSource;
