//! HTTP/JSON Metadata Provider
//!
//! Fetches work metadata from a JSON endpoint. The endpoint is addressed by a
//! URL template such as `https://api.example.com/work/RJ{code}`, expanded per
//! work (see [`crate::template`]).
//!
//! The response body must be a JSON object with at least a `title` field.
//! Everything else is kept verbatim in [`WorkMetadata::extra`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::providers::HttpMetadataSource;
//!
//! let source = HttpMetadataSource::new(http_client, "https://api.example.com/work/RJ{code}");
//! let metadata = source.fetch(WorkId::new(123456).unwrap()).await?;
//! ```

use crate::error::{MetadataError, Result};
use crate::source::MetadataSource;
use crate::template;
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_library::{WorkId, WorkMetadata};
use std::sync::Arc;
use tracing::debug;

/// Longest response body excerpt carried in an [`MetadataError::HttpError`]
const MAX_ERROR_BODY: usize = 256;

/// Metadata source backed by a JSON HTTP endpoint
pub struct HttpMetadataSource {
    http_client: Arc<dyn HttpClient>,
    url_template: String,
}

impl HttpMetadataSource {
    /// Creates a new provider
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `url_template` - endpoint URL with `{code}` and/or `{id}` placeholders
    pub fn new(http_client: Arc<dyn HttpClient>, url_template: impl Into<String>) -> Self {
        Self {
            http_client,
            url_template: url_template.into(),
        }
    }

    /// The request URL for `id`
    pub fn url_for(&self, id: WorkId) -> String {
        template::expand(&self.url_template, id)
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn fetch(&self, id: WorkId) -> Result<WorkMetadata> {
        let url = self.url_for(id);
        debug!(work = %id, url = %url, "Requesting work metadata");

        let request = HttpRequest::new(HttpMethod::Get, url).header("Accept", "application/json");

        let response = self.http_client.execute(request).await.map_err(|e| {
            MetadataError::NetworkError(format!("Metadata request for {} failed: {}", id, e))
        })?;

        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            return Err(MetadataError::HttpError {
                status: response.status,
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let metadata: WorkMetadata = serde_json::from_slice(&response.body).map_err(|e| {
            MetadataError::JsonParse(format!("Failed to parse metadata for {}: {}", id, e))
        })?;

        metadata
            .validate()
            .map_err(|message| MetadataError::InvalidMetadata { id, message })?;

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn source(mock: MockHttpClient) -> HttpMetadataSource {
        HttpMetadataSource::new(Arc::new(mock), "https://api.test/work/RJ{code}?id={id}")
    }

    #[test]
    fn test_url_for() {
        let source = source(MockHttpClient::new());
        assert_eq!(
            source.url_for(WorkId::new(1234).unwrap()),
            "https://api.test/work/RJ001234?id=1234"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get && req.url == "https://api.test/work/RJ123456?id=123456"
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"title":"Work","circle":{"id":3,"name":"C"},"tags":[],"vas":[],"age":"adult"}"#,
                ))
            });

        let metadata = source(mock).fetch(WorkId::new(123_456).unwrap()).await.unwrap();
        assert_eq!(metadata.title, "Work");
        assert_eq!(metadata.circle.unwrap().id, 3);
        assert_eq!(metadata.extra.get("age").and_then(|v| v.as_str()), Some("adult"));
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(response(404, "not found")));

        let err = source(mock).fetch(WorkId::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, MetadataError::HttpError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_network_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("Connection refused".to_string())));

        let err = source(mock).fetch(WorkId::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, MetadataError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(response(200, "<html>maintenance</html>")));

        let err = source(mock).fetch(WorkId::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, MetadataError::JsonParse(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_blank_title() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(response(200, r#"{"title":"   "}"#)));

        let err = source(mock).fetch(WorkId::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidMetadata { .. }));
    }
}
