//! Document store abstraction for testability.
//!
//! The [`DocumentStore`] trait covers the three calls a paginated scan needs:
//! opening a point-in-time snapshot, running a search against it, and releasing
//! it. Production code uses [`ElasticsearchClient`]; tests use `MockDocumentStore`
//! (behind the `mock` feature).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ PaginatedSearch  │
//! └────────┬─────────┘
//!          │
//!          ▼
//!   ┌──────────────┐
//!   │DocumentStore │ (trait)
//!   └──────────────┘
//!        │      │
//!        ▼      ▼
//!   ┌────────┐ ┌──────┐
//!   │Elastic │ │ Mock │
//!   └───┬────┘ └──────┘
//!       │ HTTPS (basic auth, optional proxy)
//!       ▼
//!   Elasticsearch
//! ```

use std::future::Future;

use reqwest::{Method, RequestBuilder};
use serde_json::json;
use tracing::debug;

use logwarden_core::config::ElasticsearchConfig;

use crate::error::SearchError;
use crate::types::{ErrorBody, PointInTime, SearchResponse};

/// Document store operations used by the cursor.
///
/// The trait is `Send + Sync` so a client can be shared by reference across
/// async calls.
///
/// # Implementations
///
/// - [`ElasticsearchClient`]: HTTP implementation using `reqwest`
/// - `MockDocumentStore`: scripted pages for tests (`mock` feature)
pub trait DocumentStore: Send + Sync {
    /// Opens a point-in-time snapshot on `index` and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if the store rejects the request or is unreachable.
    fn open_point_in_time(
        &self,
        index: &str,
        keep_alive: &str,
    ) -> impl Future<Output = Result<String, SearchError>> + Send;

    /// Executes a search request body.
    ///
    /// An empty `index` searches without an index in the path, which is
    /// required when the body carries a point-in-time.
    fn search(
        &self,
        index: &str,
        query: &str,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send;

    /// Releases a point-in-time snapshot.
    fn close_point_in_time(
        &self,
        pit_id: &str,
    ) -> impl Future<Output = Result<(), SearchError>> + Send;
}

/// Elasticsearch HTTP client.
pub struct ElasticsearchClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

impl ElasticsearchClient {
    /// Builds a client from the `[elasticsearch]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::ClientBuild` for an invalid proxy address or TLS setup.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.validate_ssl);

        if !config.proxy.is_empty() {
            let proxy_url = proxy_url(&config.proxy, config.socks);
            let proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| SearchError::ClientBuild {
                reason: format!("invalid proxy '{proxy_url}': {e}"),
            })?;
            builder = builder.proxy(proxy);
        }

        let http = builder.build().map_err(|e| SearchError::ClientBuild {
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// Base URL (`scheme://host:port`).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if self.user.is_empty() {
            request
        } else {
            request.basic_auth(&self.user, Some(&self.password))
        }
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<String, SearchError> {
        let response = request.send().await.map_err(|e| request_error(url, e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| request_error(url, e))?;

        if status.as_u16() > 399 {
            return Err(SearchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
                reason: error_reason(&body),
            });
        }

        debug!(url, status = status.as_u16(), bytes = body.len(), "store request completed");
        Ok(body)
    }
}

impl DocumentStore for ElasticsearchClient {
    async fn open_point_in_time(
        &self,
        index: &str,
        keep_alive: &str,
    ) -> Result<String, SearchError> {
        let url = format!("{}/{index}/_pit?keep_alive={keep_alive}", self.base_url);
        let body = self.execute(self.request(Method::POST, &url), &url).await?;
        let pit: PointInTime = serde_json::from_str(&body).map_err(|e| SearchError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok(pit.id)
    }

    async fn search(&self, index: &str, query: &str) -> Result<SearchResponse, SearchError> {
        let url = if index.is_empty() {
            format!("{}/_search", self.base_url)
        } else {
            format!("{}/{index}/_search", self.base_url)
        };
        let request = self.request(Method::POST, &url).body(query.to_owned());
        let body = self.execute(request, &url).await?;
        serde_json::from_str(&body).map_err(|e| SearchError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    async fn close_point_in_time(&self, pit_id: &str) -> Result<(), SearchError> {
        let url = format!("{}/_pit", self.base_url);
        let request = self
            .request(Method::DELETE, &url)
            .body(json!({ "id": pit_id }).to_string());
        self.execute(request, &url).await?;
        Ok(())
    }
}

fn proxy_url(proxy: &str, socks: bool) -> String {
    if proxy.contains("://") {
        proxy.to_owned()
    } else if socks {
        format!("socks5://{proxy}")
    } else {
        format!("http://{proxy}")
    }
}

fn request_error(url: &str, e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout {
            url: url.to_owned(),
        }
    } else {
        SearchError::Request {
            url: url.to_owned(),
            reason: e.to_string(),
        }
    }
}

/// Extracts `error.reason` from a store error body, falling back to the raw text.
fn error_reason(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.describe(),
        Err(_) if body.is_empty() => "empty response body".to_owned(),
        Err(_) => body.chars().take(512).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_url_adds_scheme() {
        assert_eq!(proxy_url("proxy:3128", false), "http://proxy:3128");
        assert_eq!(proxy_url("proxy:1080", true), "socks5://proxy:1080");
        assert_eq!(proxy_url("https://proxy:3128", false), "https://proxy:3128");
    }

    #[test]
    fn error_reason_prefers_store_reason() {
        let body = r#"{"error":{"type":"index_not_found_exception","reason":"no such index [logs]"},"status":404}"#;
        assert_eq!(
            error_reason(body),
            "index_not_found_exception: no such index [logs]"
        );
        assert_eq!(error_reason(""), "empty response body");
        assert_eq!(error_reason("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn client_builds_from_default_config() {
        let config = ElasticsearchConfig::default();
        let client = ElasticsearchClient::new(&config).expect("default config should build");
        assert_eq!(client.base_url(), "https://localhost:9200");
    }

    #[test]
    fn client_builds_with_socks_proxy() {
        let config = ElasticsearchConfig {
            proxy: "127.0.0.1:1080".to_owned(),
            socks: true,
            ssl: false,
            ..ElasticsearchConfig::default()
        };
        let client = ElasticsearchClient::new(&config).expect("socks proxy should build");
        assert_eq!(client.base_url(), "http://127.0.0.1:9200");
    }

    #[tokio::test]
    async fn unreachable_store_surfaces_request_error() {
        let config = ElasticsearchConfig {
            host: "127.0.0.1".to_owned(),
            port: 1,
            ssl: false,
            timeout_secs: 2,
            ..ElasticsearchConfig::default()
        };
        let client = ElasticsearchClient::new(&config).expect("should build");
        let err = client
            .search("", "{}")
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(
            err,
            SearchError::Request { .. } | SearchError::Timeout { .. }
        ));
    }
}
