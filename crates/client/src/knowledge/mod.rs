//! Knowledge base query client.
//!
//! Provides a typed client for the knowledge backend's search endpoint with
//! request validation and normalization of the legacy response shape.
//!
//! ### Specification
//!
//! - **Endpoint**: `POST {base_url}/knowledge/search` with a JSON body of
//!   `{query, language?, difficultyLevel?}`, answering
//!   `{text, confidence, references[]}`.
//! - **Legacy endpoint**: `GET {base_url}/knowledge/search?query=…`, answering
//!   `{response, references[]}`; normalized into the same answer struct.
//!
//! The worker treats these as ordinary GET/POST traffic; caching policy lives
//! in the route table, not here.

pub mod request;
pub mod response;

pub use request::KnowledgeQuery;
pub use response::{KnowledgeAnswer, LegacyAnswer, Reference};

use std::time::{Duration, Instant};

use reqwest::header;
use sahifa_core::Error;

/// Default base URL for the knowledge backend.
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "sahifa/0.1";

/// Knowledge client configuration.
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Base URL (default: http://localhost:8000/api/v1).
    pub base_url: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string (default: sahifa/0.x).
    pub user_agent: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Knowledge base query client.
#[derive(Debug, Clone)]
pub struct KnowledgeClient {
    http: reqwest::Client,
    config: KnowledgeConfig,
}

impl KnowledgeClient {
    /// Create a new knowledge client with the given configuration.
    pub fn new(config: KnowledgeConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Execute a knowledge base query.
    pub async fn search(&self, req: KnowledgeQuery) -> Result<KnowledgeAnswer, Error> {
        req.validate()?;

        let start = Instant::now();
        let url = format!("{}/knowledge/search", self.config.base_url);

        tracing::debug!("querying knowledge base: query={}", req.query);

        let http_response = self
            .http
            .post(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::FetchTimeout(url.clone())
                } else {
                    Error::NetworkUnavailable(e.to_string())
                }
            })?;

        let status = http_response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        let answer: KnowledgeAnswer = http_response
            .json()
            .await
            .map_err(|e| Error::InvalidInput(format!("unparseable answer: {e}")))?;

        tracing::debug!(
            "knowledge query completed in {:?}, confidence {:.2}",
            start.elapsed(),
            answer.confidence
        );

        Ok(answer)
    }

    /// Execute a query against the legacy GET endpoint.
    ///
    /// The legacy shape carries no confidence score; it is normalized into
    /// [`KnowledgeAnswer`] with a confidence of 0.
    pub async fn search_legacy(&self, query: &str) -> Result<KnowledgeAnswer, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("empty query".into()));
        }

        let url = format!("{}/knowledge/search", self.config.base_url);

        let http_response = self
            .http
            .get(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;

        let status = http_response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        let legacy: LegacyAnswer = http_response
            .json()
            .await
            .map_err(|e| Error::InvalidInput(format!("unparseable answer: {e}")))?;

        Ok(legacy.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = KnowledgeConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_client_new() {
        let client = KnowledgeClient::new(KnowledgeConfig::default());
        assert!(client.is_ok());
    }
}
