//! Network seam for the caching strategies.
//!
//! Strategies fetch through the [`Network`] trait rather than a concrete
//! client, so tests can substitute a synthetic upstream with controlled
//! latency and failures. The production implementation wraps
//! [`sahifa_client::FetchClient`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use sahifa_client::FetchClient;
use sahifa_core::Error;
use url::Url;

/// A response fetched from the upstream.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code; 0 denotes an opaque response.
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

/// The upstream as seen by the strategies: a GET for a URL.
#[async_trait]
pub trait Network: Send + Sync {
    async fn get(&self, url: &Url) -> Result<FetchedResponse, Error>;
}

#[async_trait]
impl Network for FetchClient {
    async fn get(&self, url: &Url) -> Result<FetchedResponse, Error> {
        let response = self.fetch(url).await?;
        Ok(FetchedResponse { status: response.status, headers: response.headers, body: response.body })
    }
}
