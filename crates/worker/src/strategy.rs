//! Caching strategies.
//!
//! Three strategies cover the routing table: Cache-First for static assets,
//! Network-First with a deadline for API reads, and Stale-While-Revalidate
//! for callers that prefer instant responses over fresh ones. All three share
//! the same write path: only responses with a cacheable status are stored,
//! and every store is followed by max-entries enforcement.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sahifa_core::{CacheDb, CacheEntry, Error, ExpirationRule, PrecacheEntry};
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use crate::net::{FetchedResponse, Network};

/// Statuses eligible for caching. 0 is the opaque marker.
pub const CACHEABLE_STATUSES: &[u16] = &[0, 200];

pub fn is_cacheable(status: u16) -> bool {
    CACHEABLE_STATUSES.contains(&status)
}

/// Which caching strategy a route runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Serve from cache; go to the network only on a miss.
    CacheFirst,
    /// Race the network against a deadline; fall back to cache on loss.
    NetworkFirst { timeout: Duration },
    /// Serve from cache immediately and refresh in the background.
    StaleWhileRevalidate,
}

impl StrategyKind {
    /// Strategy the API route runs under the given configuration.
    pub fn for_api(config: &sahifa_core::AppConfig) -> Self {
        match config.api_strategy {
            sahifa_core::config::ApiStrategy::NetworkFirst => {
                StrategyKind::NetworkFirst { timeout: config.network_timeout() }
            }
            sahifa_core::config::ApiStrategy::StaleWhileRevalidate => StrategyKind::StaleWhileRevalidate,
        }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
    Precache,
}

/// Response handed back to the page.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub status: u16,
    pub headers: std::collections::BTreeMap<String, String>,
    pub body: Bytes,
    pub served_from: ServedFrom,
}

impl WorkerResponse {
    pub fn from_entry(entry: CacheEntry) -> Self {
        Self { status: entry.status, headers: entry.headers, body: Bytes::from(entry.body), served_from: ServedFrom::Cache }
    }

    pub fn from_fetch(response: FetchedResponse) -> Self {
        Self { status: response.status, headers: response.headers, body: response.body, served_from: ServedFrom::Network }
    }

    pub fn from_precache(entry: PrecacheEntry) -> Self {
        Self { status: entry.status, headers: entry.headers, body: Bytes::from(entry.body), served_from: ServedFrom::Precache }
    }
}

/// A strategy result, plus the detached revalidation task when SWR spawned
/// one. Callers that need deterministic cache state can await the handle.
#[derive(Debug)]
pub struct StrategyOutcome {
    pub response: WorkerResponse,
    pub revalidation: Option<JoinHandle<()>>,
}

impl StrategyOutcome {
    fn done(response: WorkerResponse) -> Self {
        Self { response, revalidation: None }
    }
}

/// Run a strategy for one request against a named store.
pub async fn run(
    kind: &StrategyKind, cache: &CacheDb, network: &Arc<dyn Network>, store: &str, expiration: ExpirationRule,
    url: &Url,
) -> Result<StrategyOutcome, Error> {
    match kind {
        StrategyKind::CacheFirst => cache_first(cache, network, store, expiration, url).await,
        StrategyKind::NetworkFirst { timeout } => {
            network_first(cache, network, store, expiration, url, *timeout).await
        }
        StrategyKind::StaleWhileRevalidate => {
            stale_while_revalidate(cache, network, store, expiration, url).await
        }
    }
}

async fn cache_first(
    cache: &CacheDb, network: &Arc<dyn Network>, store: &str, expiration: ExpirationRule, url: &Url,
) -> Result<StrategyOutcome, Error> {
    if let Some(entry) = cache.get_fresh_entry(store, url.as_str(), expiration.max_age).await? {
        debug!(store, url = %url, "cache hit");
        return Ok(StrategyOutcome::done(WorkerResponse::from_entry(entry)));
    }

    let fetched = fetch_and_store(cache, network, store, expiration, url).await?;
    Ok(StrategyOutcome::done(WorkerResponse::from_fetch(fetched)))
}

async fn network_first(
    cache: &CacheDb, network: &Arc<dyn Network>, store: &str, expiration: ExpirationRule, url: &Url,
    deadline: Duration,
) -> Result<StrategyOutcome, Error> {
    let error = match tokio::time::timeout(deadline, network.get(url)).await {
        Ok(Ok(fetched)) => {
            maybe_store(cache, store, expiration, url, &fetched).await?;
            return Ok(StrategyOutcome::done(WorkerResponse::from_fetch(fetched)));
        }
        Ok(Err(e)) => e,
        Err(_) => Error::FetchTimeout(format!("{url}: no response within {}s", deadline.as_secs())),
    };

    debug!(store, url = %url, %error, "network lost, trying cache");
    match cache.get_fresh_entry(store, url.as_str(), expiration.max_age).await? {
        Some(entry) => Ok(StrategyOutcome::done(WorkerResponse::from_entry(entry))),
        None => Err(error),
    }
}

async fn stale_while_revalidate(
    cache: &CacheDb, network: &Arc<dyn Network>, store: &str, expiration: ExpirationRule, url: &Url,
) -> Result<StrategyOutcome, Error> {
    if let Some(entry) = cache.get_fresh_entry(store, url.as_str(), expiration.max_age).await? {
        let cache = cache.clone();
        let network = Arc::clone(network);
        let store = store.to_string();
        let url = url.clone();
        let handle = tokio::spawn(async move {
            // Background refresh; failures leave the cached entry in place.
            if let Err(error) = fetch_and_store(&cache, &network, &store, expiration, &url).await {
                debug!(store, url = %url, %error, "revalidation failed");
            }
        });
        return Ok(StrategyOutcome { response: WorkerResponse::from_entry(entry), revalidation: Some(handle) });
    }

    let fetched = fetch_and_store(cache, network, store, expiration, url).await?;
    Ok(StrategyOutcome::done(WorkerResponse::from_fetch(fetched)))
}

/// Fetch a URL and store the response when its status is cacheable.
async fn fetch_and_store(
    cache: &CacheDb, network: &Arc<dyn Network>, store: &str, expiration: ExpirationRule, url: &Url,
) -> Result<FetchedResponse, Error> {
    let fetched = network.get(url).await?;
    maybe_store(cache, store, expiration, url, &fetched).await?;
    Ok(fetched)
}

async fn maybe_store(
    cache: &CacheDb, store: &str, expiration: ExpirationRule, url: &Url, fetched: &FetchedResponse,
) -> Result<(), Error> {
    if !is_cacheable(fetched.status) {
        debug!(store, url = %url, status = fetched.status, "status not cacheable, skipping store");
        return Ok(());
    }

    let entry = CacheEntry::new(store, url.as_str(), fetched.status, fetched.headers.clone(), fetched.body.to_vec());
    cache.upsert_entry(&entry).await?;
    cache.enforce_max_entries(store, expiration.max_entries).await?;
    Ok(())
}
