//! Precache manifest, install, and activation.
//!
//! The manifest lists the application shell assets with build revisions.
//! Install fetches every listed asset whose revision changed and commits the
//! batch only when all of them succeeded; a version with any failed asset is
//! never partially visible. Activation sweeps installed assets that the new
//! manifest no longer lists.

use std::sync::Arc;

use sahifa_core::{CacheDb, Error, PrecacheEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::net::Network;
use crate::strategy::is_cacheable;

/// One manifest line: an asset URL and its build fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub revision: String,
}

/// The build-time asset manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecacheManifest {
    pub entries: Vec<ManifestEntry>,
}

impl PrecacheManifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    /// Parse the JSON array emitted by the manifest generator.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::InvalidInput(format!("unparseable manifest: {e}")))
    }

    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.url.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What an install did: how many assets were fetched vs reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallReport {
    pub fetched: usize,
    pub reused: usize,
}

/// Fetch and stage every manifest asset, then commit the batch.
///
/// Assets whose installed revision already matches are reused without a
/// fetch, so reinstalling an unchanged manifest touches the network zero
/// times. Any fetch failure or non-cacheable status aborts the install
/// before anything is written.
pub async fn install(
    cache: &CacheDb, network: &Arc<dyn Network>, base: &Url, manifest: &PrecacheManifest,
) -> Result<InstallReport, Error> {
    let mut staged = Vec::new();
    let mut report = InstallReport::default();

    for entry in &manifest.entries {
        if cache.precache_revision(&entry.url).await?.as_deref() == Some(entry.revision.as_str()) {
            debug!(url = %entry.url, revision = %entry.revision, "revision unchanged, reusing");
            report.reused += 1;
            continue;
        }

        let url = base
            .join(&entry.url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", entry.url)))?;
        let fetched = network
            .get(&url)
            .await
            .map_err(|e| Error::InstallFailed(format!("{}: {e}", entry.url)))?;
        if !is_cacheable(fetched.status) {
            return Err(Error::InstallFailed(format!("{}: status {}", entry.url, fetched.status)));
        }

        staged.push(PrecacheEntry::new(
            &entry.url,
            &entry.revision,
            fetched.status,
            fetched.headers,
            fetched.body.to_vec(),
        ));
        report.fetched += 1;
    }

    // Every asset succeeded; now the batch becomes visible.
    for entry in &staged {
        cache.upsert_precache_entry(entry).await?;
    }

    info!(fetched = report.fetched, reused = report.reused, "precache install complete");
    Ok(report)
}

/// Activation sweep: drop installed assets the manifest no longer lists.
pub async fn activate(cache: &CacheDb, manifest: &PrecacheManifest) -> Result<u64, Error> {
    let deleted = cache.sweep_precache(&manifest.urls()).await?;
    if deleted > 0 {
        info!(deleted, "activation removed stale precache assets");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::MockNetwork;

    fn manifest(entries: &[(&str, &str)]) -> PrecacheManifest {
        PrecacheManifest::new(
            entries
                .iter()
                .map(|(url, revision)| ManifestEntry { url: url.to_string(), revision: revision.to_string() })
                .collect(),
        )
    }

    fn base() -> Url {
        Url::parse("http://localhost:8000").unwrap()
    }

    fn net_arc(net: Arc<MockNetwork>) -> Arc<dyn Network> {
        net
    }

    #[tokio::test]
    async fn test_install_fetches_all_assets() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/index.html", 200, b"<html>");
        mock.insert("http://localhost:8000/app.js", 200, b"js");
        let network = net_arc(mock);

        let manifest = manifest(&[("/index.html", "r1"), ("/app.js", "r1")]);
        let report = install(&cache, &network, &base(), &manifest).await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.reused, 0);
        assert_eq!(cache.count_precache_entries().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reinstall_unchanged_manifest_fetches_nothing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/index.html", 200, b"<html>");
        let network = net_arc(mock.clone());

        let manifest = manifest(&[("/index.html", "r1")]);
        install(&cache, &network, &base(), &manifest).await.unwrap();
        assert_eq!(mock.call_count(), 1);

        let report = install(&cache, &network, &base(), &manifest).await.unwrap();
        assert_eq!(report.fetched, 0);
        assert_eq!(report.reused, 1);
        // No second fetch happened.
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_revision_change_refetches_only_changed_asset() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/index.html", 200, b"v1");
        mock.insert("http://localhost:8000/app.js", 200, b"js");
        let network = net_arc(mock.clone());

        install(&cache, &network, &base(), &manifest(&[("/index.html", "r1"), ("/app.js", "r1")]))
            .await
            .unwrap();

        mock.insert("http://localhost:8000/index.html", 200, b"v2");
        let report = install(&cache, &network, &base(), &manifest(&[("/index.html", "r2"), ("/app.js", "r1")]))
            .await
            .unwrap();
        assert_eq!(report.fetched, 1);
        assert_eq!(report.reused, 1);

        let entry = cache.get_precache_entry("/index.html").await.unwrap().unwrap();
        assert_eq!(entry.revision, "r2");
        assert_eq!(entry.body, b"v2");
    }

    #[tokio::test]
    async fn test_failed_asset_aborts_whole_install() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/index.html", 200, b"<html>");
        // /app.js is unknown to the mock and comes back 404.
        let network = net_arc(mock);

        let manifest = manifest(&[("/index.html", "r1"), ("/app.js", "r1")]);
        let result = install(&cache, &network, &base(), &manifest).await;
        assert!(matches!(result, Err(Error::InstallFailed(_))));

        // Nothing was committed, not even the asset that succeeded.
        assert_eq!(cache.count_precache_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_activate_sweeps_removed_urls() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/index.html", 200, b"<html>");
        mock.insert("http://localhost:8000/old.js", 200, b"old");
        let network = net_arc(mock);

        install(&cache, &network, &base(), &manifest(&[("/index.html", "r1"), ("/old.js", "r1")]))
            .await
            .unwrap();

        let next = manifest(&[("/index.html", "r1")]);
        install(&cache, &network, &base(), &next).await.unwrap();
        let deleted = activate(&cache, &next).await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(cache.precache_urls().await.unwrap(), vec!["/index.html".to_string()]);
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest =
            PrecacheManifest::from_json(r#"[{"url":"/index.html","revision":"abc"},{"url":"/app.js","revision":"def"}]"#)
                .unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.urls(), vec!["/index.html".to_string(), "/app.js".to_string()]);
    }

    #[test]
    fn test_manifest_from_bad_json() {
        assert!(matches!(PrecacheManifest::from_json("{not json"), Err(Error::InvalidInput(_))));
    }
}
