//! Command-line tooling around the offline cache.
//!
//! Subcommands:
//! - `manifest`: generate a precache manifest from a build output directory
//! - `install`: install a manifest (fetch + activate) into the local database
//! - `status`: show store and precache counts
//! - `purge`: delete entries by age, count bound, or wholesale
//! - `get`: inspect one cached entry

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use sahifa_client::{FetchClient, FetchConfig};
use sahifa_core::cache::hash::revision_hash;
use sahifa_core::{AppConfig, CacheDb};
use sahifa_worker::{ManifestEntry, Network, PrecacheManifest, WorkerHost};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Offline cache tooling for the sahifa application shell.
#[derive(Parser)]
#[command(name = "sahifa")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a precache manifest from a build directory
    Manifest {
        /// Build output directory to fingerprint
        #[arg(long)]
        dir: PathBuf,
    },

    /// Fetch and activate a precache manifest
    Install {
        /// Path to the manifest JSON file
        #[arg(long)]
        manifest: PathBuf,
    },

    /// Show entry counts per store and installed precache assets
    Status,

    /// Delete cached entries from a store
    Purge {
        /// Store to purge
        #[arg(long)]
        store: String,

        /// Delete entries older than this many days
        #[arg(long)]
        older_than_days: Option<u64>,

        /// Delete oldest entries down to this bound
        #[arg(long)]
        max_entries: Option<usize>,

        /// Delete every entry in the store
        #[arg(long)]
        all: bool,
    },

    /// Inspect one cached entry
    Get {
        /// Store the entry lives in
        #[arg(long)]
        store: String,

        /// Request URL key
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Manifest { dir } => manifest(&dir),
        Command::Install { manifest } => install(&manifest).await,
        Command::Status => status().await,
        Command::Purge { store, older_than_days, max_entries, all } => {
            purge(&store, older_than_days, max_entries, all).await
        }
        Command::Get { store, url } => get(&store, &url).await,
    }
}

fn manifest(dir: &Path) -> anyhow::Result<()> {
    let mut entries = Vec::new();
    collect_assets(dir, dir, &mut entries)?;
    entries.sort_by(|a, b| a.url.cmp(&b.url));

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn collect_assets(root: &Path, dir: &Path, entries: &mut Vec<ManifestEntry>) -> anyhow::Result<()> {
    for item in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = item?.path();
        if path.is_dir() {
            collect_assets(root, &path, entries)?;
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("{} escapes {}", path.display(), root.display()))?;
        let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        entries.push(ManifestEntry {
            url: format!("/{}", relative.to_string_lossy().replace('\\', "/")),
            revision: revision_hash(&bytes),
        });
    }
    Ok(())
}

async fn install(manifest_path: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("reading {}", manifest_path.display()))?;
    let manifest = PrecacheManifest::from_json(&json)?;
    if manifest.is_empty() {
        bail!("manifest lists no assets");
    }

    let config = AppConfig::load()?;
    let base = Url::parse(&config.base_url).with_context(|| format!("base_url {}", config.base_url))?;
    let cache = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..FetchConfig::default()
    })?);

    let mut host = WorkerHost::new(cache, network, base);
    let report = host.install(manifest).await?;
    tracing::info!(fetched = report.fetched, reused = report.reused, "install complete");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn status() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let cache = CacheDb::open(&config.db_path).await?;

    let stats = cache.store_stats().await?;
    let precached = cache.count_precache_entries().await?;

    let summary = serde_json::json!({
        "stores": stats,
        "precache_entries": precached,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn purge(
    store: &str, older_than_days: Option<u64>, max_entries: Option<usize>, all: bool,
) -> anyhow::Result<()> {
    if older_than_days.is_none() && max_entries.is_none() && !all {
        bail!("pass at least one of --older-than-days, --max-entries, --all");
    }

    let config = AppConfig::load()?;
    let cache = CacheDb::open(&config.db_path).await?;

    let mut deleted = 0u64;
    if all {
        deleted += cache.purge_store(store).await?;
    } else {
        if let Some(days) = older_than_days {
            deleted += cache
                .purge_expired_entries(store, Duration::from_secs(days * 24 * 60 * 60))
                .await?;
        }
        if let Some(bound) = max_entries {
            deleted += cache.enforce_max_entries(store, bound).await?;
        }
    }

    println!("deleted {deleted} entries from {store}");
    Ok(())
}

async fn get(store: &str, url: &str) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let cache = CacheDb::open(&config.db_path).await?;

    match cache.get_entry(store, url).await? {
        Some(entry) => {
            let summary = serde_json::json!({
                "store": entry.store,
                "request_key": entry.request_key,
                "status": entry.status,
                "stored_at": entry.stored_at,
                "body_bytes": entry.body.len(),
                "headers": entry.headers,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        None => bail!("no entry for {url} in {store}"),
    }
    Ok(())
}
