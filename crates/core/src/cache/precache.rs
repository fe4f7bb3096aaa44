//! Precache entry CRUD operations.
//!
//! The precache table holds the application shell assets fetched at install
//! time. Unlike the runtime stores, entries carry a build revision and follow
//! the install/activate lifecycle instead of an expiration rule: the sweep on
//! activation removes every URL absent from the new manifest.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A precached application asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecacheEntry {
    /// Asset URL, relative to the application origin (e.g. `/index.html`).
    pub url: String,
    /// Build fingerprint of the asset contents.
    pub revision: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of the install that wrote this entry.
    pub installed_at: String,
}

impl PrecacheEntry {
    /// Build an entry stamped with the current time.
    pub fn new(
        url: impl Into<String>, revision: impl Into<String>, status: u16, headers: BTreeMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            url: url.into(),
            revision: revision.into(),
            status,
            headers,
            body,
            installed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl CacheDb {
    /// Insert or replace a precached asset.
    pub async fn upsert_precache_entry(&self, entry: &PrecacheEntry) -> Result<(), Error> {
        let headers_json = serde_json::to_string(&entry.headers)
            .map_err(|e| Error::InvalidInput(format!("unencodable headers: {e}")))?;
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO precache_entries (url, revision, status, headers_json, body, installed_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(url) DO UPDATE SET
                        revision = excluded.revision,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        installed_at = excluded.installed_at",
                    params![
                        &entry.url,
                        &entry.revision,
                        entry.status as i64,
                        &headers_json,
                        &entry.body,
                        &entry.installed_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a precached asset by URL.
    pub async fn get_precache_entry(&self, url: &str) -> Result<Option<PrecacheEntry>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<PrecacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT revision, status, headers_json, body, installed_at
                     FROM precache_entries WHERE url = ?1",
                )?;

                let result = stmt.query_row(params![url], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                });

                match result {
                    Ok((revision, status, headers_json, body, installed_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::InvalidInput(format!("corrupt headers for {url}: {e}")))?;
                        Ok(Some(PrecacheEntry { url, revision, status: status as u16, headers, body, installed_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Revision of an installed asset, if present.
    pub async fn precache_revision(&self, url: &str) -> Result<Option<String>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT revision FROM precache_entries WHERE url = ?1",
                    params![url],
                    |row| row.get(0),
                );
                match result {
                    Ok(rev) => Ok(Some(rev)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// All installed asset URLs.
    pub async fn precache_urls(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM precache_entries ORDER BY url")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of installed assets.
    pub async fn count_precache_entries(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM precache_entries", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every installed asset whose URL is not in `keep`.
    ///
    /// Returns the number of deleted entries. This is the activation sweep.
    pub async fn sweep_precache(&self, keep: &[String]) -> Result<u64, Error> {
        let keep = keep.to_vec();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let mut stmt = conn.prepare("SELECT url FROM precache_entries")?;
                let existing = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut deleted = 0u64;
                for url in existing {
                    if !keep.contains(&url) {
                        deleted += conn.execute("DELETE FROM precache_entries WHERE url = ?1", params![url])? as u64;
                    }
                }
                Ok(deleted)
            })
            .await
            .map_err(Error::from)
    }
}
