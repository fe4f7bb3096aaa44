//! Runtime cache entry CRUD operations.
//!
//! Entries are namespaced by store name and keyed by request URL. A store
//! exists as soon as its first entry is written; there is no separate store
//! object to create or delete. Writes replace the previous entry for the same
//! key atomically, so readers observe either a fully-prior entry or none.

use std::collections::BTreeMap;
use std::time::Duration;

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached HTTP response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Name of the store this entry belongs to.
    pub store: String,
    /// Canonical request URL.
    pub request_key: String,
    /// HTTP status code; 0 denotes an opaque response.
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

impl CacheEntry {
    /// Build an entry stamped with the current time.
    pub fn new(
        store: impl Into<String>, request_key: impl Into<String>, status: u16, headers: BTreeMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            store: store.into(),
            request_key: request_key.into(),
            status,
            headers,
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Per-store expiration policy.
///
/// `max_age` is enforced lazily on read; `max_entries` is enforced after each
/// write by deleting oldest-`stored_at` entries until the bound holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationRule {
    pub max_entries: usize,
    pub max_age: Duration,
}

/// Entry count for one named store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub store: String,
    pub entries: u64,
}

fn age_cutoff(max_age: Duration) -> String {
    let window = chrono::Duration::seconds(max_age.as_secs().min(i64::MAX as u64) as i64);
    (chrono::Utc::now() - window).to_rfc3339()
}

impl CacheDb {
    /// Insert or replace a cached response.
    pub async fn upsert_entry(&self, entry: &CacheEntry) -> Result<(), Error> {
        let headers_json = serde_json::to_string(&entry.headers)
            .map_err(|e| Error::InvalidInput(format!("unencodable headers: {e}")))?;
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (store, request_key, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(store, request_key) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &entry.store,
                        &entry.request_key,
                        entry.status as i64,
                        &headers_json,
                        &entry.body,
                        &entry.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry regardless of age.
    ///
    /// Returns None if no entry exists for the key.
    pub async fn get_entry(&self, store: &str, request_key: &str) -> Result<Option<CacheEntry>, Error> {
        self.read_entry(store, request_key, None).await
    }

    /// Get an entry younger than `max_age`.
    ///
    /// Entries older than the bound are treated as absent even while still
    /// physically present (lazy expiry).
    pub async fn get_fresh_entry(
        &self, store: &str, request_key: &str, max_age: Duration,
    ) -> Result<Option<CacheEntry>, Error> {
        self.read_entry(store, request_key, Some(age_cutoff(max_age))).await
    }

    async fn read_entry(
        &self, store: &str, request_key: &str, cutoff: Option<String>,
    ) -> Result<Option<CacheEntry>, Error> {
        let store = store.to_string();
        let request_key = request_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, headers_json, body, stored_at
                     FROM cache_entries
                     WHERE store = ?1 AND request_key = ?2 AND stored_at > ?3",
                )?;

                // RFC 3339 UTC timestamps compare correctly as strings.
                let floor = cutoff.unwrap_or_default();
                let result = stmt.query_row(params![store, request_key, floor], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                });

                match result {
                    Ok((status, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::InvalidInput(format!("corrupt headers for {request_key}: {e}")))?;
                        Ok(Some(CacheEntry { store, request_key, status: status as u16, headers, body, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete an entry by key. Returns true if an entry was removed.
    pub async fn delete_entry(&self, store: &str, request_key: &str) -> Result<bool, Error> {
        let store = store.to_string();
        let request_key = request_key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE store = ?1 AND request_key = ?2",
                    params![store, request_key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries currently in a store.
    pub async fn count_entries(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete oldest entries until the store holds at most `max_entries`.
    ///
    /// Returns the number of deleted entries.
    pub async fn enforce_max_entries(&self, store: &str, max_entries: usize) -> Result<u64, Error> {
        let store = store.to_string();
        let max = max_entries as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                if count <= max {
                    return Ok(0);
                }

                let to_delete = count - max;
                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE store = ?1 AND request_key IN (
                        SELECT request_key FROM cache_entries
                        WHERE store = ?1 ORDER BY stored_at ASC LIMIT ?2
                    )",
                    params![store, to_delete],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Physically delete entries older than `max_age`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired_entries(&self, store: &str, max_age: Duration) -> Result<u64, Error> {
        let store = store.to_string();
        let cutoff = age_cutoff(max_age);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE store = ?1 AND stored_at < ?2",
                    params![store, cutoff],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry in a store.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_store(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE store = ?1", params![store])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Entry counts per store, for inspection tooling.
    pub async fn store_stats(&self) -> Result<Vec<StoreStats>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<StoreStats>, Error> {
                let mut stmt =
                    conn.prepare("SELECT store, COUNT(*) FROM cache_entries GROUP BY store ORDER BY store")?;
                let rows = stmt.query_map([], |row| {
                    Ok(StoreStats { store: row.get(0)?, entries: row.get::<_, i64>(1)? as u64 })
                })?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }
}
