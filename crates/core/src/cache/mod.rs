//! SQLite-backed cache stores for intercepted HTTP responses.
//!
//! This module provides the persistent registry of named cache stores used by
//! the worker's caching strategies, with async access via tokio-rusqlite.
//! It supports:
//!
//! - Named stores created lazily on first write, keyed by request URL
//! - Replace-on-write entries (no partial/torn reads)
//! - Lazy age expiry on read, oldest-first count eviction on write
//! - A dedicated precache table with build revisions and a manifest sweep
//! - Automatic schema migrations, WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod precache;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheEntry, ExpirationRule, StoreStats};
pub use precache::PrecacheEntry;

/// Store for cached knowledge/API responses.
pub const API_CACHE: &str = "api-cache";

/// Store for cached static sub-resources (scripts, styles, images).
pub const STATIC_ASSETS: &str = "static-assets";
