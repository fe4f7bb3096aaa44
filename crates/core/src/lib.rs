//! Core types and shared functionality for sahifa.
//!
//! This crate provides:
//! - Named, versioned cache stores with a SQLite backend
//! - Expiration policy enforcement (entry count and entry age)
//! - The precache store backing install/activate
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheEntry, ExpirationRule, PrecacheEntry};
pub use config::AppConfig;
pub use error::Error;
