//! HTTP client code for sahifa.
//!
//! This crate provides the fetch pipeline the worker's strategies go through,
//! plus typed clients for the two upstream collaborators: the knowledge/query
//! backend and the scholar backend.

pub mod fetch;
pub mod knowledge;
pub mod scholar;

pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use knowledge::{KnowledgeAnswer, KnowledgeClient, KnowledgeConfig, KnowledgeQuery, Reference};
pub use scholar::{ScholarClient, ScholarConfig};
