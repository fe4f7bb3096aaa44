//! Knowledge query request types.

use sahifa_core::Error;
use serde::{Deserialize, Serialize};

/// A knowledge base query.
///
/// Serializes with the backend's camelCase field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeQuery {
    /// The question text.
    pub query: String,

    /// Preferred answer language (e.g. "en", "ar").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Requested difficulty ("beginner", "intermediate", "advanced").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
}

impl KnowledgeQuery {
    /// Build a query with no preferences.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), language: None, difficulty_level: None }
    }

    /// Validate the query before sending.
    pub fn validate(&self) -> Result<(), Error> {
        if self.query.trim().is_empty() {
            return Err(Error::InvalidInput("empty query".into()));
        }
        Ok(())
    }
}
