//! Knowledge answer response types.

use serde::{Deserialize, Serialize};

/// A citation attached to an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Reference kind (e.g. "quran", "hadith", "scholarly").
    #[serde(rename = "type")]
    pub kind: String,
    /// Source work or collection.
    pub source: String,
    /// Location within the source (e.g. "2:183").
    pub reference: String,
    /// Attributed scholar, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholar: Option<String>,
}

/// Answer from the knowledge backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeAnswer {
    /// Answer text.
    pub text: String,
    /// Backend confidence in the answer, 0.0..=1.0.
    pub confidence: f64,
    /// Supporting citations.
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// Legacy GET endpoint answer shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyAnswer {
    /// Answer text (named `response` on the wire).
    pub response: String,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl From<LegacyAnswer> for KnowledgeAnswer {
    fn from(legacy: LegacyAnswer) -> Self {
        Self { text: legacy.response, confidence: 0.0, references: legacy.references }
    }
}
