//! Scholar backend resource and payload types.
//!
//! Resources come back snake_case; request payloads go out camelCase,
//! matching the backend's two conventions.

use serde::{Deserialize, Serialize};

/// Verification state of a scholar profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

/// A scholar's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScholarProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub credentials: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    pub specializations: Vec<String>,
    pub verification_status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    pub contributions_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// A submitted content contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    pub scholar_id: String,
    pub scholar_name: String,
    pub content_id: String,
    pub contribution_type: String,
    pub content: String,
    pub status: String,
    pub review_count: u64,
    #[serde(default)]
    pub approved_by: Vec<String>,
    #[serde(default)]
    pub rejected_by: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A peer review of a contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerReview {
    pub id: String,
    pub contribution_id: String,
    pub reviewer_id: String,
    pub review_type: String,
    pub comment: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for `POST /scholars/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterScholar {
    pub name: String,
    pub email: String,
    pub credentials: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    pub specializations: Vec<String>,
}

/// Payload for `POST /scholars/contributions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitContribution {
    #[serde(rename = "type")]
    pub contribution_type: String,
    pub content: String,
    pub references: String,
    pub scholar_id: String,
}

/// Payload for `POST /scholars/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReview {
    pub contribution_id: String,
    pub reviewer_id: String,
    pub status: String,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserialize() {
        let json = r#"{
            "id": "s1",
            "name": "Dr. Aisha",
            "email": "aisha@example.org",
            "credentials": "PhD, Islamic Jurisprudence",
            "institution": "Al-Azhar",
            "specializations": ["fiqh", "hadith"],
            "verification_status": "verified",
            "verification_date": "2025-01-10T00:00:00Z",
            "verified_by": "admin",
            "contributions_count": 12,
            "created_at": "2024-06-01T00:00:00Z",
            "updated_at": "2025-01-10T00:00:00Z"
        }"#;

        let profile: ScholarProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.verification_status, VerificationStatus::Verified);
        assert_eq!(profile.specializations.len(), 2);
    }

    #[test]
    fn test_submit_contribution_wire_shape() {
        let payload = SubmitContribution {
            contribution_type: "correction".into(),
            content: "…".into(),
            references: "Sahih Muslim 1:1".into(),
            scholar_id: "s1".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "correction");
        assert_eq!(json["scholarId"], "s1");
        assert!(json.get("scholar_id").is_none());
    }

    #[test]
    fn test_submit_review_wire_shape() {
        let payload = SubmitReview {
            contribution_id: "c1".into(),
            reviewer_id: "s2".into(),
            status: "approved".into(),
            comment: "sound".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["contributionId"], "c1");
        assert_eq!(json["reviewerId"], "s2");
    }

    #[test]
    fn test_verification_status_roundtrip() {
        let status: VerificationStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, VerificationStatus::Pending);
        assert_eq!(serde_json::to_string(&VerificationStatus::Rejected).unwrap(), "\"rejected\"");
    }
}
