//! Scholar backend client.
//!
//! Typed pass-through client for the scholar dashboard endpoints: profile,
//! registration, contributions, and peer reviews. All calls go straight to the
//! backend; the worker never caches the mutating (POST) calls, and the GET
//! reads are only cached upstream of this client via the route table.

pub mod types;

pub use types::{
    Contribution, PeerReview, RegisterScholar, ScholarProfile, SubmitContribution, SubmitReview, VerificationStatus,
};

use std::time::Duration;

use reqwest::header;
use sahifa_core::Error;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default base URL for the scholar backend.
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "sahifa/0.1";

/// Scholar client configuration.
#[derive(Debug, Clone)]
pub struct ScholarConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Scholar backend client.
#[derive(Debug, Clone)]
pub struct ScholarClient {
    http: reqwest::Client,
    config: ScholarConfig,
}

impl ScholarClient {
    /// Create a new scholar client with the given configuration.
    pub fn new(config: ScholarConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// `GET /scholars/profile`
    pub async fn profile(&self) -> Result<ScholarProfile, Error> {
        self.get("/scholars/profile").await
    }

    /// `POST /scholars/register`
    pub async fn register(&self, payload: &RegisterScholar) -> Result<ScholarProfile, Error> {
        self.post("/scholars/register", payload).await
    }

    /// `POST /scholars/contributions`
    pub async fn submit_contribution(&self, payload: &SubmitContribution) -> Result<Contribution, Error> {
        self.post("/scholars/contributions", payload).await
    }

    /// `GET /scholars/contributions/review` — the peer-review queue.
    pub async fn review_queue(&self) -> Result<Vec<Contribution>, Error> {
        self.get("/scholars/contributions/review").await
    }

    /// `GET /scholars/contributions/{id}` — one scholar's contributions.
    pub async fn contributions(&self, scholar_id: &str) -> Result<Vec<Contribution>, Error> {
        self.get(&format!("/scholars/contributions/{scholar_id}")).await
    }

    /// `POST /scholars/reviews`
    pub async fn submit_review(&self, payload: &SubmitReview) -> Result<PeerReview, Error> {
        self.post("/scholars/reviews", payload).await
    }

    /// `GET /scholars/reviews/{id}` — reviews of one contribution.
    pub async fn reviews(&self, contribution_id: &str) -> Result<Vec<PeerReview>, Error> {
        self.get(&format!("/scholars/reviews/{contribution_id}")).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}{path}", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;
        Self::decode(path, response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, Error> {
        let url = format!("{}{path}", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::NetworkUnavailable(e.to_string()))?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T, Error> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpError(format!("{path}: status {}", status.as_u16())));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidInput(format!("{path}: unparseable response: {e}")))
    }
}
