//! Scoring client for the remote phishing classifier.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{WebSafeError, WebSafeResult};
use crate::types::{Analysis, HealthStatus, PredictRequest, PredictResponse};

mod helpers;
mod http;

use helpers::to_analysis;
use http::HttpBackend;

pub const WEBSAFE_USER_AGENT: &str = concat!("websafe-core/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a URL into an [`Analysis`].
///
/// The orchestrator only talks to this trait, so tests can swap in fakes.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, url: &str) -> WebSafeResult<Analysis>;
}

/// HTTP client for the scoring service.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    http: HttpBackend,
}

impl ScoringClient {
    pub fn new(config: &ServiceConfig) -> WebSafeResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(WEBSAFE_USER_AGENT));

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| WebSafeError::Config {
            message: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            http: HttpBackend {
                client,
                base_url: config.url.trim_end_matches('/').to_string(),
            },
        })
    }

    pub fn from_env() -> WebSafeResult<Self> {
        Self::new(&ServiceConfig::from_env())
    }

    /// One round trip to `POST /predict`.
    pub async fn analyze(&self, url: &str) -> WebSafeResult<Analysis> {
        debug!(url = %url, "requesting prediction");

        let request = PredictRequest {
            url: url.to_string(),
        };
        let response: PredictResponse = self.http.post_json("/predict", &request).await?;

        to_analysis(url, response)
    }

    /// Liveness probe (`GET /health`). Not part of the scoring path.
    pub async fn health(&self) -> WebSafeResult<HealthStatus> {
        self.http.get_json("/health").await
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }
}

#[async_trait]
impl Scorer for ScoringClient {
    async fn score(&self, url: &str) -> WebSafeResult<Analysis> {
        self.analyze(url).await
    }
}
