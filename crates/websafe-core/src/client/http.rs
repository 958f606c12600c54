//! HTTP layer: the only place that looks at status codes.
//!
//! One attempt per call. There is no retry: the orchestrator falls back instead.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{WebSafeError, WebSafeResult};

/// Longest error body kept in a `Service` error.
const MAX_ERROR_BODY: usize = 200;

/// HTTP backend (holds the reqwest client and base URL).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
}

impl HttpBackend {
    /// POST `body` as JSON to `path` and decode a JSON reply.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> WebSafeResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "POST");

        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    /// GET `path` and decode a JSON reply.
    pub(crate) async fn get_json<T>(&self, path: &str) -> WebSafeResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "GET");

        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> WebSafeResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.to_string()
            } else {
                body.chars().take(MAX_ERROR_BODY).collect()
            };
            return Err(WebSafeError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await.map_err(|e| WebSafeError::Network {
            message: format!("failed to read response body: {}", e),
        })?;

        serde_json::from_str(&text).map_err(|e| WebSafeError::Parse {
            message: format!("failed to parse response: {}", e),
        })
    }
}
