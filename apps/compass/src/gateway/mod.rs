//! Gateway: the single point of entry for calls to the remote generation service.
//!
//! Every request to the recommendation/dashboard endpoint goes out as an
//! envelope `{httpMethod, path, body: <json-string>}` through [`GatewayClient`].
//! Callers decide what happens on failure; recommendation and dashboard
//! lookups never surface errors to the user and fall back to built-in content.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod decode;
pub mod dedup;
pub mod fallback;
pub mod recommendations;

pub use decode::DecodeError;
pub use recommendations::{fetch_recommendations, RecommendationOutcome, Recommendations};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Http(e) if e.is_timeout())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    http_method: &'a str,
    path: &'a str,
    body: String,
}

/// HTTP client for the generation endpoint and the upload endpoints.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    api_url: String,
}

impl GatewayClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, GatewayError> {
        Ok(Self::with_client(Client::builder().build()?, api_url))
    }

    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// POSTs `payload` wrapped in the envelope and returns the raw response
    /// text. Decoding is left to the caller.
    pub async fn post_envelope<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<String, GatewayError> {
        self.post_envelope_with_timeout(path, payload, None).await
    }

    pub async fn post_envelope_with_timeout<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        timeout: Option<Duration>,
    ) -> Result<String, GatewayError> {
        let envelope = Envelope {
            http_method: "POST",
            path,
            body: serde_json::to_string(payload)?,
        };
        debug!("POST envelope {} -> {}", path, self.api_url);
        self.post_json(&self.api_url, &envelope, timeout).await
    }

    /// POSTs a JSON body to `url`, optionally with a per-request timeout.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        timeout: Option<Duration>,
    ) -> Result<String, GatewayError> {
        let mut request = self.client.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("Gateway returned {} from {}", status, url);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    //! A throwaway local HTTP server standing in for remote endpoints.

    use std::net::SocketAddr;

    use axum::Router;

    use super::GatewayClient;

    /// Serves `app` on an ephemeral port and returns its base URL.
    pub async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A client that talks to the local server directly, ignoring any proxy
    /// settings in the environment.
    pub fn client(url: &str) -> GatewayClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GatewayClient::with_client(http, url)
    }
}
