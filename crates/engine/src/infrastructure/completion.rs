//! HTTP client for the remote completion service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::ports::{CompletionError, CompletionPort, CompletionReply, CompletionRequest};

/// Default completion service base URL.
pub const DEFAULT_COMPLETION_BASE_URL: &str = "http://localhost:8080";

/// Default per-request timeout. Completions can be slow.
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 60;

/// Client for the completion endpoint.
///
/// `POST {base_url}/v1/completions` with the [`CompletionRequest`] JSON
/// body; success is HTTP 200 with `{"output": "..."}`. Any other status
/// is a hard failure for that call; there is no retry here.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    base_url: String,
}

impl HttpCompletionClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_COMPLETION_TIMEOUT_SECS)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the `COMPLETION_BASE_URL` environment
    /// variable, falling back to the default if not set.
    pub fn from_env() -> Self {
        let base_url = std::env::var("COMPLETION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_COMPLETION_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

impl Default for HttpCompletionClient {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLETION_BASE_URL)
    }
}

#[async_trait]
impl CompletionPort for HttpCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionReply, CompletionError> {
        let response = self
            .client
            .post(format!("{}/v1/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let body: CompletionBody = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        parse_reply(body)
    }
}

/// Raw response body. `output` is optional so a well-formed JSON body
/// missing the field maps to `Malformed` instead of a decode error.
#[derive(Debug, Deserialize)]
struct CompletionBody {
    output: Option<String>,
}

fn parse_reply(body: CompletionBody) -> Result<CompletionReply, CompletionError> {
    match body.output {
        Some(output) => Ok(CompletionReply { output }),
        None => Err(CompletionError::Malformed(
            "missing `output` field".to_string(),
        )),
    }
}
