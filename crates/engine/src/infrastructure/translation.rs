//! HTTP client for the translation collaborator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ports::TranslationPort;

/// Default translation service base URL.
pub const DEFAULT_TRANSLATION_BASE_URL: &str = "http://localhost:8081";

const TRANSLATION_TIMEOUT_SECS: u64 = 10;

/// Client for the translation endpoint.
///
/// Translation is a best-effort enrichment: every failure path collapses
/// to `None`, which callers treat as "use the original text".
#[derive(Clone)]
pub struct HttpTranslationClient {
    client: Client,
    base_url: String,
}

impl HttpTranslationClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(TRANSLATION_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the `TRANSLATION_BASE_URL` environment
    /// variable, falling back to the default if not set.
    pub fn from_env() -> Self {
        let base_url = std::env::var("TRANSLATION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_TRANSLATION_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target_locale: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated: Option<String>,
}

#[async_trait]
impl TranslationPort for HttpTranslationClient {
    async fn translate(&self, text: &str, target_locale: &str) -> Option<String> {
        let response = self
            .client
            .post(format!("{}/v1/translate", self.base_url))
            .json(&TranslateRequest {
                text,
                target_locale,
            })
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status(), "translation service rejected request");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "translation service unreachable");
                return None;
            }
        };

        match response.json::<TranslateResponse>().await {
            Ok(body) => body.translated,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable translation response");
                None
            }
        }
    }
}
