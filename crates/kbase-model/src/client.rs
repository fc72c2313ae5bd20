//! Minimal HTTP client for an Ollama-compatible model server.
//!
//! `POST /api/embeddings {model, prompt}` returns `{embedding}`;
//! `POST /api/generate {model, prompt, stream: false}` returns `{response}`.
//! Transport failures, non-success statuses and undecodable bodies all map to
//! [`Error::ExternalService`] tagged with the calling service.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

use kbase_core::error::{Error, Result, Service};
use kbase_core::settings::OllamaConfig;

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    pub async fn embeddings(&self, model: &str, prompt: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({ "model": model, "prompt": prompt });
        let resp: EmbeddingsResponse = self.post_json(Service::Embedding, "/api/embeddings", &body).await?;
        Ok(resp.embedding)
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let body = serde_json::json!({ "model": model, "prompt": prompt, "stream": false });
        let resp: GenerateResponse = self.post_json(Service::Generation, "/api/generate", &body).await?;
        Ok(resp.response)
    }

    async fn post_json<T: DeserializeOwned>(&self, service: Service, path: &str, body: &serde_json::Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();
        let resp = match self.http.post(&url).json(body).send().await {
            Ok(resp) => resp,
            Err(error) => {
                tracing::debug!(%service, url = %url, elapsed_ms = started.elapsed().as_millis() as u64, error = %error, "model request failed");
                return Err(Error::external(service, format!("request to {url} failed: {error}")));
            }
        };
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::debug!(%service, url = %url, %status, elapsed_ms = started.elapsed().as_millis() as u64, "model returned non-success status");
            return Err(Error::external(service, format!("{url} returned {status}: {}", detail.trim())));
        }
        let decoded = resp
            .json::<T>()
            .await
            .map_err(|e| Error::external(service, format!("undecodable response from {url}: {e}")))?;
        tracing::debug!(%service, url = %url, elapsed_ms = started.elapsed().as_millis() as u64, "model call completed");
        Ok(decoded)
    }
}
