use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::TranslationError;
use crate::providers::{TranslationRequest, TranslationResponse, Translator, build_prompt};

/// Ollama client for the local generation API.
///
/// Failure classification is the contract here: transport errors, server-side
/// 5xx, undecodable payloads and empty completions are retryable; any other
/// 4xx is a rejected request and fails the paragraph immediately.
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    /// Model name to use for generation
    model: &'a str,
    /// Prompt to generate from
    prompt: String,
    /// Whether to stream the response
    stream: bool,
    /// Additional model parameters
    options: GenerationOptions,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
struct GenerationOptions {
    /// Temperature for generation
    temperature: f32,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    /// Generated text
    #[serde(default)]
    response: String,
}

impl Ollama {
    /// Create a new client for the given endpoint.
    ///
    /// The endpoint may omit the scheme (`localhost:11434`) or the port
    /// (`http://localhost`); missing pieces get the Ollama defaults. Uses
    /// connection pooling over HTTP/1.1, which is what Ollama speaks.
    pub fn new(endpoint: &str, timeout_secs: u64) -> Self {
        let base_url = normalize_endpoint(endpoint);
        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

}

fn normalize_endpoint(endpoint: &str) -> String {
    let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    match Url::parse(&with_scheme) {
        Ok(url) => {
            let scheme = url.scheme();
            let host = url.host_str().unwrap_or("localhost");
            let port = url.port().unwrap_or(11434);
            format!("{}://{}:{}", scheme, host, port)
        }
        Err(_) => "http://localhost:11434".to_string(),
    }
}

#[async_trait]
impl Translator for Ollama {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TranslationError> {
        let url = format!("{}/api/generate", self.base_url);
        let payload = GenerationRequest {
            model: &request.model,
            prompt: build_prompt(request),
            stream: false,
            options: GenerationOptions {
                temperature: request.temperature,
            },
        };

        debug!(
            "Calling Ollama | model={} source={} target={} text_len={}",
            request.model,
            request.source_lang,
            request.target_lang,
            request.text.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TranslationError::Retryable(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(TranslationError::Retryable(format!(
                "Ollama server error: {}",
                status
            )));
        }
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::NonRetryable(format!(
                "Ollama request failed: {} {}",
                status, body
            )));
        }

        let payload: GenerationResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Retryable(format!("invalid JSON from Ollama: {}", e)))?;

        let text = payload.response.trim().to_string();
        if text.is_empty() {
            return Err(TranslationError::Retryable(
                "empty response from Ollama".to_string(),
            ));
        }

        debug!("Ollama response received | text_len={}", text.chars().count());
        Ok(TranslationResponse {
            translated_text: text,
        })
    }
}
