//! Explanations from a local Ollama server (`/api/generate`).

use super::{build_prompt, Summarizer, SummaryRequest};
use crate::config::OllamaConfig;
use crate::error::{Result, TaxaError};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Summarizer backed by an Ollama model.
pub struct OllamaSummarizer {
    client: Client,
    api_url: String,
    config: OllamaConfig,
}

impl OllamaSummarizer {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TaxaError::Summarizer(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: format!("{}/api/generate", config.url.trim_end_matches('/')),
            config: config.clone(),
        })
    }
}

impl Summarizer for OllamaSummarizer {
    fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt: build_prompt(request)?,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        };

        log::debug!("POST {} (model {})", self.api_url, self.config.model);
        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| TaxaError::Summarizer(e.to_string()))?;

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| TaxaError::Summarizer(format!("bad response body: {}", e)))?;
        Ok(parsed.response.trim().to_string())
    }
}
