//! Text generation provider abstraction and implementations.
//!
//! The [`Generator`] trait maps a rendered prompt to a response string.
//! Backends mirror the embedding module's providers and retry policy:
//!
//! - **[`OllamaGenerator`]** — `POST /api/generate` on a local Ollama
//!   instance, non-streaming.
//! - **[`OpenAiGenerator`]** — the OpenAI chat completions API
//!   (requires `OPENAI_API_KEY`).

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::LlmConfig;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Maps a prompt string to a generated response string.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier (e.g. `"llama3.1"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Instantiate the generator named by the configuration.
pub fn create_generator(config: &LlmConfig) -> Result<Box<dyn Generator>> {
    match config.provider.as_str() {
        "ollama" => Ok(Box::new(OllamaGenerator::new(config)?)),
        "openai" => Ok(Box::new(OpenAiGenerator::new(config)?)),
        "disabled" => bail!("llm provider is disabled; set [llm] provider in config"),
        other => bail!("Unknown llm provider: {}", other),
    }
}

async fn backoff(attempt: u32) {
    let delay = Duration::from_secs(1 << (attempt - 1).min(5));
    tokio::time::sleep(delay).await;
}

// ============ Ollama ============

/// Generation backend calling a local Ollama instance.
pub struct OllamaGenerator {
    model: String,
    url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for Ollama provider"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            url,
            max_retries: config.max_retries,
            client,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                backoff(attempt).await;
            }

            let resp = self
                .client
                .post(format!("{}/api/generate", self.url))
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_ollama_completion(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("Ollama API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Ollama API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(anyhow::anyhow!(
                        "Ollama connection error (is Ollama running at {}?): {}",
                        self.url,
                        e
                    ));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Ollama generation failed after retries")))
    }
}

fn parse_ollama_completion(json: &serde_json::Value) -> Result<String> {
    json.get("response")
        .and_then(|r| r.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing response field"))
}

// ============ OpenAI ============

/// Generation backend calling `POST https://api.openai.com/v1/chat/completions`.
pub struct OpenAiGenerator {
    model: String,
    max_retries: u32,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            max_retries: config.max_retries,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                backoff(attempt).await;
            }

            let resp = self
                .client
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_openai_completion(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("OpenAI generation failed after retries")))
    }
}

fn parse_openai_completion(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing message content"))
}
