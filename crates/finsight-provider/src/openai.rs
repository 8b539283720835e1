//! Provider client for OpenAI-compatible endpoints.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use finsight_types::ProviderSettings;

use crate::error::ProviderError;
use crate::model::Embedding;
use crate::TextProvider;

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Chat model name
    pub chat_model: String,

    /// API key
    pub api_key: SecretString,

    /// Expected embedding dimensionality
    pub dimension: usize,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum retries on failure
    pub max_retries: u32,
}

impl OpenAiProviderConfig {
    /// Build from loaded settings plus the API key read at startup.
    pub fn from_settings(
        settings: &ProviderSettings,
        api_key: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            embedding_model: settings.embedding_model.clone(),
            chat_model: settings.chat_model.clone(),
            api_key: SecretString::from(api_key.into()),
            dimension,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
        }
    }
}

/// Provider implementation over HTTP.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    /// Create a new provider client.
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Run `op` with exponential backoff, up to `max_retries` attempts.
    async fn with_retries<T, F, Fut>(&self, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling provider API");

            match op().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Provider call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    async fn request_embedding(&self, text: &str) -> Result<Embedding, ProviderError> {
        #[derive(Serialize)]
        struct EmbeddingRequest<'a> {
            model: &'a str,
            input: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: text,
        };

        let url = format!("{}/embeddings", self.config.base_url);
        let response = self.send(&url, &request).await?;

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let values = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::Parse("No embedding in response".to_string()))?;

        Embedding::with_dimension(values, self.config.dimension)
    }

    async fn request_completion(
        &self,
        system: &str,
        user: &str,
    ) -> Result<String, ProviderError> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessageResponse,
        }

        #[derive(Deserialize)]
        struct ChatMessageResponse {
            content: String,
        }

        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self.send(&url, &request).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Parse("No choices in response".to_string()))
    }

    /// POST a JSON body, mapping status codes onto the error taxonomy.
    async fn send<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Api(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(ProviderError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("HTTP {}: {}", status, body)));
        }

        Ok(response)
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        self.with_retries(move || self.request_embedding(text)).await
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        self.with_retries(move || self.request_completion(system, user))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OpenAiProviderConfig {
        OpenAiProviderConfig::from_settings(&ProviderSettings::default(), "test-key", 1536)
    }

    #[test]
    fn test_config_from_settings() {
        let config = test_config();
        assert!(config.base_url.contains("openai"));
        assert_eq!(config.dimension, 1536);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_provider_construction() {
        let provider = OpenAiProvider::new(test_config());
        assert!(provider.is_ok());
    }
}
