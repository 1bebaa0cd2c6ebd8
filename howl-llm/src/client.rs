//! Generation router — unified client for OpenAI-compatible and Ollama text
//! backends plus HTTP image and audio endpoints.
//!
//! The backend for each modality is fixed at construction from `[llm]`
//! configuration. Calls are single-shot: a failed request is reported, never
//! retried.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use howl_core::Conversation;
use howl_core::config::{LlmConfig, MediaBackendConfig};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::generation::Generation;
use crate::types::{
    AudioArtifact, ChatCompletionResponse, ImageArtifact, OllamaChatResponse, TextBackendKind,
};

/// Longest error body kept on [`LlmError::Status`], in bytes.
const ERROR_BODY_LIMIT: usize = 512;

/// Cut `body` to at most `max` bytes without splitting a character.
fn truncate_on_char_boundary(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut end = max;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

/// Provider backend for text generation.
#[derive(Debug, Clone)]
pub enum TextProvider {
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible { base_url: String, api_key: String },
    /// Ollama running locally.
    Ollama { base_url: String },
    /// No backend — every call fails with [`LlmError::Unavailable`].
    None,
}

/// Provider backend for images or audio.
#[derive(Debug, Clone)]
pub enum MediaProvider {
    /// POST a JSON body to a fixed URL.
    Http { url: String },
    /// Not configured.
    None,
}

impl MediaProvider {
    fn from_config(config: &MediaBackendConfig, what: &str) -> Result<Self> {
        match config.provider.as_str() {
            "none" | "" => Ok(Self::None),
            "http" if !config.url.trim().is_empty() => Ok(Self::Http {
                url: config.url.clone(),
            }),
            "http" => Err(LlmError::ConfigError(format!("{what} provider 'http' needs a url"))),
            other => Err(LlmError::ConfigError(format!("unknown {what} provider: '{other}'"))),
        }
    }
}

/// Routes generation calls to the configured backends.
pub struct GenerationRouter {
    text: TextProvider,
    image: MediaProvider,
    audio: MediaProvider,
    http: Client,
    default_model: String,
    temperature: f32,
    timeout: Duration,
}

impl GenerationRouter {
    /// Create a router from explicit providers.
    #[must_use]
    pub fn new(
        text: TextProvider,
        image: MediaProvider,
        audio: MediaProvider,
        default_model: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            text,
            image,
            audio,
            http: Client::new(),
            default_model: default_model.into(),
            temperature: 0.9,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Build a router from the `[llm]` configuration section.
    ///
    /// # Errors
    /// Returns [`LlmError::ConfigError`] for unknown providers or missing
    /// endpoints.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let text = match config.provider.as_str() {
            "openai" => TextProvider::OpenAiCompatible {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
            },
            "ollama" => TextProvider::Ollama {
                base_url: config.base_url.trim_end_matches('/').to_string(),
            },
            "none" => TextProvider::None,
            other => {
                return Err(LlmError::ConfigError(format!("unknown text provider: '{other}'")));
            }
        };
        let mut router = Self::new(
            text,
            MediaProvider::from_config(&config.image, "image")?,
            MediaProvider::from_config(&config.audio, "audio")?,
            config.response_model.clone(),
            config.request_timeout_ms,
        );
        router.temperature = config.temperature;
        Ok(router)
    }

    /// A router with nothing configured; every call fails.
    #[must_use]
    pub fn none() -> Self {
        Self::new(TextProvider::None, MediaProvider::None, MediaProvider::None, "", 0)
    }

    /// Which text backend this router talks to.
    #[must_use]
    pub fn text_backend(&self) -> TextBackendKind {
        match self.text {
            TextProvider::OpenAiCompatible { .. } => TextBackendKind::OpenAiCompatible,
            TextProvider::Ollama { .. } => TextBackendKind::Ollama,
            TextProvider::None => TextBackendKind::None,
        }
    }

    /// Whether a text backend is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.text, TextProvider::None)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn transport_error(&self, err: &reqwest::Error) -> LlmError {
        LlmError::from_transport(err, self.timeout_ms())
    }

    /// Send a prepared request and map transport failures.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_on_char_boundary(body, ERROR_BODY_LIMIT),
            })
        }
    }

    /// POST a chat-completions body and return the first choice's text.
    async fn post_chat_completion(
        &self,
        base_url: &str,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<String> {
        let url = format!("{base_url}/v1/chat/completions");
        let mut request = self.http.post(&url).json(body);
        if !api_key.is_empty() {
            request = request.bearer_auth(api_key);
        }
        let response: ChatCompletionResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| self.transport_error(&e))?;
        response.into_text().ok_or(LlmError::EmptyResponse)
    }

    /// Generate using an OpenAI-compatible API.
    async fn generate_openai(
        &self,
        base_url: &str,
        api_key: &str,
        conversation: &Conversation,
        max_tokens: u32,
        model: &str,
    ) -> Result<String> {
        let body = json!({
            "model": model,
            "messages": conversation,
            "max_tokens": max_tokens,
            "temperature": self.temperature,
        });
        self.post_chat_completion(base_url, api_key, &body).await
    }

    /// Generate using Ollama's chat API.
    async fn generate_ollama(
        &self,
        base_url: &str,
        conversation: &Conversation,
        max_tokens: u32,
        model: &str,
    ) -> Result<String> {
        let url = format!("{base_url}/api/chat");
        // Ollama has no per-message `name` field.
        let messages: Vec<_> = conversation
            .messages()
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();
        let body = json!({
            "model": model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": max_tokens,
            }
        });

        let response: OllamaChatResponse = self
            .send(self.http.post(&url).json(&body))
            .await?
            .json()
            .await
            .map_err(|e| self.transport_error(&e))?;
        response
            .message
            .content
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl Generation for GenerationRouter {
    async fn generate(
        &self,
        conversation: &Conversation,
        max_tokens: u32,
        model: Option<&str>,
    ) -> Result<String> {
        let model = model.unwrap_or(&self.default_model);
        let start = Instant::now();
        let result = match &self.text {
            TextProvider::None => {
                Err(LlmError::Unavailable("No text provider configured".into()))
            }
            TextProvider::OpenAiCompatible { base_url, api_key } => {
                self.generate_openai(base_url, api_key, conversation, max_tokens, model)
                    .await
            }
            TextProvider::Ollama { base_url } => {
                self.generate_ollama(base_url, conversation, max_tokens, model)
                    .await
            }
        };
        let latency_ms = start.elapsed().as_millis();
        match &result {
            Ok(text) => debug!(model, latency_ms, chars = text.len(), "text generated"),
            Err(e) => warn!(model, latency_ms, error = %e, "text generation failed"),
        }
        result
    }

    async fn generate_vision(
        &self,
        image_url: &str,
        prompt: &str,
        max_tokens: u32,
        model: Option<&str>,
    ) -> Result<String> {
        let TextProvider::OpenAiCompatible { base_url, api_key } = &self.text else {
            return Err(LlmError::Unavailable(
                "Vision needs an OpenAI-compatible text provider".into(),
            ));
        };
        let model = model.unwrap_or(&self.default_model);
        let body = json!({
            "model": model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image_url } },
                ],
            }],
            "max_tokens": max_tokens,
        });
        let start = Instant::now();
        let result = self.post_chat_completion(base_url, api_key, &body).await;
        let latency_ms = start.elapsed().as_millis();
        match &result {
            Ok(text) => debug!(model, latency_ms, chars = text.len(), "vision answered"),
            Err(e) => warn!(model, latency_ms, error = %e, "vision request failed"),
        }
        result
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageArtifact> {
        let MediaProvider::Http { url } = &self.image else {
            return Err(LlmError::Unavailable("No image provider configured".into()));
        };
        let response = self
            .send(self.http.post(url).json(&json!({ "prompt": prompt })))
            .await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?
            .to_vec();
        if bytes.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        debug!(size = bytes.len(), "image generated");
        Ok(ImageArtifact {
            bytes,
            content_type,
        })
    }

    async fn generate_audio(&self, text: &str) -> Result<AudioArtifact> {
        let MediaProvider::Http { url } = &self.audio else {
            return Err(LlmError::Unavailable("No audio provider configured".into()));
        };
        let artifact: AudioArtifact = self
            .send(self.http.post(url).json(&json!({ "text": text })))
            .await?
            .json()
            .await
            .map_err(|e| self.transport_error(&e))?;
        debug!(file = %artifact.file_name, "audio generated");
        Ok(artifact)
    }
}
