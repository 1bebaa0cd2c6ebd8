//! Configuration for the HOWL persona engine.
//!
//! Maps directly to `howl.toml`. Every section and field has a default, so an
//! empty file is a valid configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{DEFAULT_ALCOHOLIC_DRINKS, DEFAULT_DRINKS, DEFAULT_FOODS, DEFAULT_TOXIC_FOODS};
use crate::needs::NeedSnapshot;

/// Environment variable that overrides `llm.api_key`.
pub const API_KEY_ENV: &str = "HOWL_OPENAI_API_KEY";

/// Top-level HOWL configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HowlConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Persona texts (opaque to the engine).
    #[serde(default)]
    pub persona: PersonaConfig,
    /// Context window and token budgets.
    #[serde(default)]
    pub context: ContextConfig,
    /// Need counter baseline.
    #[serde(default)]
    pub needs: NeedsConfig,
    /// Food and drink catalogs.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Generation backends.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Per-server overrides, keyed by server id.
    #[serde(default)]
    pub servers: HashMap<String, ServerOverride>,
}

impl HowlConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `HowlError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::HowlError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Apply environment overrides (currently only the API key).
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.llm.api_key = key;
            }
        }
        self
    }

    /// Server-specific text for `server_id`, empty when none is configured.
    #[must_use]
    pub fn server_specific_message(&self, server_id: &str) -> &str {
        self.servers
            .get(server_id)
            .and_then(|s| s.server_specific_message.as_deref())
            .unwrap_or("")
    }

    /// Backstory for `server_id`, falling back to the persona default.
    #[must_use]
    pub fn backstory_for(&self, server_id: &str) -> &str {
        self.servers
            .get(server_id)
            .and_then(|s| s.backstory_message.as_deref())
            .unwrap_or(&self.persona.backstory_message)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when `RUST_LOG` is unset: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Persona texts. The engine never interprets these, it only places them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// How the persona should behave as a chat assistant.
    #[serde(default = "default_assistant_message")]
    pub assistant_message: String,
    /// Who the persona is and where it comes from.
    #[serde(default = "default_backstory_message")]
    pub backstory_message: String,
    /// How the persona talks.
    #[serde(default = "default_personality_message")]
    pub personality_message: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_message: default_assistant_message(),
            backstory_message: default_backstory_message(),
            personality_message: default_personality_message(),
        }
    }
}

/// Context assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Messages fetched for the transcript.
    #[serde(default = "default_20_usize")]
    pub recent_window: usize,
    /// Messages fetched as summarization source material.
    #[serde(default = "default_100_usize")]
    pub summary_window: usize,
    /// Token budget for each participant summary.
    #[serde(default = "default_360")]
    pub summary_max_tokens: u32,
    /// Token budget for a full in-character reply.
    #[serde(default = "default_1200")]
    pub response_max_tokens: u32,
    /// Token budget for an action reply.
    #[serde(default = "default_1200")]
    pub action_max_tokens: u32,
    /// Token budget for a composed image prompt.
    #[serde(default = "default_200")]
    pub image_prompt_max_tokens: u32,
    /// Token budget for one-word classifier answers (mood rating, capability check).
    #[serde(default = "default_8")]
    pub classifier_max_tokens: u32,
    /// Label printed after the time in the date section.
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,
    /// Offset of that timezone from UTC, in minutes.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            recent_window: 20,
            summary_window: 100,
            summary_max_tokens: 360,
            response_max_tokens: 1200,
            action_max_tokens: 1200,
            image_prompt_max_tokens: 200,
            classifier_max_tokens: 8,
            timezone_label: default_timezone_label(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

/// Need counter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeedsConfig {
    /// Level every counter starts at (and returns to on reset).
    #[serde(default)]
    pub baseline: NeedSnapshot,
}

/// Food and drink catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Food draw catalog; duplicates weight the draw.
    #[serde(default = "default_foods")]
    pub foods: Vec<String>,
    /// Foods that take the toxic branch.
    #[serde(default = "default_toxic_foods")]
    pub toxic_foods: Vec<String>,
    /// Drink draw catalog; duplicates weight the draw.
    #[serde(default = "default_drinks")]
    pub drinks: Vec<String>,
    /// Drinks that take the alcoholic branch.
    #[serde(default = "default_alcoholic_drinks")]
    pub alcoholic_drinks: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            foods: default_foods(),
            toxic_foods: default_toxic_foods(),
            drinks: default_drinks(),
            alcoholic_drinks: default_alcoholic_drinks(),
        }
    }
}

/// Generation backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Text provider: "openai", "ollama", "none".
    #[serde(default = "default_openai")]
    pub provider: String,
    /// Base URL for the text API.
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    /// Bearer key for OpenAI-compatible APIs.
    #[serde(default)]
    pub api_key: String,
    /// Model used for in-character replies.
    #[serde(default = "default_response_model")]
    pub response_model: String,
    /// Model used for summaries and classifiers.
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    /// Sampling temperature for replies.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Hard timeout for any backend call in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Image backend.
    #[serde(default)]
    pub image: MediaBackendConfig,
    /// Audio backend.
    #[serde(default)]
    pub audio: MediaBackendConfig,
    /// Directory of TOML prompt files replacing the built-in templates.
    #[serde(default)]
    pub prompt_dir: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_openai(),
            base_url: default_openai_url(),
            api_key: String::new(),
            response_model: default_response_model(),
            summary_model: default_summary_model(),
            temperature: default_temperature(),
            request_timeout_ms: default_request_timeout_ms(),
            image: MediaBackendConfig::default(),
            audio: MediaBackendConfig::default(),
            prompt_dir: None,
        }
    }
}

/// An image or audio backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaBackendConfig {
    /// "http" or "none".
    #[serde(default = "default_none")]
    pub provider: String,
    /// Full endpoint URL.
    #[serde(default)]
    pub url: String,
}

impl Default for MediaBackendConfig {
    fn default() -> Self {
        Self {
            provider: default_none(),
            url: String::new(),
        }
    }
}

/// Per-server overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerOverride {
    /// Extra text appended last to every system entry in this server.
    #[serde(default)]
    pub server_specific_message: Option<String>,
    /// Replaces the persona backstory in this server.
    #[serde(default)]
    pub backstory_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String { "info".to_string() }
fn default_openai() -> String { "openai".to_string() }
fn default_openai_url() -> String { "https://api.openai.com".to_string() }
fn default_response_model() -> String { "gpt-4o".to_string() }
fn default_summary_model() -> String { "gpt-4o-mini".to_string() }
fn default_none() -> String { "none".to_string() }
fn default_timezone_label() -> String { "PST".to_string() }
fn default_utc_offset_minutes() -> i32 { -8 * 60 }
fn default_temperature() -> f32 { 0.9 }
fn default_request_timeout_ms() -> u64 { 60_000 }
fn default_8() -> u32 { 8 }
fn default_200() -> u32 { 200 }
fn default_360() -> u32 { 360 }
fn default_1200() -> u32 { 1200 }
fn default_20_usize() -> usize { 20 }
fn default_100_usize() -> usize { 100 }
fn default_foods() -> Vec<String> { DEFAULT_FOODS.iter().map(|s| (*s).to_string()).collect() }
fn default_toxic_foods() -> Vec<String> { DEFAULT_TOXIC_FOODS.iter().map(|s| (*s).to_string()).collect() }
fn default_drinks() -> Vec<String> { DEFAULT_DRINKS.iter().map(|s| (*s).to_string()).collect() }
fn default_alcoholic_drinks() -> Vec<String> { DEFAULT_ALCOHOLIC_DRINKS.iter().map(|s| (*s).to_string()).collect() }

fn default_assistant_message() -> String {
    "# Assistant\n\nYou are a helpful member of this chat. You answer questions directly, \
     stay in character, and keep replies to a few short paragraphs.\n\n"
        .to_string()
}

fn default_backstory_message() -> String {
    "# Backstory\n\nYou are a grey wolf who wandered into this place long ago and stayed.\n\n"
        .to_string()
}

fn default_personality_message() -> String {
    "# Personality\n\nYou are loyal, curious and a little mischievous.\n\n".to_string()
}
