//! Artifacts and wire shapes exchanged with generation backends.

use serde::{Deserialize, Serialize};

/// A generated image, handed back to the host untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    /// Raw image bytes as returned by the backend.
    pub bytes: Vec<u8>,
    /// MIME type reported by the backend, if any.
    pub content_type: Option<String>,
}

/// Reference to a generated audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// File name the audio backend wrote the clip to.
    pub file_name: String,
}

/// Which text backend a router talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBackendKind {
    /// `/v1/chat/completions`.
    OpenAiCompatible,
    /// Ollama `/api/chat`.
    Ollama,
    /// Nothing configured.
    None,
}

// Minimal response shapes; unknown fields are ignored.

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaChatResponse {
    pub message: ChatCompletionMessage,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if it has any.
    pub(crate) fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
    }
}
