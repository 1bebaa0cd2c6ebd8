//! The generation capability the persona engine depends on.
//!
//! Everything above this crate only sees [`Generation`]; which backend
//! actually serves a call is decided by the implementation (normally
//! [`crate::GenerationRouter`]).

use async_trait::async_trait;
use howl_core::Conversation;

use crate::error::Result;
use crate::types::{AudioArtifact, ImageArtifact};

/// Text, image and audio generation.
///
/// Implementations must be `Send + Sync`; the context aggregator issues many
/// `generate` calls concurrently against one shared instance.
#[async_trait]
pub trait Generation: Send + Sync {
    /// Generate a reply to `conversation`.
    ///
    /// `model` overrides the implementation's default model for this call.
    async fn generate(
        &self,
        conversation: &Conversation,
        max_tokens: u32,
        model: Option<&str>,
    ) -> Result<String>;

    /// Answer `prompt` about the image at `image_url`.
    async fn generate_vision(
        &self,
        image_url: &str,
        prompt: &str,
        max_tokens: u32,
        model: Option<&str>,
    ) -> Result<String>;

    /// Render an image from a text prompt.
    async fn generate_image(&self, prompt: &str) -> Result<ImageArtifact>;

    /// Speak `text` and return a reference to the clip.
    async fn generate_audio(&self, text: &str) -> Result<AudioArtifact>;
}
