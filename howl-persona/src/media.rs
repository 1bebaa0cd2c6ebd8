//! Image, vision, audio and mood helpers.
//!
//! Image generation is best-effort: composing the prompt, the refusal check
//! and the image call itself can all fail, and any failure yields `None`.

use std::sync::Arc;

use howl_core::text::first_integer;
use howl_core::{Conversation, HowlConfig, RequesterContext};
use howl_llm::{AudioArtifact, Generation, ImageArtifact, PromptEngine, PromptId};
use tracing::{debug, info, warn};

use crate::error::{PersonaError, Result};

/// Lowest mood rating.
pub const MOOD_MIN: i8 = -10;
/// Highest mood rating.
pub const MOOD_MAX: i8 = 10;

/// Media and classification requests on behalf of the persona.
#[derive(Clone)]
pub struct MediaPipeline {
    generation: Arc<dyn Generation>,
    prompts: Arc<PromptEngine>,
    config: Arc<HowlConfig>,
}

impl MediaPipeline {
    /// Create a pipeline over `generation`.
    #[must_use]
    pub fn new(
        generation: Arc<dyn Generation>,
        prompts: Arc<PromptEngine>,
        config: Arc<HowlConfig>,
    ) -> Self {
        Self {
            generation,
            prompts,
            config,
        }
    }

    /// Compose a text-to-image prompt from `text` (or the triggering message)
    /// and render it.
    ///
    /// If the backend refuses to compose a prompt, the raw text is used
    /// instead. Returns `None` on any failure.
    pub async fn generate_image(
        &self,
        ctx: &RequesterContext,
        text: Option<&str>,
    ) -> Option<ImageArtifact> {
        let text = text.unwrap_or(ctx.content.as_str());
        match self.image_pipeline(ctx, text).await {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!(error = %e, "image generation dropped");
                None
            }
        }
    }

    async fn image_pipeline(&self, ctx: &RequesterContext, text: &str) -> Result<ImageArtifact> {
        let composed = self.compose_image_prompt(ctx, text).await?;
        let prompt = if self.is_refusal(&composed).await? {
            debug!("image prompt refused, using the raw text");
            text.to_string()
        } else {
            composed
        };
        let artifact = self.generation.generate_image(&prompt).await?;
        info!(bytes = artifact.bytes.len(), "image generated");
        Ok(artifact)
    }

    /// Ask the backend to turn `text` into an image prompt.
    ///
    /// # Errors
    /// Generation failures propagate.
    pub async fn compose_image_prompt(&self, ctx: &RequesterContext, text: &str) -> Result<String> {
        let server_id = ctx.server_id();
        let backstory = server_id.map_or("", |id| self.config.backstory_for(id));
        let server_specific = server_id.map_or("", |id| self.config.server_specific_message(id));
        let (system, user) = self.prompts.render(
            PromptId::ImagePrompt,
            &[
                ("backstory", backstory),
                ("server_specific", server_specific),
                ("text", text),
            ],
        );
        let conversation = Conversation::isolated(system.trim_end(), user, ctx.requester.api_name());
        let prompt = self
            .generation
            .generate(
                &conversation,
                self.config.context.image_prompt_max_tokens,
                None,
            )
            .await?;
        Ok(prompt)
    }

    /// Whether `reply` is the backend declining a request.
    ///
    /// # Errors
    /// Generation failures propagate.
    pub async fn is_refusal(&self, reply: &str) -> Result<bool> {
        let (system, user) = self
            .prompts
            .render(PromptId::CapabilityCheck, &[("text", reply)]);
        let conversation = Conversation::isolated(system, user, None);
        let answer = self
            .generation
            .generate(
                &conversation,
                self.config.context.classifier_max_tokens,
                Some(&self.config.llm.summary_model),
            )
            .await?;
        Ok(answer.trim().eq_ignore_ascii_case("yes"))
    }

    /// Send `text` straight to the image backend.
    ///
    /// # Errors
    /// Backend failures propagate.
    pub async fn generate_image_raw(&self, text: &str) -> Result<ImageArtifact> {
        Ok(self.generation.generate_image(text).await?)
    }

    /// Answer `text` about the image at `image_url`, within the reply budget.
    ///
    /// # Errors
    /// Backend failures propagate.
    pub async fn generate_vision(&self, image_url: &str, text: &str) -> Result<String> {
        let answer = self
            .generation
            .generate_vision(image_url, text, self.config.context.response_max_tokens, None)
            .await?;
        info!(chars = answer.len(), "vision answered");
        Ok(answer)
    }

    /// Synthesize speech for `text`.
    ///
    /// # Errors
    /// Backend failures propagate.
    pub async fn generate_audio(&self, text: &str) -> Result<AudioArtifact> {
        let artifact = self.generation.generate_audio(text).await?;
        info!(file = %artifact.file_name, "audio generated");
        Ok(artifact)
    }

    /// Rate the tone of the triggering message from the persona's point of
    /// view, in `[MOOD_MIN, MOOD_MAX]`.
    ///
    /// # Errors
    /// Generation failures propagate; a reply without an integer is
    /// [`PersonaError::UnparseableMood`].
    pub async fn mood_temperature(&self, ctx: &RequesterContext) -> Result<i8> {
        let backstory = ctx
            .server_id()
            .map_or("", |id| self.config.backstory_for(id));
        let (system, user) = self.prompts.render(
            PromptId::MoodTemperature,
            &[
                ("backstory", backstory),
                ("personality", self.config.persona.personality_message.as_str()),
                ("text", ctx.content.as_str()),
            ],
        );
        let conversation = Conversation::isolated(system.trim(), user, ctx.requester.api_name());
        let answer = self
            .generation
            .generate(
                &conversation,
                self.config.context.classifier_max_tokens,
                Some(&self.config.llm.summary_model),
            )
            .await?;
        let rating = first_integer(&answer).ok_or(PersonaError::UnparseableMood(answer))?;
        let clamped = rating.clamp(i64::from(MOOD_MIN), i64::from(MOOD_MAX));
        Ok(i8::try_from(clamped).unwrap_or(0))
    }
}
