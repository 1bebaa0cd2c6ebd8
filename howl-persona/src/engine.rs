//! `PersonaEngine` — the one handle a host holds.
//!
//! Wires configuration, the shared need counters, the generation backend and
//! the message source into the aggregator, resolver and media pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use howl_core::{Catalogs, Conversation, HowlConfig, NeedStore, RequesterContext};
use howl_llm::{AudioArtifact, Generation, GenerationRouter, ImageArtifact, PromptEngine};
use tracing::info;

use crate::actions::{ActionKind, ActionReply, ActionResolver};
use crate::context::ContextAggregator;
use crate::error::Result;
use crate::media::MediaPipeline;
use crate::source::MessageSource;
use crate::summarizer::Summarizer;

/// A configured persona.
pub struct PersonaEngine {
    config: Arc<HowlConfig>,
    generation: Arc<dyn Generation>,
    needs: NeedStore,
    context: ContextAggregator,
    actions: ActionResolver,
    media: MediaPipeline,
}

impl PersonaEngine {
    /// Build an engine over explicit backends.
    ///
    /// # Errors
    /// Fails if a draw catalog is empty or the prompt directory cannot be
    /// loaded.
    pub fn new(
        config: HowlConfig,
        generation: Arc<dyn Generation>,
        source: Arc<dyn MessageSource>,
    ) -> Result<Self> {
        let catalogs = Arc::new(Catalogs::from_config(&config.catalog)?);
        let prompts = Arc::new(match config.llm.prompt_dir.as_deref() {
            Some(dir) => PromptEngine::from_directory(dir)?,
            None => PromptEngine::builtin(),
        });
        let needs = NeedStore::from_config(&config.needs);
        let config = Arc::new(config);

        let summarizer = Summarizer::from_config(Arc::clone(&generation), Arc::clone(&prompts), &config);
        let context = ContextAggregator::new(source, summarizer, Arc::clone(&config));
        let actions = ActionResolver::new(
            needs.clone(),
            catalogs,
            Arc::clone(&generation),
            Arc::clone(&prompts),
            Arc::clone(&config),
        );
        let media = MediaPipeline::new(Arc::clone(&generation), prompts, Arc::clone(&config));

        info!(needs = %needs.snapshot(), "persona engine ready");
        Ok(Self {
            config,
            generation,
            needs,
            context,
            actions,
            media,
        })
    }

    /// Build an engine whose backends come from the `[llm]` section.
    ///
    /// # Errors
    /// As [`PersonaEngine::new`], plus router configuration errors.
    pub fn with_router(config: HowlConfig, source: Arc<dyn MessageSource>) -> Result<Self> {
        let router = GenerationRouter::from_config(&config.llm)?;
        Self::new(config, Arc::new(router), source)
    }

    /// Replace the action resolver's rng with a seeded one.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            actions: self.actions.with_seed(seed),
            ..self
        }
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &HowlConfig {
        &self.config
    }

    /// Shared need counters. Clones observe the same state.
    #[must_use]
    pub fn needs(&self) -> NeedStore {
        self.needs.clone()
    }

    /// Full conversation payload for `ctx`.
    ///
    /// # Errors
    /// Message source failures.
    pub async fn build_conversation(&self, ctx: &RequesterContext) -> Result<Conversation> {
        self.context.build_conversation(ctx).await
    }

    /// As [`PersonaEngine::build_conversation`] with a pinned clock.
    ///
    /// # Errors
    /// Message source failures.
    pub async fn build_conversation_at(
        &self,
        ctx: &RequesterContext,
        now: DateTime<Utc>,
    ) -> Result<Conversation> {
        self.context.build_conversation_at(ctx, now).await
    }

    /// Build the payload and generate an in-character reply.
    ///
    /// # Errors
    /// Message source and generation failures.
    pub async fn respond(&self, ctx: &RequesterContext) -> Result<String> {
        let conversation = self.build_conversation(ctx).await?;
        let reply = self
            .generation
            .generate(&conversation, self.config.context.response_max_tokens, None)
            .await?;
        info!(
            requester = %ctx.requester.id,
            channel = %ctx.channel.id,
            entries = conversation.len(),
            "reply generated"
        );
        Ok(reply)
    }

    /// Resolve a named action (`eat`, `drink`, `alcohol`, or an alias).
    ///
    /// # Errors
    /// Unknown names are rejected before any counter moves; generation
    /// failures propagate after the counters moved.
    pub async fn resolve_action(&self, name: &str, ctx: &RequesterContext) -> Result<ActionReply> {
        let action: ActionKind = name.parse()?;
        self.actions.resolve(action, ctx).await
    }

    /// Resolve `action` with a chosen item.
    ///
    /// # Errors
    /// Generation failures.
    pub async fn resolve_action_with_item(
        &self,
        action: ActionKind,
        item: &str,
        ctx: &RequesterContext,
    ) -> Result<ActionReply> {
        self.actions.resolve_with_item(action, Some(item), ctx).await
    }

    /// See [`MediaPipeline::generate_image`].
    pub async fn generate_image(&self, ctx: &RequesterContext, text: Option<&str>) -> Option<ImageArtifact> {
        self.media.generate_image(ctx, text).await
    }

    /// See [`MediaPipeline::generate_image_raw`].
    ///
    /// # Errors
    /// Backend failures.
    pub async fn generate_image_raw(&self, text: &str) -> Result<ImageArtifact> {
        self.media.generate_image_raw(text).await
    }

    /// See [`MediaPipeline::generate_vision`].
    ///
    /// # Errors
    /// Backend failures.
    pub async fn generate_vision(&self, image_url: &str, text: &str) -> Result<String> {
        self.media.generate_vision(image_url, text).await
    }

    /// See [`MediaPipeline::generate_audio`].
    ///
    /// # Errors
    /// Backend failures.
    pub async fn generate_audio(&self, text: &str) -> Result<AudioArtifact> {
        self.media.generate_audio(text).await
    }

    /// See [`MediaPipeline::mood_temperature`].
    ///
    /// # Errors
    /// Generation failures and unparseable ratings.
    pub async fn mood_temperature(&self, ctx: &RequesterContext) -> Result<i8> {
        self.media.mood_temperature(ctx).await
    }
}
