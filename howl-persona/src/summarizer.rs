//! Participant summarizer — one generation request per chat participant.
//!
//! A summary is best-effort. Whatever goes wrong (no name, no messages,
//! backend error) the result is simply `None` and the caller carries on.

use std::sync::Arc;

use howl_core::{Conversation, HowlConfig};
use howl_llm::{Generation, PromptEngine, PromptId};
use tracing::{debug, warn};

use crate::participants::ParticipantGroup;

/// Turns a participant's recent messages into a short prose summary.
#[derive(Clone)]
pub struct Summarizer {
    generation: Arc<dyn Generation>,
    prompts: Arc<PromptEngine>,
    max_tokens: u32,
    model: String,
}

impl Summarizer {
    /// Create a summarizer with an explicit token budget and model.
    #[must_use]
    pub fn new(
        generation: Arc<dyn Generation>,
        prompts: Arc<PromptEngine>,
        max_tokens: u32,
        model: impl Into<String>,
    ) -> Self {
        Self {
            generation,
            prompts,
            max_tokens,
            model: model.into(),
        }
    }

    /// Budget from `[context]`, model from `[llm].summary_model`.
    #[must_use]
    pub fn from_config(
        generation: Arc<dyn Generation>,
        prompts: Arc<PromptEngine>,
        config: &HowlConfig,
    ) -> Self {
        Self::new(
            generation,
            prompts,
            config.context.summary_max_tokens,
            config.llm.summary_model.clone(),
        )
    }

    /// The request that would summarize `group`, or `None` when there is
    /// nothing to summarize.
    ///
    /// `persona_name` selects the primary variant, which tells the model who
    /// it is. `requester_name` tags the user entry.
    #[must_use]
    pub fn request(
        &self,
        group: &ParticipantGroup,
        persona_name: Option<&str>,
        requester_name: Option<String>,
    ) -> Option<Conversation> {
        if group.is_empty() {
            return None;
        }
        let participant = group.participant.name()?;
        let bodies = group.bodies();
        let mut vars = vec![("participant", participant), ("messages", bodies.as_str())];
        let id = match persona_name {
            Some(persona) => {
                vars.push(("persona_name", persona));
                PromptId::SummaryPrimary
            }
            None => PromptId::SummarySecondary,
        };
        let (system, user) = self.prompts.render(id, &vars);
        Some(Conversation::isolated(system, user, requester_name))
    }

    /// Summarize `group`; `None` on any failure.
    pub async fn summarize(
        &self,
        group: &ParticipantGroup,
        persona_name: Option<&str>,
        requester_name: Option<String>,
    ) -> Option<String> {
        let conversation = self.request(group, persona_name, requester_name)?;
        let participant = group.participant.id.as_str();
        match self
            .generation
            .generate(&conversation, self.max_tokens, Some(&self.model))
            .await
        {
            Ok(summary) => {
                debug!(participant, messages = group.len(), "participant summarized");
                Some(summary)
            }
            Err(e) => {
                warn!(participant, error = %e, "participant summary dropped");
                None
            }
        }
    }
}
