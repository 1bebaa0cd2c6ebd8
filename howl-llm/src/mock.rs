//! In-memory [`Generation`] for tests and offline hosts.
//!
//! Replies are chosen by rules matched against the system prompt (the user
//! prompt for vision calls), then by a FIFO script, then by a default reply.
//! Every call is recorded.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use howl_core::Conversation;
use parking_lot::Mutex;

use crate::error::{LlmError, Result};
use crate::generation::Generation;
use crate::types::{AudioArtifact, ImageArtifact};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Succeed with this text.
    Reply(String),
    /// Fail with [`LlmError::RequestFailed`] carrying this message.
    Fail(String),
}

/// A recorded `generate` call.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    /// The payload as sent.
    pub conversation: Conversation,
    /// Requested token cap.
    pub max_tokens: u32,
    /// Requested model override.
    pub model: Option<String>,
}

#[derive(Default)]
struct ScriptInner {
    rules: Vec<(String, Scripted)>,
    delays: Vec<(String, Duration)>,
    queue: VecDeque<Scripted>,
    default_reply: Option<String>,
    calls: Vec<CapturedCall>,
    image_prompts: Vec<String>,
    audio_texts: Vec<String>,
    vision_requests: Vec<(String, String)>,
    media_fails: bool,
}

impl ScriptInner {
    fn outcome_for(&mut self, haystack: &str) -> Scripted {
        let ruled = self
            .rules
            .iter()
            .find(|(marker, _)| haystack.contains(marker.as_str()))
            .map(|(_, outcome)| outcome.clone());
        ruled
            .or_else(|| self.queue.pop_front())
            .unwrap_or_else(|| {
                let reply = self.default_reply.clone();
                Scripted::Reply(reply.unwrap_or_else(|| "Awoo.".to_string()))
            })
    }
}

impl Scripted {
    fn into_result(self) -> Result<String> {
        match self {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fail(reason) => Err(LlmError::RequestFailed(reason)),
        }
    }
}

/// Scripted generation backend. Clones share the script and the call log.
#[derive(Clone, Default)]
pub struct ScriptedGeneration {
    inner: Arc<Mutex<ScriptInner>>,
}

impl ScriptedGeneration {
    /// A backend that answers everything with `"Awoo."`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fallback reply.
    #[must_use]
    pub fn with_default_reply(self, reply: impl Into<String>) -> Self {
        self.inner.lock().default_reply = Some(reply.into());
        self
    }

    /// Answer `reply` whenever the system prompt contains `marker`.
    #[must_use]
    pub fn reply_when(self, marker: impl Into<String>, reply: impl Into<String>) -> Self {
        self.inner
            .lock()
            .rules
            .push((marker.into(), Scripted::Reply(reply.into())));
        self
    }

    /// Fail whenever the system prompt contains `marker`.
    #[must_use]
    pub fn fail_when(self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        let reason = format!("scripted failure for '{marker}'");
        self.inner.lock().rules.push((marker, Scripted::Fail(reason)));
        self
    }

    /// Sleep before answering whenever the system prompt contains `marker`.
    #[must_use]
    pub fn delay_when(self, marker: impl Into<String>, delay: Duration) -> Self {
        self.inner.lock().delays.push((marker.into(), delay));
        self
    }

    /// Make image and audio calls fail.
    #[must_use]
    pub fn failing_media(self) -> Self {
        self.inner.lock().media_fails = true;
        self
    }

    /// Queue an outcome for the next call no rule matches.
    pub fn push(&self, outcome: Scripted) {
        self.inner.lock().queue.push_back(outcome);
    }

    /// Queue a reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.push(Scripted::Reply(reply.into()));
    }

    /// Queue a failure.
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.push(Scripted::Fail(reason.into()));
    }

    /// Every `generate` call so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<CapturedCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of `generate` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }

    /// Prompts passed to `generate_image`.
    #[must_use]
    pub fn image_prompts(&self) -> Vec<String> {
        self.inner.lock().image_prompts.clone()
    }

    /// Texts passed to `generate_audio`.
    #[must_use]
    pub fn audio_texts(&self) -> Vec<String> {
        self.inner.lock().audio_texts.clone()
    }

    /// `(image_url, prompt)` pairs passed to `generate_vision`.
    #[must_use]
    pub fn vision_requests(&self) -> Vec<(String, String)> {
        self.inner.lock().vision_requests.clone()
    }
}

#[async_trait]
impl Generation for ScriptedGeneration {
    async fn generate(
        &self,
        conversation: &Conversation,
        max_tokens: u32,
        model: Option<&str>,
    ) -> Result<String> {
        let (delay, outcome) = {
            let mut inner = self.inner.lock();
            inner.calls.push(CapturedCall {
                conversation: conversation.clone(),
                max_tokens,
                model: model.map(String::from),
            });
            let system = conversation.system();
            let delay = inner
                .delays
                .iter()
                .find(|(marker, _)| system.contains(marker.as_str()))
                .map(|(_, d)| *d);
            let outcome = inner.outcome_for(system);
            (delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome.into_result()
    }

    async fn generate_vision(
        &self,
        image_url: &str,
        prompt: &str,
        _max_tokens: u32,
        _model: Option<&str>,
    ) -> Result<String> {
        let mut inner = self.inner.lock();
        inner
            .vision_requests
            .push((image_url.to_string(), prompt.to_string()));
        inner.outcome_for(prompt).into_result()
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageArtifact> {
        let mut inner = self.inner.lock();
        inner.image_prompts.push(prompt.to_string());
        if inner.media_fails {
            return Err(LlmError::Unavailable("scripted image failure".into()));
        }
        Ok(ImageArtifact {
            bytes: prompt.as_bytes().to_vec(),
            content_type: Some("image/png".into()),
        })
    }

    async fn generate_audio(&self, text: &str) -> Result<AudioArtifact> {
        let mut inner = self.inner.lock();
        inner.audio_texts.push(text.to_string());
        if inner.media_fails {
            return Err(LlmError::Unavailable("scripted audio failure".into()));
        }
        Ok(AudioArtifact {
            file_name: format!("clip_{:04}.wav", inner.audio_texts.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convo(system: &str) -> Conversation {
        Conversation::isolated(system, "hi", None)
    }

    #[tokio::test]
    async fn rules_beat_queue_beat_default() {
        let backend = ScriptedGeneration::new()
            .with_default_reply("default")
            .reply_when("summary", "summarized");
        backend.push_reply("queued");

        let first = backend.generate(&convo("a summary please"), 10, None).await;
        assert_eq!(first.expect("ok"), "summarized");
        let second = backend.generate(&convo("plain"), 10, None).await;
        assert_eq!(second.expect("ok"), "queued");
        let third = backend.generate(&convo("plain"), 10, None).await;
        assert_eq!(third.expect("ok"), "default");
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn fail_rule_produces_error() {
        let backend = ScriptedGeneration::new().fail_when("Bob");
        let err = backend.generate(&convo("about Bob"), 10, Some("small")).await;
        assert!(matches!(err, Err(LlmError::RequestFailed(_))));
        assert_eq!(backend.calls()[0].model.as_deref(), Some("small"));
    }

    #[tokio::test]
    async fn clones_share_the_log() {
        let backend = ScriptedGeneration::new();
        let other = backend.clone();
        backend.generate_audio("awoo").await.expect("audio");
        assert_eq!(other.audio_texts(), vec!["awoo".to_string()]);
    }

    #[tokio::test]
    async fn vision_is_recorded_and_scripted_by_prompt() {
        let backend = ScriptedGeneration::new()
            .reply_when("describe", "A grey wolf.")
            .fail_when("forbidden");

        let answer = backend
            .generate_vision("https://img/wolf.png", "describe this", 50, None)
            .await;
        assert_eq!(answer.expect("ok"), "A grey wolf.");
        let fallback = backend.generate_vision("https://img/moon.png", "what?", 50, None).await;
        assert_eq!(fallback.expect("ok"), "Awoo.");
        let refused = backend.generate_vision("https://img/x.png", "forbidden", 50, None).await;
        assert!(matches!(refused, Err(LlmError::RequestFailed(_))));

        let first = &backend.vision_requests()[0];
        assert_eq!(first.0, "https://img/wolf.png");
        assert_eq!(first.1, "describe this");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_are_applied() {
        let backend = ScriptedGeneration::new().delay_when("slow", Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        backend.generate(&convo("slow one"), 1, None).await.expect("ok");
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
