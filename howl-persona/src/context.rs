//! Context aggregator — turns a chat channel into one conversation payload.
//!
//! ```text
//!   fetch recent window ─┐
//!                        ├─► partition ─► summaries (join_all) ─► sections ─┐
//!   fetch summary window ┘                                                  ├─► Conversation
//!   recent window ───────────────────────────────────► transcript ─────────┘
//! ```
//!
//! Summary failures are absorbed; a failed fetch is not.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use howl_core::text::capitalize;
use howl_core::{Conversation, HowlConfig, Message, RequesterContext};
use tracing::debug;

use crate::error::Result;
use crate::participants::{self, Partition, is_persona_message};
use crate::sections::{self, SystemSections};
use crate::source::MessageSource;
use crate::summarizer::Summarizer;

/// Builds full conversation payloads for in-character replies.
#[derive(Clone)]
pub struct ContextAggregator {
    source: Arc<dyn MessageSource>,
    summarizer: Summarizer,
    config: Arc<HowlConfig>,
}

impl ContextAggregator {
    /// Create an aggregator over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn MessageSource>, summarizer: Summarizer, config: Arc<HowlConfig>) -> Self {
        Self {
            source,
            summarizer,
            config,
        }
    }

    /// Build the payload for `ctx` as of now.
    ///
    /// # Errors
    /// Fails only when the message source cannot serve a window.
    pub async fn build_conversation(&self, ctx: &RequesterContext) -> Result<Conversation> {
        self.build_conversation_at(ctx, Utc::now()).await
    }

    /// Build the payload for `ctx` with the date section pinned to `now`.
    ///
    /// # Errors
    /// Fails only when the message source cannot serve a window.
    pub async fn build_conversation_at(
        &self,
        ctx: &RequesterContext,
        now: DateTime<Utc>,
    ) -> Result<Conversation> {
        let scope = ctx.channel.id.as_str();
        let context = &self.config.context;
        let (recent, window) = futures::try_join!(
            self.source.fetch_window(scope, context.recent_window),
            self.source.fetch_window(scope, context.summary_window),
        )?;

        let partition = participants::partition(&window, &ctx.persona.id, &ctx.requester);
        let (primary_summary, secondary_summaries) = self.summarize_all(ctx, &partition).await;
        debug!(
            scope,
            recent = recent.len(),
            window = window.len(),
            secondary = partition.secondary.len(),
            summaries = secondary_summaries.len() + usize::from(primary_summary.is_some()),
            "context gathered"
        );

        let sections = SystemSections {
            identity: sections::identity(&ctx.persona),
            date: sections::date(now, context.utc_offset_minutes, &context.timezone_label),
            server: sections::server_knowledge(ctx),
            primary_framing: sections::primary_framing(ctx),
            primary_summary,
            roster: sections::roster(ctx, &partition.secondary),
            secondary_summaries,
            persona_texts: sections::persona_texts(&self.config, ctx.server_id()),
        };

        let mut conversation = Conversation::new(sections.render());
        let skip = recent.len().saturating_sub(context.recent_window);
        for message in &recent[skip..] {
            push_transcript_entry(&mut conversation, message, ctx);
        }
        Ok(conversation)
    }

    /// Run every summary concurrently and fold the results in group order.
    async fn summarize_all(
        &self,
        ctx: &RequesterContext,
        partition: &Partition,
    ) -> (Option<String>, Vec<String>) {
        let requester_name = ctx.requester.api_name();
        let persona_name = ctx.persona.display_name.as_str();

        let mut jobs = Vec::with_capacity(partition.secondary.len() + 1);
        if let Some(primary) = &partition.primary {
            jobs.push(self.summarizer.summarize(primary, Some(persona_name), requester_name.clone()));
        }
        for group in &partition.secondary {
            jobs.push(self.summarizer.summarize(group, None, requester_name.clone()));
        }

        let mut results = join_all(jobs).await.into_iter();
        let primary = if partition.primary.is_some() {
            results.next().flatten()
        } else {
            None
        };
        (primary, results.flatten().collect())
    }
}

/// Append one transcript entry; messages without a resolvable author are
/// left out.
fn push_transcript_entry(conversation: &mut Conversation, message: &Message, ctx: &RequesterContext) {
    let Some(name) = message.author_name().filter(|_| message.has_resolvable_author()) else {
        debug!(message_id = %message.id, "transcript entry skipped");
        return;
    };
    let api_name = howl_core::text::name_without_spaces(name);
    if is_persona_message(message, &ctx.persona.id) {
        conversation.push_assistant(message.content.clone(), api_name);
    } else {
        conversation.push_user(
            format!("{} said {}.", capitalize(name), message.content),
            api_name,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use howl_core::{ChannelInfo, Participant, PersonaIdentity, Role, ServerInfo};
    use howl_llm::PromptEngine;
    use howl_llm::mock::ScriptedGeneration;

    use crate::source::StaticMessageSource;

    fn msg(i: usize, author: &str, name: &str, content: &str) -> Message {
        Message {
            id: format!("m{i}"),
            author_id: author.into(),
            author_username: name.into(),
            author_display_name: None,
            author_roles: Vec::new(),
            content: content.into(),
            timestamp: Utc.timestamp_opt(1_700_000_000 + i64::try_from(i).unwrap_or(0), 0).single().expect("ts"),
            is_from_persona: author == "p",
        }
    }

    fn ctx() -> RequesterContext {
        RequesterContext {
            requester: Participant {
                id: "r".into(),
                username: "alice".into(),
                display_name: None,
                roles: Vec::new(),
            },
            persona: PersonaIdentity {
                id: "p".into(),
                display_name: "Lupos".into(),
                roles: Vec::new(),
            },
            channel: ChannelInfo {
                id: "den".into(),
                name: "den".into(),
                topic: None,
            },
            server: Some(ServerInfo {
                id: "s".into(),
                name: "Pack".into(),
                member_count: 3,
                bot_count: 1,
            }),
            content: "hello".into(),
        }
    }

    fn transcript_text(conversation: &Conversation) -> Vec<&str> {
        conversation.transcript().iter().map(|m| m.content.as_str()).collect()
    }

    fn aggregator(backend: &ScriptedGeneration, source: &StaticMessageSource, config: HowlConfig) -> ContextAggregator {
        let summarizer = Summarizer::from_config(
            Arc::new(backend.clone()),
            Arc::new(PromptEngine::builtin()),
            &config,
        );
        ContextAggregator::new(Arc::new(source.clone()), summarizer, Arc::new(config))
    }

    #[tokio::test]
    async fn transcript_roles_and_wording() {
        let source = StaticMessageSource::new();
        source.set_scope(
            "den",
            vec![
                msg(0, "r", "alice", "hi wolf"),
                msg(1, "p", "Lupos", "Awoo!"),
                msg(2, "b", "bob smith", "pet the wolf"),
            ],
        );
        let backend = ScriptedGeneration::new();
        let conversation = aggregator(&backend, &source, HowlConfig::default())
            .build_conversation(&ctx())
            .await
            .expect("build");

        let transcript = conversation.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].content, "Alice said hi wolf.");
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].content, "Awoo!");
        assert_eq!(transcript[2].name.as_deref(), Some("bob_smith"));
        assert_eq!(transcript[2].content, "Bob smith said pet the wolf.");
    }

    #[tokio::test]
    async fn transcript_is_bounded_by_recent_window() {
        let source = StaticMessageSource::new();
        source.set_scope("den", (0..30).map(|i| msg(i, "b", "bob", &i.to_string())).collect());
        let backend = ScriptedGeneration::new();
        let mut config = HowlConfig::default();
        config.context.recent_window = 5;
        let conversation = aggregator(&backend, &source, config)
            .build_conversation(&ctx())
            .await
            .expect("build");
        assert_eq!(conversation.transcript().len(), 5);
        assert_eq!(conversation.transcript()[0].content, "Bob said 25.");
    }

    #[tokio::test]
    async fn silent_requester_gets_no_primary_summary() {
        let source = StaticMessageSource::new();
        source.set_scope("den", vec![msg(0, "b", "bob", "yo")]);
        let backend = ScriptedGeneration::new();
        aggregator(&backend, &source, HowlConfig::default())
            .build_conversation(&ctx())
            .await
            .expect("build");
        assert_eq!(backend.call_count(), 1);
        assert!(!backend.calls()[0].conversation.system().contains("Your name is"));
    }

    #[tokio::test(start_paused = true)]
    async fn summaries_keep_participant_order_despite_delays_and_failures() {
        let source = StaticMessageSource::new();
        source.set_scope(
            "den",
            vec![
                msg(0, "b", "bob", "first"),
                msg(1, "c", "carl", "second"),
                msg(2, "d", "dan", "third"),
                msg(3, "e", "eve", "fourth"),
            ],
        );
        let backend = ScriptedGeneration::new()
            .delay_when("What Bob", std::time::Duration::from_millis(300))
            .delay_when("What Carl", std::time::Duration::from_millis(100))
            .reply_when("What Bob", "BOB-SUMMARY")
            .reply_when("What Carl", "CARL-SUMMARY")
            .fail_when("What Dan")
            .reply_when("What Eve", "EVE-SUMMARY");
        let conversation = aggregator(&backend, &source, HowlConfig::default())
            .build_conversation(&ctx())
            .await
            .expect("build");

        let system = conversation.system();
        let bob = system.find("BOB-SUMMARY").expect("bob");
        let carl = system.find("CARL-SUMMARY").expect("carl");
        let eve = system.find("EVE-SUMMARY").expect("eve");
        assert!(bob < carl && carl < eve);
        assert_eq!(backend.call_count(), 4);
        assert_eq!(
            transcript_text(&conversation),
            ["Bob said first.", "Carl said second.", "Dan said third.", "Eve said fourth."]
        );
    }

    #[tokio::test]
    async fn failed_summaries_drop_out_without_failing_the_build() {
        let source = StaticMessageSource::new();
        source.set_scope(
            "den",
            vec![msg(0, "r", "alice", "hi"), msg(1, "b", "bob", "yo"), msg(2, "c", "carl", "hey")],
        );
        let backend = ScriptedGeneration::new().fail_when("has been talking about");
        let conversation = aggregator(&backend, &source, HowlConfig::default())
            .build_conversation(&ctx())
            .await
            .expect("build");

        let system = conversation.system();
        assert!(!system.contains("## Secondary Participants Conversations"));
        assert!(system.contains("## Secondary Participants Names and their Tags"));
        assert!(system.contains("## Primary Participant Conversation"));
        assert_eq!(
            transcript_text(&conversation),
            ["Alice said hi.", "Bob said yo.", "Carl said hey."]
        );
    }

    #[tokio::test]
    async fn requester_and_persona_alone_have_no_secondary_sections() {
        let source = StaticMessageSource::new();
        source.set_scope(
            "den",
            vec![
                msg(0, "r", "alice", "hi wolf"),
                msg(1, "p", "Lupos", "Awoo!"),
                msg(2, "r", "alice", "are you hungry"),
            ],
        );
        let backend = ScriptedGeneration::new()
            .reply_when("Your name is Lupos", "### What Alice has been talking about
snacks");
        let conversation = aggregator(&backend, &source, HowlConfig::default())
            .build_conversation(&ctx())
            .await
            .expect("build");

        let system = conversation.system();
        assert!(!system.contains("## Secondary Participants Names and their Tags"));
        assert!(!system.contains("## Secondary Participants Conversations"));
        assert!(system.contains("## Primary Participant Conversation"));
        assert!(system.contains("### What Alice has been talking about\nsnacks"));
        assert_eq!(backend.call_count(), 1);

        let messages = conversation.messages();
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1..].iter().all(|m| m.role != Role::System));
        assert!(messages.iter().all(|m| !m.content.trim().is_empty()));
        let roles: Vec<_> = conversation.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User]);
        assert_eq!(
            transcript_text(&conversation),
            ["Alice said hi wolf.", "Awoo!", "Alice said are you hungry."]
        );
    }

    #[tokio::test]
    async fn sections_appear_once_in_fixed_order() {
        let source = StaticMessageSource::new();
        source.set_scope(
            "den",
            vec![msg(0, "r", "alice", "hi"), msg(1, "b", "bob", "yo")],
        );
        let backend = ScriptedGeneration::new()
            .reply_when("Your name is Lupos", "### What Alice has been talking about\nwolves")
            .reply_when("What Bob", "### What Bob has been talking about\nmoons");
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).single().expect("ts");
        let conversation = aggregator(&backend, &source, HowlConfig::default())
            .build_conversation_at(&ctx(), now)
            .await
            .expect("build");

        let system_entries = conversation
            .messages()
            .iter()
            .filter(|m| m.role == Role::System)
            .count();
        assert_eq!(system_entries, 1);
        assert_eq!(conversation.messages()[0].role, Role::System);

        let system = conversation.system();
        let order = [
            "# General Information",
            "# Date and Time",
            "# Server Information",
            "## How to tag someone",
            "## Primary Participant Conversation",
            "### What Alice has been talking about",
            "## Secondary Participants Names and their Tags",
            "## Secondary Participants Conversations",
            "### What Bob has been talking about",
        ];
        let positions: Vec<_> = order
            .iter()
            .map(|heading| system.find(heading).unwrap_or_else(|| panic!("missing {heading}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{system}");
        assert!(system.contains("January 1st 2024"));
    }

    #[tokio::test]
    async fn missing_scope_surfaces() {
        let source = StaticMessageSource::new();
        let backend = ScriptedGeneration::new();
        let result = aggregator(&backend, &source, HowlConfig::default())
            .build_conversation(&ctx())
            .await;
        assert!(result.is_err());
        assert_eq!(backend.call_count(), 0);
    }
}
