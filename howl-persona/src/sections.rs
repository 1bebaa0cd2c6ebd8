//! System-section builders.
//!
//! Each builder returns a markdown block ending in a blank line, or an empty
//! string when it has nothing to say. [`SystemSections`] fixes the order the
//! blocks appear in.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use howl_core::{HowlConfig, Participant, PersonaIdentity, RequesterContext};

use crate::participants::ParticipantGroup;

// ---------------------------------------------------------------------------
// Ordered assembly
// ---------------------------------------------------------------------------

/// The blocks of a full system entry, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemSections {
    /// `# General Information`.
    pub identity: String,
    /// `# Date and Time`.
    pub date: String,
    /// `# Server Information` and friends.
    pub server: String,
    /// `## Primary Participant Conversation`.
    pub primary_framing: String,
    /// The requester's summary, if one was produced.
    pub primary_summary: Option<String>,
    /// `## Secondary Participants Names and their Tags`.
    pub roster: String,
    /// Summaries of everyone else, in participant order.
    pub secondary_summaries: Vec<String>,
    /// Assistant, backstory, personality and server-specific texts.
    pub persona_texts: String,
}

impl SystemSections {
    /// Concatenate every block in the fixed order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.identity);
        out.push_str(&self.date);
        out.push_str(&self.server);
        out.push_str(&self.primary_framing);
        if let Some(summary) = &self.primary_summary {
            push_block(&mut out, summary);
        }
        out.push_str(&self.roster);
        if !self.secondary_summaries.is_empty() {
            out.push_str("## Secondary Participants Conversations\n\n");
            for summary in &self.secondary_summaries {
                push_block(&mut out, summary);
            }
        }
        out.push_str(&self.persona_texts);
        out
    }
}

fn push_block(out: &mut String, text: &str) {
    out.push_str(text.trim_end());
    out.push_str("\n\n");
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Who the persona is.
#[must_use]
pub fn identity(persona: &PersonaIdentity) -> String {
    let mut text = format!(
        "# General Information\n\nYour name is {}.\n\nYour id is {}.\n\n",
        persona.display_name, persona.id
    );
    if !persona.roles.is_empty() {
        text.push_str(&format!("Your traits are {}.\n\n", persona.roles.join(", ")));
    }
    text
}

/// Current date and time in the configured timezone.
#[must_use]
pub fn date(now: DateTime<Utc>, utc_offset_minutes: i32, label: &str) -> String {
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&offset);
    format!(
        "# Date and Time\n\nThe current date is {} {}{} {}, day is {}, and time is {} in {label}.\n\n",
        local.format("%B"),
        local.day(),
        ordinal_suffix(local.day()),
        local.year(),
        local.format("%A"),
        local.format("%-I:%M %p"),
    )
}

/// `st`, `nd`, `rd` or `th` for a day of the month.
#[must_use]
pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Server and channel facts plus how to tag someone.
#[must_use]
pub fn server_knowledge(ctx: &RequesterContext) -> String {
    let mut text = String::new();
    if let Some(server) = &ctx.server {
        text.push_str("# Server Information\n\n");
        text.push_str(&format!(
            "You are in the discord server called {}, with {} total members, and {} bots.\n\n",
            server.name, server.member_count, server.bot_count
        ));
        text.push_str(&format!("You are in the channel called: {}.\n\n", ctx.channel.name));
    }
    if let Some(topic) = ctx.channel.topic.as_deref().filter(|t| !t.trim().is_empty()) {
        text.push_str("## Channel Information\n\n");
        text.push_str(&format!("The channel topic is: {topic}\n\n"));
    }
    text.push_str("## How to tag someone\n\n");
    text.push_str(
        "To mention, tag or reply to someone, you do it by typing \"<@\", followed by the tag \
         number associated to them, and finish with \">\".\n\n",
    );
    text
}

/// Who the persona is replying to.
///
/// Empty when the requester has no usable name.
#[must_use]
pub fn primary_framing(ctx: &RequesterContext) -> String {
    let Some(name) = ctx.requester.capitalized_name() else {
        return String::new();
    };
    let mut text = String::from("## Primary Participant Conversation\n\n");
    if ctx.server.is_some() {
        text.push_str(&format!(
            "You are replying directly to {name} with tag {}.\n\n",
            ctx.requester.id.mention()
        ));
        if let Some(roles) = ctx.requester.roles_text() {
            text.push_str(&format!("{name}'s character traits and roles: {roles}.\n\n"));
        }
    }
    text.push_str(&format!("Reply by mentioning {name}'s tag.\n\n"));
    text
}

/// Names, tags and roles of everyone else in the window.
///
/// Only emitted inside a server, and only when there is someone to list.
#[must_use]
pub fn roster(ctx: &RequesterContext, secondary: &[ParticipantGroup]) -> String {
    if ctx.server.is_none() || secondary.is_empty() {
        return String::new();
    }
    let mut text = String::from(
        "## Secondary Participants Names and their Tags\n\n\
         There are also other people in the chat, who are not part of your primary \
         conversation, but are still part of the conversation. Here are their names, tags and \
         traits/roles:\n\n",
    );
    for group in secondary {
        text.push_str(&roster_line(&group.participant));
    }
    text
}

fn roster_line(participant: &Participant) -> String {
    let name = participant.name().unwrap_or(participant.username.as_str());
    let roles = participant
        .roles_text()
        .unwrap_or_else(|| "No roles".to_string());
    format!(
        "{name} ({}) has these traits and roles: {roles}\n\n",
        participant.id.mention()
    )
}

/// Assistant, backstory, personality and server-specific texts.
///
/// Backstory only appears inside a server.
#[must_use]
pub fn persona_texts(config: &HowlConfig, server_id: Option<&str>) -> String {
    let mut text = String::new();
    push_opaque(&mut text, &config.persona.assistant_message);
    text.push_str(&backstory_and_personality(config, server_id));
    if let Some(id) = server_id {
        push_opaque(&mut text, config.server_specific_message(id));
    }
    text
}

/// Backstory (server only) followed by personality.
#[must_use]
pub fn backstory_and_personality(config: &HowlConfig, server_id: Option<&str>) -> String {
    let mut text = String::new();
    if let Some(id) = server_id {
        push_opaque(&mut text, config.backstory_for(id));
    }
    push_opaque(&mut text, &config.persona.personality_message);
    text
}

/// System entry of an isolated action exchange: framing, persona texts,
/// date, then the action's own instruction.
#[must_use]
pub fn isolated_system(
    config: &HowlConfig,
    ctx: &RequesterContext,
    now: DateTime<Utc>,
    instruction: &str,
) -> String {
    let server_id = ctx.server_id();
    let mut text = primary_framing(ctx);
    text.push_str(&backstory_and_personality(config, server_id));
    if let Some(id) = server_id {
        push_opaque(&mut text, config.server_specific_message(id));
    }
    text.push_str(&date(
        now,
        config.context.utc_offset_minutes,
        &config.context.timezone_label,
    ));
    text.push_str(instruction.trim());
    text
}

fn push_opaque(out: &mut String, text: &str) {
    if !text.trim().is_empty() {
        push_block(out, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use howl_core::{ChannelInfo, ServerInfo};

    fn ctx(in_server: bool) -> RequesterContext {
        RequesterContext {
            requester: Participant {
                id: "42".into(),
                username: "alice".into(),
                display_name: None,
                roles: vec!["Hunter".into(), "Druid".into()],
            },
            persona: PersonaIdentity {
                id: "7".into(),
                display_name: "Lupos".into(),
                roles: vec!["Wolf".into()],
            },
            channel: ChannelInfo {
                id: "c1".into(),
                name: "den".into(),
                topic: Some("moon talk".into()),
            },
            server: in_server.then(|| ServerInfo {
                id: "s1".into(),
                name: "Pack".into(),
                member_count: 30,
                bot_count: 2,
            }),
            content: String::new(),
        }
    }

    #[test]
    fn ordinal_suffixes() {
        let got: Vec<_> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
            .iter()
            .map(|d| format!("{d}{}", ordinal_suffix(*d)))
            .collect();
        assert_eq!(
            got,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "31st"]
        );
    }

    #[test]
    fn date_uses_offset_and_label() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 4, 5, 0).single().expect("valid");
        let text = date(now, -480, "PST");
        assert_eq!(
            text,
            "# Date and Time\n\nThe current date is March 1st 2024, day is Friday, and time is 8:05 PM in PST.\n\n"
        );
    }

    #[test]
    fn framing_in_server_mentions_tag_and_roles() {
        let text = primary_framing(&ctx(true));
        assert!(text.starts_with("## Primary Participant Conversation\n\n"));
        assert!(text.contains("You are replying directly to Alice with tag <@42>."));
        assert!(text.contains("Alice's character traits and roles: Hunter, Druid."));
        assert!(text.ends_with("Reply by mentioning Alice's tag.\n\n"));
    }

    #[test]
    fn framing_in_dm_only_asks_for_mention() {
        let text = primary_framing(&ctx(false));
        assert!(!text.contains("replying directly"));
        assert!(text.contains("Reply by mentioning Alice's tag."));
    }

    #[test]
    fn server_knowledge_without_server_still_explains_tags() {
        let text = server_knowledge(&ctx(false));
        assert!(!text.contains("# Server Information"));
        assert!(text.contains("The channel topic is: moon talk"));
        assert!(text.contains("## How to tag someone"));
    }

    #[test]
    fn identity_lists_persona_roles() {
        let text = identity(&ctx(true).persona);
        assert!(text.contains("Your name is Lupos."));
        assert!(text.contains("Your id is 7."));
        assert!(text.contains("Your traits are Wolf."));
    }

    #[test]
    fn backstory_only_in_servers() {
        let config = HowlConfig::default();
        assert!(persona_texts(&config, Some("s1")).contains("# Backstory"));
        assert!(!persona_texts(&config, None).contains("# Backstory"));
        assert!(persona_texts(&config, None).contains("# Personality"));
    }

    #[test]
    fn render_keeps_fixed_order() {
        let sections = SystemSections {
            identity: "I\n\n".into(),
            date: "D\n\n".into(),
            server: "S\n\n".into(),
            primary_framing: "F\n\n".into(),
            primary_summary: Some("P".into()),
            roster: "R\n\n".into(),
            secondary_summaries: vec!["X".into(), "Y".into()],
            persona_texts: "T\n\n".into(),
        };
        assert_eq!(
            sections.render(),
            "I\n\nD\n\nS\n\nF\n\nP\n\nR\n\n## Secondary Participants Conversations\n\nX\n\nY\n\nT\n\n"
        );
    }
}
