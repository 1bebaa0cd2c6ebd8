//! Core type definitions — chat participants, messages, and conversation
//! payloads.
//!
//! Everything here is platform-agnostic: ids are opaque strings handed over by
//! whatever chat client hosts the persona.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text::{capitalize, name_without_spaces};

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Opaque platform identifier for a user, bot, or the persona itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Wrap a raw platform id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is blank (unresolvable author).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Chat mention tag, e.g. `<@1234>`.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Pick the display name, falling back to the username; `None` if both blank.
fn resolve_name<'a>(display_name: Option<&'a str>, username: &'a str) -> Option<&'a str> {
    display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| Some(username.trim()).filter(|n| !n.is_empty()))
}

/// A chat user as seen by the persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Platform id.
    pub id: ParticipantId,
    /// Account username.
    pub username: String,
    /// Server nickname / display name, if set.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Role names held in the current server (excluding the implicit everyone role).
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Participant {
    /// Display name, or username when no display name is set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        resolve_name(self.display_name.as_deref(), &self.username)
    }

    /// Capitalized name for prose.
    #[must_use]
    pub fn capitalized_name(&self) -> Option<String> {
        self.name().map(capitalize)
    }

    /// Name in the shape chat APIs accept for the message `name` field.
    #[must_use]
    pub fn api_name(&self) -> Option<String> {
        self.name().and_then(name_without_spaces)
    }

    /// Comma-separated role list, or `None` when the participant has no roles.
    #[must_use]
    pub fn roles_text(&self) -> Option<String> {
        if self.roles.is_empty() {
            None
        } else {
            Some(self.roles.join(", "))
        }
    }
}

/// The persona's own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaIdentity {
    /// Platform id of the persona account.
    pub id: ParticipantId,
    /// Name the persona answers to.
    pub display_name: String,
    /// Roles held by the persona account.
    #[serde(default)]
    pub roles: Vec<String>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One chat message, read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Platform message id.
    pub id: String,
    /// Who wrote it.
    pub author_id: ParticipantId,
    /// Author account username.
    pub author_username: String,
    /// Author display name, if any.
    #[serde(default)]
    pub author_display_name: Option<String>,
    /// Author roles, when the platform could resolve them.
    #[serde(default)]
    pub author_roles: Vec<String>,
    /// Message body.
    pub content: String,
    /// When it was sent.
    pub timestamp: DateTime<Utc>,
    /// Whether the persona wrote it.
    #[serde(default)]
    pub is_from_persona: bool,
}

impl Message {
    /// Resolved author name; `None` marks the message as malformed.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        resolve_name(self.author_display_name.as_deref(), &self.author_username)
    }

    /// Whether the message can be attributed to someone.
    #[must_use]
    pub fn has_resolvable_author(&self) -> bool {
        !self.author_id.is_empty() && self.author_name().is_some()
    }
}

// ---------------------------------------------------------------------------
// Conversation payload
// ---------------------------------------------------------------------------

/// Role tag on a payload entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and world facts.
    System,
    /// Anyone who is not the persona.
    User,
    /// The persona.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        })
    }
}

/// One role-tagged entry of a conversation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role tag.
    pub role: Role,
    /// Normalized speaker name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Text body.
    pub content: String,
}

/// An ordered payload for the text backend.
///
/// Construction guarantees exactly one `system` entry, at index 0; entries
/// pushed afterwards can only be `user` or `assistant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Start a conversation with its system entry.
    #[must_use]
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::System,
                name: None,
                content: system.into(),
            }],
        }
    }

    /// A two-entry system + user exchange.
    #[must_use]
    pub fn isolated(
        system: impl Into<String>,
        user: impl Into<String>,
        user_name: Option<String>,
    ) -> Self {
        let mut conversation = Self::new(system);
        conversation.push_user(user, user_name);
        conversation
    }

    /// Append a `user` entry.
    pub fn push_user(&mut self, content: impl Into<String>, name: Option<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            name,
            content: content.into(),
        });
    }

    /// Append an `assistant` entry.
    pub fn push_assistant(&mut self, content: impl Into<String>, name: Option<String>) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            name,
            content: content.into(),
        });
    }

    /// The system text.
    #[must_use]
    pub fn system(&self) -> &str {
        &self.messages[0].content
    }

    /// Everything after the system entry.
    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.messages[1..]
    }

    /// All entries, system first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of entries, including the system entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true; a conversation always carries its system entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last user entry's text, if any.
    #[must_use]
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

// ---------------------------------------------------------------------------
// Requester context
// ---------------------------------------------------------------------------

/// Channel the triggering event happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel id; also the message-source scope id.
    pub id: String,
    /// Channel name.
    pub name: String,
    /// Channel topic, if set.
    #[serde(default)]
    pub topic: Option<String>,
}

/// Server (guild) the channel belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server id; keys per-server configuration overrides.
    pub id: String,
    /// Server name.
    pub name: String,
    /// Total member count.
    pub member_count: u64,
    /// How many of those members are bots.
    pub bot_count: u64,
}

/// Everything the host knows about the event the persona is reacting to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterContext {
    /// Who triggered the event.
    pub requester: Participant,
    /// The persona account.
    pub persona: PersonaIdentity,
    /// Where it happened.
    pub channel: ChannelInfo,
    /// Server, or `None` for a direct message.
    #[serde(default)]
    pub server: Option<ServerInfo>,
    /// Text of the triggering message (empty for slash-style actions).
    #[serde(default)]
    pub content: String,
}

impl RequesterContext {
    /// Server id, if the event happened in a server.
    #[must_use]
    pub fn server_id(&self) -> Option<&str> {
        self.server.as_ref().map(|s| s.id.as_str())
    }
}
