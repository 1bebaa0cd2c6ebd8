//! Partitioning a message window by author.

use std::collections::HashMap;

use howl_core::{Message, Participant, ParticipantId};
use tracing::debug;

/// One author's messages within a window, in window order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantGroup {
    /// Who wrote them.
    pub participant: Participant,
    /// Their messages, oldest first.
    pub messages: Vec<Message>,
}

impl ParticipantGroup {
    fn from_first(message: &Message) -> Self {
        Self {
            participant: Participant {
                id: message.author_id.clone(),
                username: message.author_username.clone(),
                display_name: message.author_display_name.clone(),
                roles: message.author_roles.clone(),
            },
            messages: Vec::new(),
        }
    }

    /// Message bodies separated by blank lines.
    #[must_use]
    pub fn bodies(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the group holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A window split into the requester and everyone else.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// The requester's messages; `None` when they wrote nothing in the window.
    pub primary: Option<ParticipantGroup>,
    /// Every other author except the persona, in first-appearance order.
    pub secondary: Vec<ParticipantGroup>,
}

/// Whether `message` was written by the persona.
#[must_use]
pub fn is_persona_message(message: &Message, persona: &ParticipantId) -> bool {
    message.is_from_persona || message.author_id == *persona
}

/// Group `window` by author id.
///
/// Messages without a resolvable author are dropped. The primary group keeps
/// the requester's own profile (roles included) rather than the one copied
/// from their messages.
#[must_use]
pub fn partition(window: &[Message], persona: &ParticipantId, requester: &Participant) -> Partition {
    let mut primary: Option<ParticipantGroup> = None;
    let mut secondary: Vec<ParticipantGroup> = Vec::new();
    let mut index: HashMap<&ParticipantId, usize> = HashMap::new();

    for message in window {
        if !message.has_resolvable_author() {
            debug!(message_id = %message.id, "skipping message without a resolvable author");
            continue;
        }
        if is_persona_message(message, persona) {
            continue;
        }
        if message.author_id == requester.id {
            primary
                .get_or_insert_with(|| ParticipantGroup {
                    participant: requester.clone(),
                    messages: Vec::new(),
                })
                .messages
                .push(message.clone());
            continue;
        }
        let slot = *index.entry(&message.author_id).or_insert_with(|| {
            secondary.push(ParticipantGroup::from_first(message));
            secondary.len() - 1
        });
        secondary[slot].messages.push(message.clone());
    }

    Partition { primary, secondary }
}
