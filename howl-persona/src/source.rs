//! Where chat history comes from.
//!
//! The host implements [`MessageSource`] on top of its chat client. The
//! engine only ever asks for "the last `limit` messages of this scope".

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use howl_core::{HowlError, Message};
use parking_lot::RwLock;

/// Read access to a channel's recent messages.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Up to `limit` most recent messages of `scope_id`, oldest first.
    ///
    /// # Errors
    /// Returns [`HowlError::MessageSource`] when the platform cannot serve
    /// the window.
    async fn fetch_window(&self, scope_id: &str, limit: usize) -> Result<Vec<Message>, HowlError>;
}

/// In-memory message store keyed by scope id.
///
/// Useful for tests and for hosts that already buffer history themselves.
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct StaticMessageSource {
    scopes: Arc<RwLock<HashMap<String, Vec<Message>>>>,
}

impl StaticMessageSource {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history of `scope_id`. `messages` must be oldest first.
    pub fn set_scope(&self, scope_id: impl Into<String>, messages: Vec<Message>) {
        self.scopes.write().insert(scope_id.into(), messages);
    }

    /// Append one message to `scope_id`.
    pub fn push(&self, scope_id: &str, message: Message) {
        self.scopes
            .write()
            .entry(scope_id.to_string())
            .or_default()
            .push(message);
    }
}

#[async_trait]
impl MessageSource for StaticMessageSource {
    async fn fetch_window(&self, scope_id: &str, limit: usize) -> Result<Vec<Message>, HowlError> {
        let scopes = self.scopes.read();
        let messages = scopes.get(scope_id).ok_or_else(|| HowlError::MessageSource {
            scope: scope_id.to_string(),
            reason: "unknown scope".into(),
        })?;
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }
}
