//! crates/research_core/src/chat.rs
//!
//! The append-only conversation of a session.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{ChatMessage, ChatRole, DocumentResponse, Theme};

#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(ChatRole::User, content.into(), None, None)
    }

    pub fn add_assistant_message(
        &mut self,
        content: impl Into<String>,
        document_responses: Option<Vec<DocumentResponse>>,
        themes: Option<Vec<Theme>>,
    ) -> &ChatMessage {
        self.push(ChatRole::Assistant, content.into(), document_responses, themes)
    }

    /// Drops the whole history. Only ever called on explicit user action.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn get(&self, id: Uuid) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn latest_assistant(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
    }

    fn push(
        &mut self,
        role: ChatRole,
        content: String,
        document_responses: Option<Vec<DocumentResponse>>,
        themes: Option<Vec<Theme>>,
    ) -> &ChatMessage {
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            document_responses,
            themes,
        });
        &self.messages[self.messages.len() - 1]
    }
}
