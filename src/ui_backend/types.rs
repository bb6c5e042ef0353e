//! Shared Types for UI Backend
//!
//! Common data structures used across the BFF layer and frontends.

use serde::{Deserialize, Serialize};

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Render-time slice of a message: prose or a fenced code block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessageSegment {
    Text {
        content: String,
    },
    Code {
        language: String,
        code: String,
        block_id: String,
    },
}

impl MessageSegment {
    pub fn text(content: impl Into<String>) -> Self {
        MessageSegment::Text {
            content: content.into(),
        }
    }

    pub fn block_id(&self) -> Option<&str> {
        match self {
            MessageSegment::Code { block_id, .. } => Some(block_id),
            MessageSegment::Text { .. } => None,
        }
    }
}

/// Status bar information
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub message: Option<String>,
    pub loading: bool,
    pub identity: String,
}
