//! Answering service client
//!
//! The answering service resolves natural-language business questions on the
//! server side. This module only defines the wire shapes and a trait seam so
//! the session controller can be driven by the HTTP client or by a test fake.

mod error;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{BranchScope, Role, SessionContext};

pub use error::AnsweringError;
pub use http::HttpAnsweringService;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub role: Role,
    pub branch_id: BranchScope,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, context: SessionContext) -> Self {
        Self {
            message: message.into(),
            role: context.role,
            branch_id: context.branch,
        }
    }
}

/// Body returned by `POST /chat`. Both fields may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    pub answer: Option<String>,
    pub resolved_query: Option<String>,
}

impl ChatReply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            answer: Some(text.into()),
            resolved_query: None,
        }
    }

    pub fn with_resolved_query(mut self, query: impl Into<String>) -> Self {
        self.resolved_query = Some(query.into());
        self
    }
}

/// Body of `POST /suggest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub input: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestReply {
    pub suggestions: Vec<String>,
}

/// One named group from `GET /suggestions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCategory {
    pub name: String,
    pub items: Vec<String>,
}

/// Parse the `GET /suggestions` body: a map of category name to list of
/// strings. Entries that are not string lists are skipped, as are empty
/// categories (the service answers `{"suggestions": []}` when it has none).
pub fn parse_categories(body: &serde_json::Value) -> Result<Vec<SuggestionCategory>, AnsweringError> {
    let map = body
        .as_object()
        .ok_or_else(|| AnsweringError::Decode("suggestions body is not an object".to_string()))?;

    Ok(map
        .iter()
        .filter_map(|(name, value)| {
            let items: Vec<String> = value
                .as_array()?
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            (!items.is_empty()).then(|| SuggestionCategory {
                name: name.clone(),
                items,
            })
        })
        .collect())
}

/// Remote collaborator that answers questions and offers completions
#[async_trait]
pub trait AnsweringService: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// `POST /chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, AnsweringError>;

    /// `POST /suggest`
    async fn suggest(&self, input: &str) -> Result<Vec<String>, AnsweringError>;

    /// `GET /suggestions`
    async fn suggestion_categories(&self) -> Result<Vec<SuggestionCategory>, AnsweringError>;
}
