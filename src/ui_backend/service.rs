//! Application Service - Session Logic
//!
//! The session controller behind every frontend. It turns commands into
//! state changes and answering-service calls:
//! - sending messages, with local command interception first
//! - role-gated insights, server categories and debounced autocomplete
//! - the query builder
//! - saved shortcuts

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::answering::{AnsweringService, ChatRequest};
use crate::config::SuggestionsConfig;
use crate::storage::{SavedQuery, ShortcutStore};

use super::commands::Command;
use super::errors::ShortcutError;
use super::events::AppEvent;
use super::formatter::format_message;
use super::interceptor;
use super::state::{FocusedComponent, SharedState};
use super::suggestions::Autocomplete;
use super::types::{Message, MessageSegment};

/// Bot text for a 2xx reply without a usable answer
pub const INVALID_RESPONSE_TEXT: &str = "System Error: Invalid response format.";

/// Bot text for any failed chat call
pub const CONNECTION_ERROR_TEXT: &str = "Connection error. Please check system status.";

/// Application Service - Session Logic Layer
///
/// Cheap to clone; clones share state, store and the autocomplete debouncer.
#[derive(Clone)]
pub struct AppService {
    /// Remote collaborator answering questions
    answering: Arc<dyn AnsweringService>,

    /// Shared application state
    state: SharedState,

    /// Durable saved shortcuts
    store: Arc<Mutex<ShortcutStore>>,

    /// Debounced server completions
    autocomplete: Autocomplete,

    /// Submit autocomplete picks instead of filling the input
    auto_submit: bool,

    /// Event channel for async updates to UI
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl std::fmt::Debug for AppService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppService")
            .field("answering", &self.answering.name())
            .field("state", &self.state)
            .field("autocomplete", &self.autocomplete)
            .field("auto_submit", &self.auto_submit)
            .finish()
    }
}

impl AppService {
    /// Create the service for one session
    pub fn new(
        answering: Arc<dyn AnsweringService>,
        state: SharedState,
        store: ShortcutStore,
        settings: &SuggestionsConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        state.set_saved_queries(store.list().to_vec());

        let autocomplete = Autocomplete::new(
            answering.clone(),
            state.clone(),
            event_tx.clone(),
            settings.debounce(),
            settings.min_chars,
        );

        let identity = state.identity();
        tracing::info!(
            "Session started for {} ({}, {}) against {}",
            identity.name,
            identity.role,
            identity.branch,
            answering.name()
        );

        Self {
            answering,
            state,
            store: Arc::new(Mutex::new(store)),
            autocomplete,
            auto_submit: settings.auto_submit,
            event_tx,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn autocomplete(&self) -> &Autocomplete {
        &self.autocomplete
    }

    fn lock_store(&self) -> MutexGuard<'_, ShortcutStore> {
        self.store.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Shortcut store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Handle a user command
    pub async fn handle_command(&self, command: Command) -> Result<()> {
        match command {
            Command::Quit => {
                self.autocomplete.cancel();
                self.state.set_should_quit(true);
            }

            Command::FocusNext => {
                let next = self.state.focused_component().next();
                self.state.set_focused_component(next);
            }
            Command::FocusPrevious => {
                let previous = self.state.focused_component().previous();
                self.state.set_focused_component(previous);
            }
            Command::MoveSelection(delta) => {
                if self.state.focused_component() == FocusedComponent::Messages {
                    // Up in the transcript means further from the newest line
                    self.state.scroll_messages(-delta);
                } else {
                    self.state.move_selection(delta, self.state.focused_len());
                }
            }

            Command::InsertChar(c) => {
                if self.state.focused_component() != FocusedComponent::Input {
                    self.state.set_focused_component(FocusedComponent::Input);
                }
                self.state.insert_char(c);
                self.input_changed();
            }
            Command::DeleteCharBefore => {
                self.state.delete_char_before();
                self.input_changed();
            }
            Command::CursorLeft => self.state.move_cursor_left(),
            Command::CursorRight => self.state.move_cursor_right(),
            Command::SetInput(text) => {
                self.state.set_input_text(text);
                self.input_changed();
            }

            Command::SendMessage(override_text) => self.send_message(override_text).await,
            Command::Scroll(delta) => self.state.scroll_messages(delta),
            Command::CopyLatestCode => self.copy_latest_code(),

            Command::SelectInsight(query) => {
                tracing::debug!("Quick insight selected: {}", query);
                self.send_message(Some(query)).await;
            }
            Command::SelectCategorySuggestion(query) => {
                tracing::debug!("Category suggestion selected: {}", query);
                self.send_message(Some(query)).await;
            }
            Command::SelectSuggestion(suggestion) => self.select_suggestion(suggestion).await,
            Command::SelectBuilder { field, value } => {
                if let Some(query) = self.state.select_builder(field, &value) {
                    tracing::debug!("Query builder composed: {}", query);
                    self.send_message(Some(query)).await;
                }
            }

            Command::RunShortcut(id) => {
                if let Err(e) = self.run_shortcut(id).await {
                    tracing::warn!("Failed to run shortcut: {}", e);
                    self.set_status(e.to_string());
                }
            }
            Command::DeleteShortcut(id) => {
                if let Err(e) = self.delete_shortcut(id) {
                    tracing::warn!("Failed to delete shortcut: {}", e);
                    self.set_status(e.to_string());
                }
            }
        }

        Ok(())
    }

    /// Send the input buffer, or `override_text` when given.
    ///
    /// Never fails: service errors become fixed bot messages and the loading
    /// flag is always cleared before returning.
    pub async fn send_message(&self, override_text: Option<String>) {
        let from_override = override_text.is_some();
        let text = override_text
            .unwrap_or_else(|| self.state.input_text())
            .trim()
            .to_string();
        if text.is_empty() {
            return;
        }
        if self.state.is_loading() {
            tracing::debug!("Ignoring send while a request is in flight");
            return;
        }

        let intercepted = {
            let last = self.state.last_resolved_query();
            let mut store = self.lock_store();
            interceptor::intercept(&text, last.as_deref(), &mut store)
        };
        if let Some(result) = intercepted {
            if result.saved.is_some() {
                self.sync_shortcuts();
            }
            self.append(Message::bot(result.acknowledgment));
            self.clear_input();
            return;
        }

        if !self.state.try_begin_request() {
            tracing::debug!("Another request claimed the session first");
            return;
        }
        self.append(Message::user(text.clone()));
        if !from_override {
            self.clear_input();
        }
        self.event_tx.send(AppEvent::LoadingChanged(true)).ok();

        let request = ChatRequest::new(text.clone(), self.state.identity().context());
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "chat",
            %request_id,
            role = %request.role,
            branch = %request.branch_id
        );

        let result = async {
            tracing::info!("Dispatching question to {}", self.answering.name());
            self.answering.chat(&request).await
        }
        .instrument(span)
        .await;

        match result {
            Ok(reply) => {
                let answer = reply
                    .answer
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| {
                        tracing::warn!(%request_id, "Chat reply carried no answer");
                        INVALID_RESPONSE_TEXT.to_string()
                    });
                let resolved = reply
                    .resolved_query
                    .filter(|q| !q.trim().is_empty())
                    .unwrap_or_else(|| text.clone());
                self.state.set_last_resolved_query(Some(resolved));
                self.append(Message::bot(answer));
            }
            Err(e) => {
                if e.is_connectivity() {
                    tracing::error!(%request_id, "Answering service unreachable: {}", e);
                } else {
                    tracing::error!(
                        %request_id,
                        retryable = e.is_retryable(),
                        "Chat request failed: {}",
                        e
                    );
                }
                self.append(Message::bot(CONNECTION_ERROR_TEXT));
            }
        }

        self.state.finish_request();
        self.event_tx.send(AppEvent::LoadingChanged(false)).ok();
    }

    /// Run a saved shortcut through `send_message`
    pub async fn run_shortcut(&self, id: i64) -> Result<(), ShortcutError> {
        let query = self
            .lock_store()
            .get(id)
            .map(|saved| saved.query.clone())
            .ok_or(ShortcutError::NotFound(id))?;
        tracing::debug!("Running shortcut {}: {}", id, query);
        self.send_message(Some(query)).await;
        Ok(())
    }

    /// Delete a saved shortcut by id
    pub fn delete_shortcut(&self, id: i64) -> Result<SavedQuery, ShortcutError> {
        let removed = self
            .lock_store()
            .delete(id)?
            .ok_or(ShortcutError::NotFound(id))?;
        self.sync_shortcuts();
        self.set_status(format!("Deleted shortcut \"{}\"", removed.label));
        Ok(removed)
    }

    /// Fetch server suggestion categories once. Failures are logged only.
    pub async fn refresh_categories(&self) {
        match self.answering.suggestion_categories().await {
            Ok(categories) => {
                let count = categories.len();
                tracing::debug!("Loaded {} suggestion categories", count);
                self.state.set_categories(categories);
                self.event_tx.send(AppEvent::CategoriesLoaded(count)).ok();
            }
            Err(e) => {
                tracing::warn!("Failed to load suggestion categories: {}", e);
            }
        }
    }

    async fn select_suggestion(&self, suggestion: String) {
        self.autocomplete.cancel();
        self.state.set_suggestions(Vec::new());
        self.event_tx.send(AppEvent::SuggestionsUpdated).ok();

        if self.auto_submit {
            self.send_message(Some(suggestion)).await;
        } else {
            self.state.set_input_text(suggestion);
            self.state.set_focused_component(FocusedComponent::Input);
        }
    }

    fn copy_latest_code(&self) {
        let latest = self.state.with_messages(|messages| {
            messages.iter().enumerate().rev().find_map(|(index, message)| {
                format_message(&message.text, index)
                    .into_iter()
                    .rev()
                    .find_map(|segment| match segment {
                        MessageSegment::Code { code, block_id, .. } => Some((block_id, code)),
                        MessageSegment::Text { .. } => None,
                    })
            })
        });

        match latest {
            Some((block_id, code)) => {
                self.event_tx
                    .send(AppEvent::CopyRequested { block_id, code })
                    .ok();
            }
            None => self.set_status("No code block to copy".to_string()),
        }
    }

    fn append(&self, message: Message) {
        self.state.push_message(message.clone());
        self.event_tx.send(AppEvent::MessageAdded(message)).ok();
    }

    fn clear_input(&self) {
        self.state.clear_input();
        self.input_changed();
    }

    fn input_changed(&self) {
        self.autocomplete.on_input_changed(&self.state.input_text());
    }

    fn sync_shortcuts(&self) {
        let saved = self.lock_store().list().to_vec();
        self.state.set_saved_queries(saved);
        self.event_tx.send(AppEvent::ShortcutsChanged).ok();
    }

    fn set_status(&self, message: String) {
        self.state.set_status_message(Some(message.clone()));
        self.event_tx.send(AppEvent::StatusChanged(message)).ok();
    }
}
