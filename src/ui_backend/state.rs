//! Shared Application State
//!
//! Thread-safe state that can be safely shared between the backend and frontend.

use std::sync::{Arc, RwLock};

use super::query_builder::{self, BuilderField, QueryBuilder};
use super::suggestions::InsightCatalog;
use super::types::{Message, StatusInfo};
use crate::answering::SuggestionCategory;
use crate::core::SessionIdentity;
use crate::storage::SavedQuery;

/// Currently focused UI component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedComponent {
    #[default]
    Input,
    Suggestions,
    Insights,
    Builder,
    Shortcuts,
    Messages,
}

impl FocusedComponent {
    const ORDER: [FocusedComponent; 6] = [
        Self::Input,
        Self::Suggestions,
        Self::Insights,
        Self::Builder,
        Self::Shortcuts,
        Self::Messages,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Cycle to next component
    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    /// Cycle to previous component
    pub fn previous(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// One row of the insights panel: a role-gated insight or a server category item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightEntry {
    /// `None` for quick insights, the category name otherwise
    pub category: Option<String>,
    pub query: String,
}

/// One selectable row of the query builder panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOption {
    pub field: BuilderField,
    pub value: String,
}

#[derive(Debug)]
struct StateInner {
    should_quit: bool,
    identity: SessionIdentity,

    // ========== Conversation ==========
    messages: Vec<Message>,
    messages_scroll_offset: usize,
    is_loading: bool,
    last_resolved_query: Option<String>,

    // ========== Input ==========
    input_text: String,
    input_cursor: usize,
    placeholder: String,

    // ========== Suggestion Surfaces ==========
    suggestions: Vec<String>,
    insights: Vec<String>,
    categories: Vec<SuggestionCategory>,
    builder: QueryBuilder,
    saved_queries: Vec<SavedQuery>,

    // ========== Focus ==========
    focused_component: FocusedComponent,
    selection: usize,

    status_message: Option<String>,
}

/// Thread-safe shared state
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<StateInner>>,
}

impl SharedState {
    /// Create the state for a session. The welcome message is transcript entry 0.
    pub fn new(identity: SessionIdentity, welcome: &str) -> Self {
        let insights = InsightCatalog::standard().visible_for(identity.role);
        Self::with_insights(identity, welcome, insights)
    }

    pub fn with_insights(identity: SessionIdentity, welcome: &str, insights: Vec<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateInner {
                should_quit: false,
                identity,
                messages: vec![Message::bot(welcome)],
                messages_scroll_offset: 0,
                is_loading: false,
                last_resolved_query: None,
                input_text: String::new(),
                input_cursor: 0,
                placeholder: String::new(),
                suggestions: Vec::new(),
                insights,
                categories: Vec::new(),
                builder: QueryBuilder::default(),
                saved_queries: Vec::new(),
                focused_component: FocusedComponent::Input,
                selection: 0,
                status_message: None,
            })),
        }
    }

    // ========== Private Helpers ==========

    /// Get a read lock on the inner state, recovering from poison
    fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, StateInner> {
        self.inner.read().unwrap_or_else(|poisoned| {
            tracing::warn!("SharedState read lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Get a write lock on the inner state, recovering from poison
    fn write_inner(&self) -> std::sync::RwLockWriteGuard<'_, StateInner> {
        self.inner.write().unwrap_or_else(|poisoned| {
            tracing::warn!("SharedState write lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    // ========== Application ==========

    pub fn should_quit(&self) -> bool {
        self.read_inner().should_quit
    }

    pub fn set_should_quit(&self, quit: bool) {
        self.write_inner().should_quit = quit;
    }

    pub fn identity(&self) -> SessionIdentity {
        self.read_inner().identity.clone()
    }

    pub fn status_message(&self) -> Option<String> {
        self.read_inner().status_message.clone()
    }

    pub fn set_status_message(&self, message: Option<String>) {
        self.write_inner().status_message = message;
    }

    /// Snapshot for the status bar
    pub fn status(&self) -> StatusInfo {
        let inner = self.read_inner();
        StatusInfo {
            message: inner.status_message.clone(),
            loading: inner.is_loading,
            identity: format!(
                "{} · {} · {}",
                inner.identity.name,
                inner.identity.role.display_name(),
                inner.identity.branch.label()
            ),
        }
    }

    // ========== Conversation ==========

    pub fn messages(&self) -> Vec<Message> {
        self.read_inner().messages.clone()
    }

    /// Access messages without cloning the transcript
    pub fn with_messages<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Message]) -> R,
    {
        f(&self.read_inner().messages)
    }

    pub fn message_count(&self) -> usize {
        self.read_inner().messages.len()
    }

    /// Append to the transcript and return the new entry's index
    pub fn push_message(&self, message: Message) -> usize {
        let mut inner = self.write_inner();
        inner.messages.push(message);
        inner.messages.len() - 1
    }

    /// Snap the transcript view back to the newest entry
    pub fn scroll_to_newest(&self) {
        self.write_inner().messages_scroll_offset = 0;
    }

    /// Lines scrolled up from the bottom of the transcript
    pub fn messages_scroll_offset(&self) -> usize {
        self.read_inner().messages_scroll_offset
    }

    pub fn scroll_messages(&self, delta: isize) {
        let mut inner = self.write_inner();
        inner.messages_scroll_offset = inner.messages_scroll_offset.saturating_add_signed(delta);
    }

    pub fn is_loading(&self) -> bool {
        self.read_inner().is_loading
    }

    /// Enter the loading state unless a request is already in flight.
    ///
    /// Returns false when the caller must not start another request.
    pub fn try_begin_request(&self) -> bool {
        let mut inner = self.write_inner();
        if inner.is_loading {
            return false;
        }
        inner.is_loading = true;
        true
    }

    pub fn finish_request(&self) {
        self.write_inner().is_loading = false;
    }

    pub fn last_resolved_query(&self) -> Option<String> {
        self.read_inner().last_resolved_query.clone()
    }

    pub fn set_last_resolved_query(&self, query: Option<String>) {
        self.write_inner().last_resolved_query = query;
    }

    // ========== Input ==========

    pub fn input_text(&self) -> String {
        self.read_inner().input_text.clone()
    }

    /// Byte offset of the cursor in the input text
    pub fn input_cursor(&self) -> usize {
        self.read_inner().input_cursor
    }

    /// Replace the input and move the cursor to the end
    pub fn set_input_text(&self, text: String) {
        let mut inner = self.write_inner();
        inner.input_cursor = text.len();
        inner.input_text = text;
    }

    pub fn clear_input(&self) {
        let mut inner = self.write_inner();
        inner.input_text.clear();
        inner.input_cursor = 0;
    }

    pub fn insert_char(&self, c: char) {
        let mut inner = self.write_inner();
        let pos = inner.input_cursor;
        inner.input_text.insert(pos, c);
        inner.input_cursor += c.len_utf8();
    }

    pub fn delete_char_before(&self) {
        let mut inner = self.write_inner();
        if inner.input_cursor > 0 {
            let pos = inner.input_cursor;
            if let Some(c) = inner.input_text[..pos].chars().next_back() {
                let char_len = c.len_utf8();
                inner.input_text.drain(pos - char_len..pos);
                inner.input_cursor -= char_len;
            }
        }
    }

    pub fn move_cursor_left(&self) {
        let mut inner = self.write_inner();
        let pos = inner.input_cursor;
        if let Some(c) = inner.input_text[..pos].chars().next_back() {
            inner.input_cursor -= c.len_utf8();
        }
    }

    pub fn move_cursor_right(&self) {
        let mut inner = self.write_inner();
        let pos = inner.input_cursor;
        if let Some(c) = inner.input_text[pos..].chars().next() {
            inner.input_cursor += c.len_utf8();
        }
    }

    pub fn placeholder(&self) -> String {
        self.read_inner().placeholder.clone()
    }

    pub fn set_placeholder(&self, text: impl Into<String>) {
        self.write_inner().placeholder = text.into();
    }

    // ========== Suggestion Surfaces ==========

    pub fn suggestions(&self) -> Vec<String> {
        self.read_inner().suggestions.clone()
    }

    pub fn set_suggestions(&self, suggestions: Vec<String>) {
        let mut inner = self.write_inner();
        inner.suggestions = suggestions;
        if inner.focused_component == FocusedComponent::Suggestions {
            inner.selection = 0;
        }
    }

    /// Quick insights visible to this session's role
    pub fn insights(&self) -> Vec<String> {
        self.read_inner().insights.clone()
    }

    pub fn categories(&self) -> Vec<SuggestionCategory> {
        self.read_inner().categories.clone()
    }

    pub fn set_categories(&self, categories: Vec<SuggestionCategory>) {
        self.write_inner().categories = categories;
    }

    /// Quick insights followed by every server category item
    pub fn insight_entries(&self) -> Vec<InsightEntry> {
        let inner = self.read_inner();
        let insights = inner.insights.iter().map(|q| InsightEntry {
            category: None,
            query: q.clone(),
        });
        let categories = inner.categories.iter().flat_map(|c| {
            c.items.iter().map(move |item| InsightEntry {
                category: Some(c.name.clone()),
                query: item.clone(),
            })
        });
        insights.chain(categories).collect()
    }

    pub fn builder(&self) -> QueryBuilder {
        self.read_inner().builder.clone()
    }

    /// Record a builder selection; returns the composed query once complete
    pub fn select_builder(&self, field: BuilderField, value: &str) -> Option<String> {
        self.write_inner().builder.select(field, value)
    }

    /// Flattened builder rows: metric, period, then branch options
    pub fn builder_options(&self) -> Vec<BuilderOption> {
        let scope = self.read_inner().identity.branch.clone();
        let metrics = query_builder::METRIC_OPTIONS
            .iter()
            .map(|v| (BuilderField::Metric, v.to_string()));
        let periods = query_builder::PERIOD_OPTIONS
            .iter()
            .map(|v| (BuilderField::Period, v.to_string()));
        let branches = query_builder::branch_options(&scope)
            .into_iter()
            .map(|v| (BuilderField::Branch, v));

        metrics
            .chain(periods)
            .chain(branches)
            .map(|(field, value)| BuilderOption { field, value })
            .collect()
    }

    pub fn saved_queries(&self) -> Vec<SavedQuery> {
        self.read_inner().saved_queries.clone()
    }

    pub fn set_saved_queries(&self, saved: Vec<SavedQuery>) {
        let mut inner = self.write_inner();
        inner.saved_queries = saved;
        if inner.focused_component == FocusedComponent::Shortcuts {
            let len = inner.saved_queries.len();
            inner.selection = inner.selection.min(len.saturating_sub(1));
        }
    }

    // ========== Focus ==========

    pub fn focused_component(&self) -> FocusedComponent {
        self.read_inner().focused_component
    }

    pub fn set_focused_component(&self, component: FocusedComponent) {
        let mut inner = self.write_inner();
        inner.focused_component = component;
        inner.selection = 0;
    }

    /// Number of selectable rows in the focused component
    pub fn focused_len(&self) -> usize {
        match self.focused_component() {
            FocusedComponent::Input | FocusedComponent::Messages => 0,
            FocusedComponent::Suggestions => self.read_inner().suggestions.len(),
            FocusedComponent::Insights => self.insight_entries().len(),
            FocusedComponent::Builder => self.builder_options().len(),
            FocusedComponent::Shortcuts => self.read_inner().saved_queries.len(),
        }
    }

    /// Highlighted row within the focused list
    pub fn selection(&self) -> usize {
        self.read_inner().selection
    }

    /// Move the highlighted row, clamped to a list of `len` items
    pub fn move_selection(&self, delta: isize, len: usize) {
        let mut inner = self.write_inner();
        if len == 0 {
            inner.selection = 0;
            return;
        }
        inner.selection = inner.selection.saturating_add_signed(delta).min(len - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BranchScope, Role};

    fn state_for(role: Role) -> SharedState {
        SharedState::new(
            SessionIdentity::new("tester", role, BranchScope::Branch("1".into())),
            "Welcome",
        )
    }

    #[test]
    fn test_welcome_is_first_message() {
        let state = state_for(Role::Staff);
        assert_eq!(state.message_count(), 1);
        let first = &state.messages()[0];
        assert!(!first.is_user());
        assert_eq!(first.text, "Welcome");
    }

    #[test]
    fn test_try_begin_request_is_exclusive() {
        let state = state_for(Role::Manager);
        assert!(state.try_begin_request());
        assert!(state.is_loading());
        assert!(!state.try_begin_request());

        state.finish_request();
        assert!(!state.is_loading());
        assert!(state.try_begin_request());
    }

    #[test]
    fn test_input_editing_handles_multibyte() {
        let state = state_for(Role::Staff);
        state.insert_char('é');
        state.insert_char('x');
        assert_eq!(state.input_text(), "éx");
        assert_eq!(state.input_cursor(), 3);

        state.move_cursor_left();
        state.delete_char_before();
        assert_eq!(state.input_text(), "x");
        assert_eq!(state.input_cursor(), 0);

        state.delete_char_before();
        assert_eq!(state.input_text(), "x");
    }

    #[test]
    fn test_scroll_is_independent_of_append() {
        let state = state_for(Role::Staff);
        state.scroll_messages(5);
        assert_eq!(state.messages_scroll_offset(), 5);
        state.scroll_messages(-10);
        assert_eq!(state.messages_scroll_offset(), 0);

        state.scroll_messages(3);
        let index = state.push_message(Message::user("hi"));
        assert_eq!(index, 1);
        assert_eq!(state.messages_scroll_offset(), 3);
        state.scroll_to_newest();
        assert_eq!(state.messages_scroll_offset(), 0);
    }

    #[test]
    fn test_insights_follow_role() {
        assert_eq!(state_for(Role::Staff).insights().len(), 2);
        assert_eq!(state_for(Role::Admin).insights().len(), 5);
    }

    #[test]
    fn test_builder_options_scope_branches() {
        let state = state_for(Role::Staff);
        let branches: Vec<_> = state
            .builder_options()
            .into_iter()
            .filter(|o| o.field == BuilderField::Branch)
            .map(|o| o.value)
            .collect();
        assert_eq!(branches, vec!["Branch 1".to_string()]);
    }

    #[test]
    fn test_insight_entries_append_categories() {
        let state = state_for(Role::Staff);
        state.set_categories(vec![SuggestionCategory {
            name: "Trends".into(),
            items: vec!["Weekly trend".into()],
        }]);
        let entries = state.insight_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].category.as_deref(), Some("Trends"));
        assert_eq!(entries[2].query, "Weekly trend");

        state.set_focused_component(FocusedComponent::Insights);
        assert_eq!(state.focused_len(), 3);
    }

    #[test]
    fn test_focus_cycle_wraps() {
        let mut focus = FocusedComponent::Input;
        for _ in 0..6 {
            focus = focus.next();
        }
        assert_eq!(focus, FocusedComponent::Input);
        assert_eq!(FocusedComponent::Input.previous(), FocusedComponent::Messages);
    }

    #[test]
    fn test_move_selection_clamps() {
        let state = state_for(Role::Staff);
        state.move_selection(10, 3);
        assert_eq!(state.selection(), 2);
        state.move_selection(-10, 3);
        assert_eq!(state.selection(), 0);
        state.move_selection(1, 0);
        assert_eq!(state.selection(), 0);
    }
}
