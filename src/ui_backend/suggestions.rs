//! Suggestion engine
//!
//! Two sources feed the chips under the input:
//! - a fixed catalog of quick insights, filtered by the session role
//! - server-backed autocomplete, debounced on input changes
//!
//! Autocomplete requests are tagged with a generation number. Every input
//! change bumps the generation, so a timer or response belonging to an older
//! input is dropped instead of overwriting newer suggestions.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::answering::AnsweringService;
use crate::core::Role;

use super::events::AppEvent;
use super::state::SharedState;

/// A predefined safe query and the roles allowed to see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub query: String,
    pub allowed_roles: BTreeSet<Role>,
}

impl Insight {
    pub fn new(query: impl Into<String>, roles: &[Role]) -> Self {
        Self {
            query: query.into(),
            allowed_roles: roles.iter().copied().collect(),
        }
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

/// Ordered catalog of quick insights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightCatalog {
    entries: Vec<Insight>,
}

impl InsightCatalog {
    pub fn new(entries: Vec<Insight>) -> Self {
        Self { entries }
    }

    /// The built-in quick insights
    pub fn standard() -> Self {
        use Role::*;
        let everyone = [Staff, Manager, Admin, BusinessOwner];
        let supervisors = [Manager, Admin, BusinessOwner];

        Self::new(vec![
            Insight::new("Sales of Branch 1 today", &everyone),
            Insight::new("Which branch has highest sales this month?", &supervisors),
            Insight::new("Lowest performing branch this year", &supervisors),
            Insight::new("Past 3 months sales summary", &everyone),
            Insight::new("Compare Branch 1 and Branch 2", &supervisors),
        ])
    }

    /// Queries visible to `role`, in catalog order
    pub fn visible_for(&self, role: Role) -> Vec<String> {
        self.entries
            .iter()
            .filter(|insight| insight.is_visible_to(role))
            .map(|insight| insight.query.clone())
            .collect()
    }
}

/// Debounced, server-backed completions for the input buffer
#[derive(Clone)]
pub struct Autocomplete {
    service: Arc<dyn AnsweringService>,
    state: SharedState,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    debounce: Duration,
    min_chars: usize,
    generation: Arc<AtomicU64>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("service", &self.service.name())
            .field("debounce", &self.debounce)
            .field("min_chars", &self.min_chars)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl Autocomplete {
    pub fn new(
        service: Arc<dyn AnsweringService>,
        state: SharedState,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        debounce: Duration,
        min_chars: usize,
    ) -> Self {
        Self {
            service,
            state,
            event_tx,
            debounce,
            min_chars,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Latest generation issued
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// React to a change of the input buffer. Must run inside a tokio runtime.
    pub fn on_input_changed(&self, input: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_pending();

        if input.trim().chars().count() < self.min_chars {
            if !self.state.suggestions().is_empty() {
                self.state.set_suggestions(Vec::new());
                self.event_tx.send(AppEvent::SuggestionsUpdated).ok();
            }
            return;
        }

        let this = self.clone();
        let input = input.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(this.debounce).await;
            if this.generation() != generation {
                return;
            }

            tracing::debug!("Requesting suggestions for {:?} (generation {})", input, generation);
            let result = this.service.suggest(&input).await;

            if this.generation() != generation {
                tracing::debug!("Discarding stale suggestions for generation {}", generation);
                return;
            }
            match result {
                Ok(suggestions) => {
                    this.state.set_suggestions(suggestions);
                    this.event_tx.send(AppEvent::SuggestionsUpdated).ok();
                }
                Err(e) => {
                    tracing::warn!("Suggestion request failed: {}", e);
                }
            }
        });

        *self.lock_pending() = Some(handle);
    }

    /// Drop any scheduled request and invalidate in-flight responses
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending();
    }

    fn abort_pending(&self) {
        if let Some(handle) = self.lock_pending().take() {
            handle.abort();
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_sees_only_shared_insights() {
        let visible = InsightCatalog::standard().visible_for(Role::Staff);
        assert_eq!(
            visible,
            vec![
                "Sales of Branch 1 today".to_string(),
                "Past 3 months sales summary".to_string(),
            ]
        );
        assert!(!visible.contains(&"Compare Branch 1 and Branch 2".to_string()));
    }

    #[test]
    fn test_owner_sees_supervisor_insights_in_order() {
        let visible = InsightCatalog::standard().visible_for(Role::BusinessOwner);
        assert_eq!(visible.len(), 5);
        assert_eq!(visible[4], "Compare Branch 1 and Branch 2");
    }

    #[test]
    fn test_custom_catalog_membership() {
        let catalog = InsightCatalog::new(vec![
            Insight::new("Admin only", &[Role::Admin]),
            Insight::new("Nobody", &[]),
        ]);
        assert_eq!(catalog.visible_for(Role::Admin), vec!["Admin only".to_string()]);
        assert!(catalog.visible_for(Role::Manager).is_empty());
    }
}
