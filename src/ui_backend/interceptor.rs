//! Local command interception
//!
//! Some inputs are handled on the client without a round trip. The only
//! recognized grammar is `save [as] <label>`, which stores the last resolved
//! query under a user-chosen label.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::storage::{SavedQuery, ShortcutStore};

static SAVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^save(?: as)? (.+)$").expect("valid regex"));

/// A recognized local command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    SaveAs { label: String },
}

impl LocalCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = SAVE_PATTERN.captures(text)?;
        let label = caps.get(1)?.as_str().trim();
        (!label.is_empty()).then(|| LocalCommand::SaveAs {
            label: label.to_string(),
        })
    }
}

/// Outcome of an intercepted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub acknowledgment: String,
    pub saved: Option<SavedQuery>,
}

impl CommandResult {
    fn warning(text: impl Into<String>) -> Self {
        Self {
            acknowledgment: text.into(),
            saved: None,
        }
    }
}

/// Check `text` against the local grammars and execute a match.
///
/// Returns `None` when the text must go to the answering service.
pub fn intercept(
    text: &str,
    last_resolved_query: Option<&str>,
    store: &mut ShortcutStore,
) -> Option<CommandResult> {
    let command = LocalCommand::parse(text)?;
    tracing::debug!("Intercepted local command: {:?}", command);

    let result = match command {
        LocalCommand::SaveAs { label } => {
            match last_resolved_query.filter(|q| !q.trim().is_empty()) {
                None => CommandResult::warning(
                    "⚠️ Nothing to save yet. Run a query first, then type \"save as <name>\".",
                ),
                Some(query) => match store.save(query, &label) {
                    Ok(saved) => CommandResult {
                        acknowledgment: format!(
                            "✅ Saved \"{}\" as shortcut \"{}\".",
                            saved.query, saved.label
                        ),
                        saved: Some(saved),
                    },
                    Err(e) => {
                        tracing::error!("Failed to persist shortcut '{}': {}", label, e);
                        CommandResult::warning(format!("⚠️ Could not save shortcut: {}", e))
                    }
                },
            }
        }
    };

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_save_variants() {
        assert_eq!(
            LocalCommand::parse("save as Weekly"),
            Some(LocalCommand::SaveAs {
                label: "Weekly".into()
            })
        );
        assert_eq!(
            LocalCommand::parse("SAVE Monthly branch 2"),
            Some(LocalCommand::SaveAs {
                label: "Monthly branch 2".into()
            })
        );
        assert_eq!(
            LocalCommand::parse("Save As  spaced"),
            Some(LocalCommand::SaveAs {
                label: "spaced".into()
            })
        );
    }

    #[test]
    fn test_parse_rejects_other_text() {
        assert_eq!(LocalCommand::parse("save"), None);
        assert_eq!(LocalCommand::parse("save as   "), None);
        assert_eq!(LocalCommand::parse("saves as x"), None);
        assert_eq!(LocalCommand::parse("please save as x"), None);
        assert_eq!(LocalCommand::parse("Past 3 months sales"), None);
    }

    #[test]
    fn test_save_with_resolved_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ShortcutStore::open(dir.path()).unwrap();

        let result = intercept(
            "save as Weekly",
            Some("Past 7 days sales, Branch 1"),
            &mut store,
        )
        .unwrap();

        assert!(result.acknowledgment.starts_with("✅"));
        assert!(result.acknowledgment.contains("Past 7 days sales, Branch 1"));
        assert!(result.acknowledgment.contains("Weekly"));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].label, "Weekly");
        assert_eq!(store.list()[0].query, "Past 7 days sales, Branch 1");
    }

    #[test]
    fn test_save_without_resolved_query_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ShortcutStore::open(dir.path()).unwrap();

        for last in [None, Some(""), Some("   ")] {
            let result = intercept("save as Weekly", last, &mut store).unwrap();
            assert!(result.acknowledgment.starts_with("⚠️"));
            assert!(result.saved.is_none());
        }
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_unmatched_text_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ShortcutStore::open(dir.path()).unwrap();
        assert!(intercept("Sales today", Some("x"), &mut store).is_none());
    }
}
