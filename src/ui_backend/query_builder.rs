//! Query builder: three dropdown-style selections collapsed into one query

use crate::core::BranchScope;

pub const METRIC_OPTIONS: [&str; 4] = [
    "Total sales",
    "Average sales",
    "Highest sales",
    "Lowest sales",
];

pub const PERIOD_OPTIONS: [&str; 5] = [
    "today",
    "yesterday",
    "this month",
    "past 3 months",
    "this year",
];

/// Which of the three selections a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderField {
    Metric,
    Period,
    Branch,
}

impl BuilderField {
    pub fn label(&self) -> &'static str {
        match self {
            BuilderField::Metric => "Metric",
            BuilderField::Period => "Period",
            BuilderField::Branch => "Branch",
        }
    }
}

/// Compose the canonical query, or `None` unless every part is non-empty
pub fn compose(metric: &str, period: &str, branch: &str) -> Option<String> {
    let (metric, period, branch) = (metric.trim(), period.trim(), branch.trim());
    if metric.is_empty() || period.is_empty() || branch.is_empty() {
        return None;
    }
    Some(format!("{} for {} in {}", metric, branch, period))
}

/// Branch choices offered to a session bound to `scope`
pub fn branch_options(scope: &BranchScope) -> Vec<String> {
    match scope {
        BranchScope::All => vec![
            "Branch 1".to_string(),
            "Branch 2".to_string(),
            BranchScope::All.label(),
        ],
        own => vec![own.label()],
    }
}

/// Current selections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    pub metric: String,
    pub period: String,
    pub branch: String,
}

impl QueryBuilder {
    pub fn get(&self, field: BuilderField) -> &str {
        match field {
            BuilderField::Metric => &self.metric,
            BuilderField::Period => &self.period,
            BuilderField::Branch => &self.branch,
        }
    }

    /// Record one selection, then try to complete.
    ///
    /// Returns the composed query when all three are set; the selections are
    /// reset in that case and left untouched otherwise.
    pub fn select(&mut self, field: BuilderField, value: &str) -> Option<String> {
        let slot = match field {
            BuilderField::Metric => &mut self.metric,
            BuilderField::Period => &mut self.period,
            BuilderField::Branch => &mut self.branch,
        };
        *slot = value.to_string();
        self.take_query()
    }

    /// Collapse complete selections into a query and reset
    pub fn take_query(&mut self) -> Option<String> {
        let query = compose(&self.metric, &self.period, &self.branch)?;
        *self = Self::default();
        Some(query)
    }

    pub fn is_empty(&self) -> bool {
        self.metric.is_empty() && self.period.is_empty() && self.branch.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_requires_all_parts() {
        assert_eq!(compose("Average sales", "", "Branch 1"), None);
        assert_eq!(compose("", "today", "Branch 1"), None);
        assert_eq!(compose("Average sales", "today", "  "), None);
        assert_eq!(
            compose("Average sales", "past 3 months", "Branch 1").as_deref(),
            Some("Average sales for Branch 1 in past 3 months")
        );
    }

    #[test]
    fn test_incomplete_selection_is_kept() {
        let mut builder = QueryBuilder::default();
        assert_eq!(builder.select(BuilderField::Metric, "Average sales"), None);
        assert_eq!(builder.select(BuilderField::Branch, "Branch 1"), None);
        assert_eq!(builder.select(BuilderField::Period, ""), None);

        assert_eq!(builder.metric, "Average sales");
        assert_eq!(builder.branch, "Branch 1");
        assert_eq!(builder.period, "");
    }

    #[test]
    fn test_complete_selection_resets() {
        let mut builder = QueryBuilder::default();
        builder.select(BuilderField::Metric, "Average sales");
        builder.select(BuilderField::Branch, "Branch 1");
        let query = builder.select(BuilderField::Period, "past 3 months");

        assert_eq!(
            query.as_deref(),
            Some("Average sales for Branch 1 in past 3 months")
        );
        assert!(builder.is_empty());
    }

    #[test]
    fn test_branch_options_follow_scope() {
        assert_eq!(
            branch_options(&BranchScope::Branch("2".into())),
            vec!["Branch 2".to_string()]
        );
        assert_eq!(branch_options(&BranchScope::All).len(), 3);
    }
}
