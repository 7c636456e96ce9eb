//! Issue search filters.
//!
//! Predicates combine conjunctively. The free-text predicate matches the title
//! OR the description. Text matching is case-insensitive unless
//! [`CaseSensitivity::Sensitive`] is requested.

use serde_json::{json, Map, Value};

/// How free text is compared against titles and descriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    /// Linear string comparator for substring matching.
    fn comparator(self) -> &'static str {
        match self {
            CaseSensitivity::Sensitive => "contains",
            CaseSensitivity::Insensitive => "containsIgnoreCase",
        }
    }
}

/// Conjunction of optional issue predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    pub text: Option<String>,
    pub case: CaseSensitivity,
    pub team_id: Option<String>,
    pub state_name: Option<String>,
    pub assignee_id: Option<String>,
    pub priority: Option<u8>,
}

impl IssueFilter {
    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.team_id.is_none()
            && self.state_name.is_none()
            && self.assignee_id.is_none()
            && self.priority.is_none()
    }

    /// Render as a Linear `IssueFilter` input object.
    pub fn to_graphql(&self) -> Value {
        let mut filter = Map::new();

        if let Some(text) = &self.text {
            let op = self.case.comparator();
            filter.insert(
                "or".to_string(),
                json!([
                    { "title": { op: text } },
                    { "description": { op: text } }
                ]),
            );
        }
        if let Some(team_id) = &self.team_id {
            filter.insert("team".to_string(), json!({ "id": { "eq": team_id } }));
        }
        if let Some(state) = &self.state_name {
            filter.insert("state".to_string(), json!({ "name": { "eq": state } }));
        }
        if let Some(assignee_id) = &self.assignee_id {
            filter.insert(
                "assignee".to_string(),
                json!({ "id": { "eq": assignee_id } }),
            );
        }
        if let Some(priority) = self.priority {
            filter.insert("priority".to_string(), json!({ "eq": priority }));
        }

        Value::Object(filter)
    }
}

/// A complete search request.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueSearch {
    pub filter: IssueFilter,
    /// Maximum number of results.
    pub first: u32,
    pub include_archived: bool,
}

impl IssueSearch {
    /// GraphQL variables for the search query.
    pub fn variables(&self) -> Value {
        json!({
            "filter": self.filter.to_graphql(),
            "first": self.first,
            "includeArchived": self.include_archived,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let filter = IssueFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.to_graphql(), json!({}));
    }

    #[test]
    fn test_text_is_title_or_description_ignoring_case() {
        let filter = IssueFilter {
            text: Some("auth".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.to_graphql(),
            json!({
                "or": [
                    { "title": { "containsIgnoreCase": "auth" } },
                    { "description": { "containsIgnoreCase": "auth" } }
                ]
            })
        );
    }

    #[test]
    fn test_text_case_sensitive() {
        let filter = IssueFilter {
            text: Some("Auth".to_string()),
            case: CaseSensitivity::Sensitive,
            ..Default::default()
        };
        assert_eq!(
            filter.to_graphql(),
            json!({
                "or": [
                    { "title": { "contains": "Auth" } },
                    { "description": { "contains": "Auth" } }
                ]
            })
        );
    }

    #[test]
    fn test_all_predicates() {
        let filter = IssueFilter {
            text: None,
            case: CaseSensitivity::Insensitive,
            team_id: Some("team-1".to_string()),
            state_name: Some("In Progress".to_string()),
            assignee_id: Some("user-1".to_string()),
            priority: Some(1),
        };
        assert!(!filter.is_empty());
        assert_eq!(
            filter.to_graphql(),
            json!({
                "team": { "id": { "eq": "team-1" } },
                "state": { "name": { "eq": "In Progress" } },
                "assignee": { "id": { "eq": "user-1" } },
                "priority": { "eq": 1 }
            })
        );
    }

    #[test]
    fn test_search_variables() {
        let search = IssueSearch {
            filter: IssueFilter::default(),
            first: 10,
            include_archived: true,
        };
        assert_eq!(
            search.variables(),
            json!({ "filter": {}, "first": 10, "includeArchived": true })
        );
    }
}
