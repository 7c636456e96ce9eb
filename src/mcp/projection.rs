//! Flattened JSON shapes returned to MCP callers.

use crate::linear::{Comment, Issue, Team};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Row of `list_issues` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueListing {
    pub id: String,
    pub identifier: String,
    pub title: String,
    pub state: Option<String>,
    pub url: String,
}

impl From<&Issue> for IssueListing {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            identifier: issue.identifier.clone(),
            title: issue.title.clone(),
            state: issue.state.as_ref().map(|s| s.name.clone()),
            url: issue.url.clone(),
        }
    }
}

/// Row of `list_teams` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProjection {
    pub id: String,
    pub name: String,
    pub key: String,
}

impl From<&Team> for TeamProjection {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id.clone(),
            name: team.name.clone(),
            key: team.key.clone(),
        }
    }
}

/// Full issue snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueProjection {
    pub id: String,
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: f64,
    pub state: Option<String>,
    pub assignee: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Issue> for IssueProjection {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            identifier: issue.identifier.clone(),
            title: issue.title.clone(),
            description: issue.description.clone(),
            priority: issue.priority,
            state: issue.state.as_ref().map(|s| s.name.clone()),
            assignee: issue.assignee.as_ref().map(|a| a.name.clone()),
            url: issue.url.clone(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentProjection {
    pub id: String,
    pub body: String,
    pub url: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentProjection {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            body: comment.body.clone(),
            url: comment.url.clone(),
            author: comment.user.as_ref().map(|u| u.name.clone()),
            created_at: comment.created_at,
        }
    }
}

/// `search_issues` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub total: usize,
    pub issues: Vec<IssueProjection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::fixtures;

    #[test]
    fn test_issue_projection_is_camel_case() {
        let issue = fixtures::issue("issue-1", "Fix login", 10);
        let value = serde_json::to_value(IssueProjection::from(&issue)).unwrap();

        assert_eq!(value["state"], "Todo");
        assert_eq!(value["assignee"], "Ada Lovelace");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_listing_without_state() {
        let mut issue = fixtures::issue("issue-1", "Fix login", 10);
        issue.state = None;
        let listing = IssueListing::from(&issue);
        assert_eq!(listing.state, None);
        assert_eq!(listing.identifier, "ENG-1");
    }
}
