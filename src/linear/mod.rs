//! Linear API access.

mod client;
mod filter;


pub use client::LinearClient;
pub use filter::{CaseSensitivity, IssueFilter, IssueSearch};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A team the viewer belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub key: String,
}

/// A workflow state ("Todo", "In Progress", ...) of a team.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamRef {
    pub id: String,
    pub key: String,
}

/// An issue as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 0 = none, 1 = urgent, 2 = high, 3 = medium, 4 = low.
    pub priority: f64,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub state: Option<StateRef>,
    #[serde(default)]
    pub assignee: Option<UserRef>,
    #[serde(default)]
    pub team: Option<TeamRef>,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

/// Fields for `issueCreate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreateInput {
    pub team_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

/// Fields for `issueUpdate`. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
}

impl IssueUpdateInput {
    /// True when no field would be changed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fields for `commentCreate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreateInput {
    pub issue_id: String,
    pub body: String,
}

/// Operations the MCP layer needs from Linear.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinearApi: Send + Sync {
    /// The user the credential belongs to.
    async fn viewer(&self) -> Result<Viewer>;

    /// Teams the viewer belongs to.
    async fn viewer_teams(&self) -> Result<Vec<Team>>;

    /// Issues assigned to the viewer.
    async fn assigned_issues(&self) -> Result<Vec<Issue>>;

    /// Look up an issue by id or identifier (e.g. "ENG-123").
    async fn issue(&self, id: &str) -> Result<Option<Issue>>;

    /// Workflow states of a team.
    async fn team_states(&self, team_id: &str) -> Result<Vec<WorkflowState>>;

    /// Create an issue.
    async fn create_issue(&self, input: IssueCreateInput) -> Result<Issue>;

    /// Update an issue.
    async fn update_issue(&self, id: &str, input: IssueUpdateInput) -> Result<Issue>;

    /// Add a comment to an issue.
    async fn create_comment(&self, input: CommentCreateInput) -> Result<Comment>;

    /// Filtered issue search.
    async fn search_issues(&self, search: IssueSearch) -> Result<Vec<Issue>>;
}
