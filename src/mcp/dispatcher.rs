//! Routes `tools/call` requests onto Linear API operations.
//!
//! Every handler returns a [`Result`]; [`Dispatcher::call`] turns that into a
//! [`CallToolResult`], so tool failures always come back as `isError: true`
//! content and never as protocol errors.

use super::projection::{
    CommentProjection, IssueListing, IssueProjection, SearchResults, TeamProjection,
};
use super::tools::ToolName;
use crate::error::{LinearError, Result};
use crate::linear::{
    CaseSensitivity, CommentCreateInput, Issue, IssueCreateInput, IssueFilter, IssueSearch,
    IssueUpdateInput, LinearApi,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Result count used by `search_issues` when no limit is given.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Largest page Linear will return.
pub const MAX_SEARCH_LIMIT: u32 = 250;

/// Assignee alias for the authenticated user.
const SELF_ASSIGNEE: &str = "me";

/// Content item of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Envelope returned by `tools/call`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Pretty-printed JSON payload.
    pub fn json(value: &Value) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self {
                content: vec![Content::Text { text }],
                is_error: false,
            },
            Err(e) => Self::error(format!("Failed to serialize result: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Text of the first content item.
    pub fn text(&self) -> &str {
        match self.content.first() {
            Some(Content::Text { text }) => text.as_str(),
            None => "",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIssueArgs {
    title: String,
    description: Option<String>,
    assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateIssueArgs {
    issue_id: String,
    title: Option<String>,
    description: Option<String>,
    assignee: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentArgs {
    issue_id: String,
    body: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchIssuesArgs {
    query: Option<String>,
    team_id: Option<String>,
    status: Option<String>,
    assignee: Option<String>,
    priority: Option<u8>,
    include_archived: Option<bool>,
    limit: Option<u32>,
    case_sensitive: Option<bool>,
}

/// Check `arguments` against the tool schema and decode them.
fn parse_arguments<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(LinearError::Validation(format!(
                "Arguments for {} must be an object, got {}",
                tool, other
            )))
        }
    };

    for field in tool.required_arguments() {
        if arguments.get(&field).map_or(true, Value::is_null) {
            return Err(LinearError::Validation(format!(
                "Missing required argument '{}' for {}",
                field, tool
            )));
        }
    }

    serde_json::from_value(arguments).map_err(|e| {
        LinearError::Validation(format!("Invalid arguments for {}: {}", tool, e))
    })
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Tool dispatcher backed by a Linear API handle.
pub struct Dispatcher {
    api: Arc<dyn LinearApi>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn LinearApi>) -> Self {
        Self { api }
    }

    /// Run the named tool. Never fails: errors become `isError` results.
    pub async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = ToolName::parse(name) else {
            tracing::warn!("Unknown tool requested: {}", name);
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };

        tracing::debug!("Calling tool {}", tool);
        match self.dispatch(tool, arguments).await {
            Ok(value) => CallToolResult::json(&value),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", tool, e);
                CallToolResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, tool: ToolName, arguments: Value) -> Result<Value> {
        match tool {
            ToolName::ListIssues => to_value(self.list_issues().await?),
            ToolName::ListTeams => to_value(self.list_teams().await?),
            ToolName::CreateIssue => {
                to_value(self.create_issue(parse_arguments(tool, arguments)?).await?)
            }
            ToolName::UpdateIssue => {
                to_value(self.update_issue(parse_arguments(tool, arguments)?).await?)
            }
            ToolName::AddComment => {
                to_value(self.add_comment(parse_arguments(tool, arguments)?).await?)
            }
            ToolName::SearchIssues => {
                to_value(self.search_issues(parse_arguments(tool, arguments)?).await?)
            }
        }
    }

    async fn list_issues(&self) -> Result<Vec<IssueListing>> {
        let issues = self.api.assigned_issues().await?;
        Ok(issues.iter().map(IssueListing::from).collect())
    }

    async fn list_teams(&self) -> Result<Vec<TeamProjection>> {
        let teams = self.api.viewer_teams().await?;
        Ok(teams.iter().map(TeamProjection::from).collect())
    }

    async fn create_issue(&self, args: CreateIssueArgs) -> Result<IssueProjection> {
        let (teams, assignee_id) = match args.assignee.as_deref() {
            Some(SELF_ASSIGNEE) => {
                let (teams, viewer) = tokio::try_join!(self.api.viewer_teams(), self.api.viewer())?;
                (teams, Some(viewer.id))
            }
            Some(user_id) => (self.api.viewer_teams().await?, Some(user_id.to_string())),
            None => (self.api.viewer_teams().await?, None),
        };

        let team = teams.into_iter().next().ok_or(LinearError::NoTeam)?;

        let issue = self
            .api
            .create_issue(IssueCreateInput {
                team_id: team.id,
                title: args.title,
                description: args.description,
                assignee_id,
            })
            .await?;

        tracing::info!("Created issue {}", issue.identifier);
        Ok(IssueProjection::from(&issue))
    }

    async fn update_issue(&self, args: UpdateIssueArgs) -> Result<IssueProjection> {
        let issue = self.find_issue(&args.issue_id).await?;

        let assignee_id = match args.assignee {
            Some(assignee) => Some(self.resolve_assignee(assignee).await?),
            None => None,
        };
        let state_id = match args.status {
            Some(status) => Some(self.resolve_state(&issue, &status).await?),
            None => None,
        };

        let input = IssueUpdateInput {
            title: args.title,
            description: args.description,
            assignee_id,
            state_id,
        };

        if input.is_empty() {
            return Ok(IssueProjection::from(&issue));
        }

        let updated = self.api.update_issue(&issue.id, input).await?;
        tracing::info!("Updated issue {}", updated.identifier);
        Ok(IssueProjection::from(&updated))
    }

    async fn add_comment(&self, args: AddCommentArgs) -> Result<CommentProjection> {
        let issue = self.find_issue(&args.issue_id).await?;

        let comment = self
            .api
            .create_comment(CommentCreateInput {
                issue_id: issue.id,
                body: args.body,
            })
            .await?;

        Ok(CommentProjection::from(&comment))
    }

    async fn search_issues(&self, args: SearchIssuesArgs) -> Result<SearchResults> {
        let first = args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if first == 0 || first > MAX_SEARCH_LIMIT {
            return Err(LinearError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }
        if let Some(priority) = args.priority {
            if priority > 4 {
                return Err(LinearError::Validation(
                    "priority must be between 0 and 4".to_string(),
                ));
            }
        }

        let assignee_id = match args.assignee {
            Some(assignee) => Some(self.resolve_assignee(assignee).await?),
            None => None,
        };

        let filter = IssueFilter {
            text: args.query,
            case: if args.case_sensitive.unwrap_or(false) {
                CaseSensitivity::Sensitive
            } else {
                CaseSensitivity::Insensitive
            },
            team_id: args.team_id,
            state_name: args.status,
            assignee_id,
            priority: args.priority,
        };

        let mut issues = self
            .api
            .search_issues(IssueSearch {
                filter,
                first,
                include_archived: args.include_archived.unwrap_or(false),
            })
            .await?;
        issues.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(SearchResults {
            total: issues.len(),
            issues: issues.iter().map(IssueProjection::from).collect(),
        })
    }

    async fn find_issue(&self, id: &str) -> Result<Issue> {
        self.api
            .issue(id)
            .await?
            .ok_or_else(|| LinearError::NotFound(id.to_string()))
    }

    /// "me" becomes the viewer id; anything else is taken as a user id.
    async fn resolve_assignee(&self, assignee: String) -> Result<String> {
        if assignee == SELF_ASSIGNEE {
            Ok(self.api.viewer().await?.id)
        } else {
            Ok(assignee)
        }
    }

    /// Map a workflow state name to its id within the issue's team.
    async fn resolve_state(&self, issue: &Issue, status: &str) -> Result<String> {
        let team = issue.team.as_ref().ok_or_else(|| {
            LinearError::Validation(format!("Issue {} has no team", issue.identifier))
        })?;

        self.api
            .team_states(&team.id)
            .await?
            .into_iter()
            .find(|state| state.name.eq_ignore_ascii_case(status))
            .map(|state| state.id)
            .ok_or_else(|| {
                LinearError::Validation(format!(
                    "Unknown status '{}' for team {}",
                    status, team.key
                ))
            })
    }
}
