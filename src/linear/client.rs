//! GraphQL client for the Linear API.

use super::{
    Comment, CommentCreateInput, Issue, IssueCreateInput, IssueSearch, IssueUpdateInput,
    LinearApi, Team, Viewer, WorkflowState,
};
use crate::error::{LinearError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const ISSUE_FRAGMENT: &str = r#"
fragment IssueFields on Issue {
  id identifier title description priority url createdAt updatedAt
  state { id name }
  assignee { id name }
  team { id key }
}"#;

const VIEWER_QUERY: &str = "query Viewer { viewer { id name displayName email } }";

const VIEWER_TEAMS_QUERY: &str = "query ViewerTeams { viewer { teams { nodes { id name key } } } }";

const ASSIGNED_ISSUES_QUERY: &str =
    "query AssignedIssues { viewer { assignedIssues { nodes { ...IssueFields } } } }";

const ISSUE_QUERY: &str = "query Issue($id: String!) { issue(id: $id) { ...IssueFields } }";

const TEAM_STATES_QUERY: &str =
    "query TeamStates($id: String!) { team(id: $id) { states { nodes { id name type } } } }";

const ISSUE_CREATE_MUTATION: &str = "mutation IssueCreate($input: IssueCreateInput!) { \
     issueCreate(input: $input) { success issue { ...IssueFields } } }";

const ISSUE_UPDATE_MUTATION: &str = "mutation IssueUpdate($id: String!, $input: IssueUpdateInput!) { \
     issueUpdate(id: $id, input: $input) { success issue { ...IssueFields } } }";

const COMMENT_CREATE_MUTATION: &str = "mutation CommentCreate($input: CommentCreateInput!) { \
     commentCreate(input: $input) { success comment { id body url createdAt user { id name } } } }";

const SEARCH_ISSUES_QUERY: &str =
    "query SearchIssues($filter: IssueFilter, $first: Int, $includeArchived: Boolean) { \
     issues(filter: $filter, first: $first, includeArchived: $includeArchived, orderBy: updatedAt) { \
     nodes { ...IssueFields } } }";

/// Prefix of the GraphQL error Linear returns for unknown ids.
const ENTITY_NOT_FOUND: &str = "Entity not found";

/// Linear GraphQL client.
pub struct LinearClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Debug, Deserialize)]
struct ViewerTeamsData {
    viewer: ViewerTeams,
}

#[derive(Debug, Deserialize)]
struct ViewerTeams {
    teams: Connection<Team>,
}

#[derive(Debug, Deserialize)]
struct AssignedIssuesData {
    viewer: ViewerAssigned,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewerAssigned {
    assigned_issues: Connection<Issue>,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    issue: Option<Issue>,
}

#[derive(Debug, Deserialize)]
struct TeamStatesData {
    team: Option<TeamStates>,
}

#[derive(Debug, Deserialize)]
struct TeamStates {
    states: Connection<WorkflowState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateData {
    issue_create: IssuePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueUpdateData {
    issue_update: IssuePayload,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    success: bool,
    issue: Option<Issue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentCreateData {
    comment_create: CommentPayload,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    success: bool,
    comment: Option<Comment>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    issues: Connection<Issue>,
}

impl LinearClient {
    /// Create a client for the given GraphQL endpoint.
    pub fn with_base_url(api_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
        }
    }

    /// Run a GraphQL operation and decode its `data`.
    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let document = if query.contains("...IssueFields") {
            format!("{}\n{}", query, ISSUE_FRAGMENT)
        } else {
            query.to_string()
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .json(&GraphQlRequest {
                query: &document,
                variables,
            })
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LinearError::Auth(format!("HTTP {}", status)));
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(LinearError::RateLimited),
            _ => {}
        }

        let text = response.text().await?;
        let body: GraphQlResponse<T> = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(LinearError::Api(format!("HTTP {}", status)));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = body.errors.first() {
            return Err(LinearError::Api(error.message.clone()));
        }

        body.data
            .ok_or_else(|| LinearError::Api("Response contained no data".to_string()))
    }
}

fn unwrap_payload<T>(success: bool, entity: Option<T>, what: &str) -> Result<T> {
    match (success, entity) {
        (true, Some(entity)) => Ok(entity),
        _ => Err(LinearError::Api(format!("{} was not successful", what))),
    }
}

#[async_trait]
impl LinearApi for LinearClient {
    async fn viewer(&self) -> Result<Viewer> {
        let data: ViewerData = self.execute(VIEWER_QUERY, json!({})).await?;
        Ok(data.viewer)
    }

    async fn viewer_teams(&self) -> Result<Vec<Team>> {
        let data: ViewerTeamsData = self.execute(VIEWER_TEAMS_QUERY, json!({})).await?;
        Ok(data.viewer.teams.nodes)
    }

    async fn assigned_issues(&self) -> Result<Vec<Issue>> {
        let data: AssignedIssuesData = self.execute(ASSIGNED_ISSUES_QUERY, json!({})).await?;
        Ok(data.viewer.assigned_issues.nodes)
    }

    async fn issue(&self, id: &str) -> Result<Option<Issue>> {
        // Linear reports unknown ids as "Entity not found: Issue" rather than a null issue.
        match self
            .execute::<IssueData>(ISSUE_QUERY, json!({ "id": id }))
            .await
        {
            Ok(data) => Ok(data.issue),
            Err(LinearError::Api(message)) if message.starts_with(ENTITY_NOT_FOUND) => {
                tracing::debug!("Issue {} not found: {}", id, message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn team_states(&self, team_id: &str) -> Result<Vec<WorkflowState>> {
        let data: TeamStatesData = self
            .execute(TEAM_STATES_QUERY, json!({ "id": team_id }))
            .await?;
        Ok(data.team.map(|t| t.states.nodes).unwrap_or_default())
    }

    async fn create_issue(&self, input: IssueCreateInput) -> Result<Issue> {
        let data: IssueCreateData = self
            .execute(ISSUE_CREATE_MUTATION, json!({ "input": input }))
            .await?;
        unwrap_payload(data.issue_create.success, data.issue_create.issue, "issueCreate")
    }

    async fn update_issue(&self, id: &str, input: IssueUpdateInput) -> Result<Issue> {
        let data: IssueUpdateData = self
            .execute(ISSUE_UPDATE_MUTATION, json!({ "id": id, "input": input }))
            .await?;
        unwrap_payload(data.issue_update.success, data.issue_update.issue, "issueUpdate")
    }

    async fn create_comment(&self, input: CommentCreateInput) -> Result<Comment> {
        let data: CommentCreateData = self
            .execute(COMMENT_CREATE_MUTATION, json!({ "input": input }))
            .await?;
        unwrap_payload(
            data.comment_create.success,
            data.comment_create.comment,
            "commentCreate",
        )
    }

    async fn search_issues(&self, search: IssueSearch) -> Result<Vec<Issue>> {
        tracing::debug!(
            "Searching issues (first={}, archived={})",
            search.first,
            search.include_archived
        );
        let data: SearchData = self
            .execute(SEARCH_ISSUES_QUERY, search.variables())
            .await?;
        Ok(data.issues.nodes)
    }
}
