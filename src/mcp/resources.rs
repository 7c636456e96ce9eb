//! Issue resources (`issue://<issueId>`).

use super::projection::IssueProjection;
use crate::error::{LinearError, Result};
use crate::linear::LinearApi;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

pub const ISSUE_SCHEME: &str = "issue";

const JSON_MIME: &str = "application/json";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Issue(String),
}

impl ResourceRef {
    /// Parse a resource URI. The issue id is taken from the host, or from the
    /// path when the host is empty (`issue:///ENG-1`).
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri)?;

        if url.scheme() != ISSUE_SCHEME {
            return Err(LinearError::UnsupportedResource(url.scheme().to_string()));
        }

        let id = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => url.path().trim_start_matches('/').to_string(),
        };

        if id.is_empty() {
            return Err(LinearError::Validation(format!(
                "Resource URI has no issue id: {}",
                uri
            )));
        }

        Ok(ResourceRef::Issue(id))
    }

    pub fn uri(&self) -> String {
        match self {
            ResourceRef::Issue(id) => format!("{}://{}", ISSUE_SCHEME, id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Templates advertised by `resources/templates/list`.
pub fn resource_templates() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate {
        uri_template: format!("{}://{{issueId}}", ISSUE_SCHEME),
        name: "Linear issue".to_string(),
        description: "A single Linear issue by id or identifier".to_string(),
        mime_type: JSON_MIME.to_string(),
    }]
}

/// Resolves issue resources against the Linear API.
pub struct ResourceReader {
    api: Arc<dyn LinearApi>,
}

impl ResourceReader {
    pub fn new(api: Arc<dyn LinearApi>) -> Self {
        Self { api }
    }

    /// One resource per issue assigned to the viewer.
    pub async fn list(&self) -> Result<Vec<ResourceDescriptor>> {
        let issues = self.api.assigned_issues().await?;

        Ok(issues
            .iter()
            .map(|issue| ResourceDescriptor {
                uri: ResourceRef::Issue(issue.id.clone()).uri(),
                name: format!("{}: {}", issue.identifier, issue.title),
                description: issue.state.as_ref().map(|s| s.name.clone()),
                mime_type: JSON_MIME.to_string(),
            })
            .collect())
    }

    /// Fetch the issue behind `uri`.
    pub async fn read(&self, uri: &str) -> Result<ResourceContents> {
        let ResourceRef::Issue(id) = ResourceRef::parse(uri)?;

        let issue = self
            .api
            .issue(&id)
            .await?
            .ok_or_else(|| LinearError::NotFound(id.clone()))?;

        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: JSON_MIME.to_string(),
            text: serde_json::to_string_pretty(&IssueProjection::from(&issue))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::{fixtures, MockLinearApi};

    fn reader(mock: MockLinearApi) -> ResourceReader {
        ResourceReader::new(Arc::new(mock))
    }

    #[test]
    fn test_parse_host_form() {
        assert_eq!(
            ResourceRef::parse("issue://ENG-123").unwrap(),
            ResourceRef::Issue("ENG-123".to_string())
        );
    }

    #[test]
    fn test_parse_path_form() {
        assert_eq!(
            ResourceRef::parse("issue:///missing-id").unwrap(),
            ResourceRef::Issue("missing-id".to_string())
        );
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        let err = ResourceRef::parse("foo://x").unwrap_err();
        assert!(matches!(err, LinearError::UnsupportedResource(ref s) if s == "foo"));
        assert_eq!(err.to_string(), "Unsupported resource type: foo");
    }

    #[test]
    fn test_parse_invalid_uri() {
        assert!(matches!(
            ResourceRef::parse("not a uri"),
            Err(LinearError::Validation(_))
        ));
        assert!(matches!(
            ResourceRef::parse("issue://"),
            Err(LinearError::Validation(_))
        ));
    }

    #[test]
    fn test_template_uri() {
        assert_eq!(resource_templates()[0].uri_template, "issue://{issueId}");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let mut mock = MockLinearApi::new();
        mock.expect_assigned_issues().returning(|| Ok(vec![]));

        let resources = reader(mock).list().await.unwrap();
        assert!(resources.is_empty());
    }

    #[tokio::test]
    async fn test_list_assigned() {
        let mut mock = MockLinearApi::new();
        mock.expect_assigned_issues()
            .returning(|| Ok(vec![fixtures::issue("issue-1", "Fix login", 10)]));

        let resources = reader(mock).list().await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].uri, "issue://issue-1");
        assert_eq!(resources[0].name, "ENG-1: Fix login");
        assert_eq!(resources[0].mime_type, "application/json");
    }

    #[tokio::test]
    async fn test_read_unsupported_scheme_does_not_call_api() {
        let mut mock = MockLinearApi::new();
        mock.expect_issue().never();

        let err = reader(mock).read("foo://x").await.unwrap_err();
        assert!(matches!(err, LinearError::UnsupportedResource(_)));
    }

    #[tokio::test]
    async fn test_read_missing_issue() {
        let mut mock = MockLinearApi::new();
        mock.expect_issue()
            .withf(|id| id == "missing-id")
            .returning(|_| Ok(None));

        let err = reader(mock).read("issue:///missing-id").await.unwrap_err();
        assert!(matches!(err, LinearError::NotFound(ref id) if id == "missing-id"));
        assert!(err.to_string().contains("missing-id"));
    }

    #[tokio::test]
    async fn test_read_issue() {
        let mut mock = MockLinearApi::new();
        mock.expect_issue()
            .withf(|id| id == "issue-1")
            .returning(|_| Ok(Some(fixtures::issue("issue-1", "Fix login", 10))));

        let contents = reader(mock).read("issue://issue-1").await.unwrap();
        assert_eq!(contents.uri, "issue://issue-1");
        let value: serde_json::Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(value["identifier"], "ENG-1");
        assert_eq!(value["state"], "Todo");
    }
}
