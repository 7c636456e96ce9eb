//! MCP tool definitions.

use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Every tool the server exposes. Registry and dispatcher both match on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListIssues,
    ListTeams,
    CreateIssue,
    UpdateIssue,
    AddComment,
    SearchIssues,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::ListIssues,
        ToolName::ListTeams,
        ToolName::CreateIssue,
        ToolName::UpdateIssue,
        ToolName::AddComment,
        ToolName::SearchIssues,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::ListIssues => "list_issues",
            ToolName::ListTeams => "list_teams",
            ToolName::CreateIssue => "create_issue",
            ToolName::UpdateIssue => "update_issue",
            ToolName::AddComment => "add_comment",
            ToolName::SearchIssues => "search_issues",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Registry entry for this tool.
    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            ToolName::ListIssues => (
                "List all Linear issues assigned to me.",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
            ToolName::ListTeams => (
                "List all Linear teams I have access to.",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
            ToolName::CreateIssue => (
                "Create a new Linear issue in my first team.",
                json!({
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "description": "Issue title" },
                        "description": {
                            "type": "string",
                            "description": "Issue description (markdown)"
                        },
                        "assignee": {
                            "type": "string",
                            "description": "User id to assign, or 'me' to assign to self"
                        }
                    },
                    "required": ["title"]
                }),
            ),
            ToolName::UpdateIssue => (
                "Update an existing Linear issue. Only the provided fields are changed.",
                json!({
                    "type": "object",
                    "properties": {
                        "issueId": {
                            "type": "string",
                            "description": "Issue id or identifier (e.g. ENG-123)"
                        },
                        "title": { "type": "string", "description": "New title" },
                        "description": {
                            "type": "string",
                            "description": "New description (markdown)"
                        },
                        "assignee": {
                            "type": "string",
                            "description": "User id to assign, or 'me' to assign to self"
                        },
                        "status": {
                            "type": "string",
                            "description": "Workflow state name (e.g. 'In Progress')"
                        }
                    },
                    "required": ["issueId"]
                }),
            ),
            ToolName::AddComment => (
                "Add a comment to a Linear issue.",
                json!({
                    "type": "object",
                    "properties": {
                        "issueId": {
                            "type": "string",
                            "description": "Issue id or identifier (e.g. ENG-123)"
                        },
                        "body": { "type": "string", "description": "Comment text (markdown)" }
                    },
                    "required": ["issueId", "body"]
                }),
            ),
            ToolName::SearchIssues => (
                "Search Linear issues. All filters are optional and combined with AND; \
                 results are ordered by most recently updated.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Text to find in the title or description"
                        },
                        "teamId": { "type": "string", "description": "Only issues of this team" },
                        "status": {
                            "type": "string",
                            "description": "Workflow state name (e.g. 'Todo')"
                        },
                        "assignee": {
                            "type": "string",
                            "description": "User id, or 'me' for my issues"
                        },
                        "priority": {
                            "type": "integer",
                            "description": "0 = none, 1 = urgent, 2 = high, 3 = medium, 4 = low",
                            "minimum": 0,
                            "maximum": 4
                        },
                        "includeArchived": {
                            "type": "boolean",
                            "description": "Include archived issues",
                            "default": false
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of results",
                            "default": 10,
                            "minimum": 1,
                            "maximum": 250
                        },
                        "caseSensitive": {
                            "type": "boolean",
                            "description": "Match query text case-sensitively",
                            "default": false
                        }
                    },
                    "required": []
                }),
            ),
        };

        ToolDefinition {
            name: self.as_str().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }

    /// Names listed under `required` in the input schema.
    pub fn required_arguments(self) -> Vec<String> {
        self.definition()
            .input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Parameter names declared by the schema.
    pub fn parameters(&self) -> Vec<&str> {
        self.input_schema
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Get all available MCP tools.
pub fn get_tools() -> Vec<ToolDefinition> {
    ToolName::ALL.into_iter().map(ToolName::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = get_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), ToolName::ALL.len());
    }

    #[test]
    fn test_parse_roundtrips_every_name() {
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
        assert_eq!(ToolName::parse("create_note"), None);
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(ToolName::CreateIssue.required_arguments(), vec!["title"]);
        assert_eq!(
            ToolName::AddComment.required_arguments(),
            vec!["issueId", "body"]
        );
        assert!(ToolName::SearchIssues.required_arguments().is_empty());
    }

    #[test]
    fn test_required_fields_are_declared_properties() {
        for tool in get_tools() {
            let params = tool.parameters();
            for field in ToolName::parse(&tool.name).unwrap().required_arguments() {
                assert!(params.contains(&field.as_str()), "{} lacks {}", tool.name, field);
            }
        }
    }

    #[test]
    fn test_serializes_input_schema_key() {
        let value = serde_json::to_value(ToolName::ListTeams.definition()).unwrap();
        assert_eq!(value["name"], "list_teams");
        assert!(value.get("inputSchema").is_some());
    }
}
