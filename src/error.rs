//! Error types for linear-context.

use thiserror::Error;

/// Result type alias for linear-context.
pub type Result<T> = std::result::Result<T, LinearError>;

/// Errors raised while serving Linear data over MCP.
#[derive(Error, Debug)]
pub enum LinearError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// The API rejected the credential.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The API throttled the request.
    #[error("Rate limited by the Linear API")]
    RateLimited,

    /// GraphQL-level error returned by the API.
    #[error("Linear API error: {0}")]
    Api(String),

    /// Issue lookup by id returned nothing.
    #[error("Issue not found: {0}")]
    NotFound(String),

    /// The viewer belongs to no team, so there is nowhere to file an issue.
    #[error("No team found for the authenticated user")]
    NoTeam,

    /// Bad or missing arguments.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Resource URI with a scheme we do not serve.
    #[error("Unsupported resource type: {0}")]
    UnsupportedResource(String),

    /// JSON-RPC error returned by a peer.
    #[error("Protocol error ({code}): {message}")]
    Protocol { code: i32, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LinearError {
    /// JSON-RPC error code used when this error ends a request.
    pub fn rpc_code(&self) -> i32 {
        match self {
            LinearError::NotFound(_) => -32002,
            LinearError::Validation(_) | LinearError::UnsupportedResource(_) => -32602,
            LinearError::Protocol { code, .. } => *code,
            _ => -32603,
        }
    }
}

impl From<reqwest::Error> for LinearError {
    fn from(e: reqwest::Error) -> Self {
        LinearError::Network(e.to_string())
    }
}

impl From<toml::de::Error> for LinearError {
    fn from(e: toml::de::Error) -> Self {
        LinearError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for LinearError {
    fn from(e: serde_json::Error) -> Self {
        LinearError::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for LinearError {
    fn from(e: url::ParseError) -> Self {
        LinearError::Validation(format!("invalid resource URI: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_codes() {
        assert_eq!(LinearError::NotFound("x".into()).rpc_code(), -32002);
        assert_eq!(
            LinearError::UnsupportedResource("foo".into()).rpc_code(),
            -32602
        );
        assert_eq!(LinearError::RateLimited.rpc_code(), -32603);
    }

    #[test]
    fn test_not_found_names_id() {
        let err = LinearError::NotFound("missing-id".to_string());
        assert_eq!(err.to_string(), "Issue not found: missing-id");
    }
}
