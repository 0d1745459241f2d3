//! Error taxonomy reported at the command-line boundary.

use thiserror::Error;

use crate::clients::{GarminError, GitHubError};

/// Every way an invocation can fail.
///
/// Transient collaborator failures never show up here directly: the clients
/// retry them and only surface what is left once retries are exhausted.
#[derive(Debug, Error)]
pub enum Error {
    /// A missing or malformed argument. Raised before any network call.
    #[error("invalid {field}: {reason}")]
    InputValidation { field: &'static str, reason: String },

    /// A required credential is not configured. Raised before any network call.
    #[error("missing credential: {0} environment variable is not set")]
    MissingCredential(&'static str),

    /// A credential was rejected by the remote service.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("issue #{issue} not found in repository {repository}; verify the issue number")]
    IssueNotFound { issue: u64, repository: String },

    /// Anything a collaborator reported that cannot be retried.
    #[error("{0}")]
    Collaborator(String),
}

impl Error {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InputValidation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<GitHubError> for Error {
    fn from(e: GitHubError) -> Self {
        match e {
            GitHubError::Unauthorized => {
                Self::Authentication("GitHub rejected GITHUB_TOKEN".to_string())
            }
            other => Self::Collaborator(format!("GitHub: {}", other)),
        }
    }
}

impl From<GarminError> for Error {
    fn from(e: GarminError) -> Self {
        match e {
            GarminError::Unauthorized => Self::Authentication(
                "Garmin Connect rejected GARMIN_ACCESS_TOKEN".to_string(),
            ),
            other => Self::Collaborator(format!("Garmin Connect: {}", other)),
        }
    }
}
