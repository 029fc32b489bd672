//! Source connection resolution from request-scoped preview data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Branch used when preview data names a fork but no branch.
pub const DEFAULT_BRANCH: &str = "master";

/// Preview data carried by an editing session.
///
/// Set by the authentication flow once the viewer has a fork to edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewData {
    /// Repository to read from and write to, as `owner/name`
    pub fork_full_name: String,

    /// Branch in that repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_branch: Option<String>,

    /// Access token for the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_access_token: Option<String>,
}

/// An opaque reference to a repository credential.
///
/// Never printed and never serialized into page props.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building an authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Where content is read from for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConnection {
    /// The content directory the site was deployed with
    Local,

    /// A repository on the content host
    Remote {
        repository: String,
        branch: String,
        #[serde(skip_serializing)]
        credential: Option<Credential>,
    },
}

impl SourceConnection {
    /// Derive the connection from a request's preview data.
    ///
    /// No preview data, or preview data without a repository, reads the
    /// deployed content.
    pub fn from_preview(preview: Option<&PreviewData>) -> Self {
        let Some(preview) = preview else {
            return Self::Local;
        };

        let repository = preview.fork_full_name.trim();
        if repository.is_empty() {
            return Self::Local;
        }

        let branch = preview
            .head_branch
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BRANCH);

        Self::Remote {
            repository: repository.to_string(),
            branch: branch.to_string(),
            credential: preview
                .github_access_token
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(Credential::new),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Display for SourceConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("the local content directory"),
            Self::Remote {
                repository, branch, ..
            } => write!(f, "{}@{}", repository, branch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(fork: &str, branch: Option<&str>, token: Option<&str>) -> PreviewData {
        PreviewData {
            fork_full_name: fork.to_string(),
            head_branch: branch.map(String::from),
            github_access_token: token.map(String::from),
        }
    }

    #[test]
    fn no_preview_reads_local_content() {
        assert_eq!(SourceConnection::from_preview(None), SourceConnection::Local);
    }

    #[test]
    fn empty_fork_reads_local_content() {
        let data = preview("  ", Some("main"), Some("t"));

        assert_eq!(
            SourceConnection::from_preview(Some(&data)),
            SourceConnection::Local
        );
    }

    #[test]
    fn preview_resolves_to_remote_repository() {
        let data = preview("alice/site", Some("edits"), Some("secret"));

        let conn = SourceConnection::from_preview(Some(&data));

        assert_eq!(
            conn,
            SourceConnection::Remote {
                repository: "alice/site".to_string(),
                branch: "edits".to_string(),
                credential: Some(Credential::new("secret")),
            }
        );
        assert_eq!(conn.to_string(), "alice/site@edits");
    }

    #[test]
    fn missing_branch_defaults_to_master() {
        let data = preview("alice/site", None, None);

        match SourceConnection::from_preview(Some(&data)) {
            SourceConnection::Remote {
                branch, credential, ..
            } => {
                assert_eq!(branch, DEFAULT_BRANCH);
                assert!(credential.is_none());
            }
            other => panic!("expected remote connection, got {:?}", other),
        }
    }

    #[test]
    fn credential_is_never_serialized_or_printed() {
        let data = preview("alice/site", Some("main"), Some("secret"));
        let conn = SourceConnection::from_preview(Some(&data));

        let json = serde_json::to_string(&conn).unwrap();
        let debug = format!("{:?}", conn);

        assert!(!json.contains("secret"));
        assert!(!debug.contains("secret"));
        assert!(json.contains("\"kind\":\"remote\""));
    }
}
