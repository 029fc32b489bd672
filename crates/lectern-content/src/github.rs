//! Content read from a GitHub repository through the contents API.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::connection::Credential;
use crate::error::ContentError;
use crate::source::{validate_path, ContentSource, RawFile, WriteReceipt, WriteRequest};

/// Public GitHub API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// One branch of one repository on GitHub.
#[derive(Debug, Clone)]
pub struct GithubSource {
    client: Client,
    api_base: String,
    repository: String,
    branch: String,
    credential: Option<Credential>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: Option<CommittedContent>,
}

#[derive(Debug, Deserialize)]
struct CommittedContent {
    sha: String,
}

impl GithubSource {
    pub fn new(
        client: Client,
        api_base: &str,
        repository: &str,
        branch: &str,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            branch: branch.to_string(),
            credential,
        }
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base, self.repository, path
        )
    }

    fn location(&self) -> String {
        format!("{}@{}", self.repository, self.branch)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "lectern");

        match &self.credential {
            Some(credential) => request.bearer_auth(credential.expose()),
            None => request,
        }
    }

    async fn api_error(path: &str, response: reqwest::Response) -> ContentError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        ContentError::Api {
            status,
            path: path.to_string(),
            message,
        }
    }
}

/// Decode a base64 body as returned by the contents API (wrapped at 60 columns).
fn decode_content(path: &str, content: &str) -> Result<String, ContentError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ContentError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    String::from_utf8(bytes).map_err(|e| ContentError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl ContentSource for GithubSource {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn read(&self, path: &str) -> Result<RawFile, ContentError> {
        let path = validate_path(path)?;

        tracing::debug!("Fetching {} from {}", path, self.location());

        let response = self
            .authorize(self.client.get(self.contents_url(path)))
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ContentError::not_found(path, self.location()));
        }
        if !response.status().is_success() {
            return Err(Self::api_error(path, response).await);
        }

        let body: ContentsResponse = response.json().await?;

        if body.encoding != "base64" {
            return Err(ContentError::Decode {
                path: path.to_string(),
                message: format!("unsupported encoding '{}'", body.encoding),
            });
        }

        Ok(RawFile {
            path: path.to_string(),
            sha: Some(body.sha),
            contents: decode_content(path, &body.content)?,
        })
    }

    async fn write(&self, request: &WriteRequest) -> Result<WriteReceipt, ContentError> {
        let path = validate_path(&request.path)?;

        let body = PutContentsRequest {
            message: &request.message,
            content: STANDARD.encode(request.contents.as_bytes()),
            branch: &self.branch,
            sha: request.sha.as_deref(),
        };

        let response = self
            .authorize(self.client.put(self.contents_url(path)))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(path, response).await);
        }

        let committed: PutContentsResponse = response.json().await?;

        tracing::info!("Committed {} to {}", path, self.location());

        Ok(WriteReceipt {
            sha: committed.content.map(|c| c.sha),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer, credential: Option<&str>) -> GithubSource {
        GithubSource::new(
            Client::new(),
            &server.uri(),
            "alice/site",
            "edits",
            credential.map(Credential::new),
        )
    }

    #[tokio::test]
    async fn reads_and_decodes_file() {
        let server = MockServer::start().await;
        // Wrapped like the real API
        let encoded = STANDARD.encode(r#"{"headline":"Hello"}"#);
        let wrapped = format!("{}\n{}", &encoded[..10], &encoded[10..]);

        Mock::given(method("GET"))
            .and(path("/repos/alice/site/contents/content/pages/home.json"))
            .and(query_param("ref", "edits"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "abc123",
                "content": wrapped,
                "encoding": "base64",
            })))
            .mount(&server)
            .await;

        let file = source(&server, Some("secret"))
            .read("content/pages/home.json")
            .await
            .unwrap();

        assert_eq!(file.contents, r#"{"headline":"Hello"}"#);
        assert_eq!(file.sha.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn maps_404_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source(&server, None)
            .read("content/pages/home.json")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("alice/site@edits"));
    }

    #[tokio::test]
    async fn other_statuses_are_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = source(&server, Some("expired"))
            .read("content/pages/home.json")
            .await
            .unwrap_err();

        match err {
            ContentError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn writes_commit_to_branch() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/repos/alice/site/contents/content/docs/intro.md"))
            .and(body_partial_json(json!({
                "message": "Update intro",
                "branch": "edits",
                "sha": "old",
                "content": STANDARD.encode("# Intro"),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": { "sha": "new" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = source(&server, Some("secret"))
            .write(&WriteRequest {
                path: "content/docs/intro.md".to_string(),
                contents: "# Intro".to_string(),
                sha: Some("old".to_string()),
                message: "Update intro".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sha.as_deref(), Some("new"));
    }

    #[test]
    fn rejects_non_utf8_content() {
        let encoded = STANDARD.encode([0xff, 0xfe]);
        let err = decode_content("x.md", &encoded).unwrap_err();
        assert!(matches!(err, ContentError::Decode { .. }));
    }
}
