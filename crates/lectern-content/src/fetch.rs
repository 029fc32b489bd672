//! Content fetcher: resolves a source for a connection and parses what it reads.

use std::sync::Arc;

use crate::connection::SourceConnection;
use crate::document::{ContentFile, JsonFile, MarkdownData, MarkdownFile};
use crate::error::ContentError;
use crate::source::{RawFile, SourceProvider, WriteReceipt, WriteRequest};

/// Fetches JSON and Markdown content over any connection.
#[derive(Clone)]
pub struct ContentFetcher {
    provider: Arc<dyn SourceProvider>,
}

impl ContentFetcher {
    pub fn new(provider: impl SourceProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    async fn read(&self, path: &str, connection: &SourceConnection) -> Result<RawFile, ContentError> {
        let source = self.provider.source_for(connection);

        tracing::debug!("Fetching {} via {} ({})", path, source.name(), connection);

        source.read(path).await
    }

    /// Fetch and parse a JSON document.
    pub async fn fetch_json(
        &self,
        path: &str,
        connection: &SourceConnection,
    ) -> Result<JsonFile, ContentError> {
        let raw = self.read(path, connection).await?;

        let data = serde_json::from_str(&raw.contents).map_err(|e| ContentError::Json {
            path: raw.path.clone(),
            source: e,
        })?;

        Ok(ContentFile {
            file_relative_path: raw.path,
            sha: raw.sha,
            data,
        })
    }

    /// Fetch a Markdown document and parse its frontmatter.
    pub async fn fetch_markdown(
        &self,
        path: &str,
        connection: &SourceConnection,
    ) -> Result<MarkdownFile, ContentError> {
        let raw = self.read(path, connection).await?;

        let data = MarkdownData::parse(&raw.contents).map_err(|e| ContentError::Markdown {
            path: raw.path.clone(),
            source: e,
        })?;

        Ok(ContentFile {
            file_relative_path: raw.path,
            sha: raw.sha,
            data,
        })
    }

    /// Persist a file through the connection.
    pub async fn save(
        &self,
        request: &WriteRequest,
        connection: &SourceConnection,
    ) -> Result<WriteReceipt, ContentError> {
        let source = self.provider.source_for(connection);

        tracing::info!("Saving {} via {} ({})", request.path, source.name(), connection);

        source.write(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use crate::source::FixedSourceProvider;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fetcher(source: MemorySource) -> (ContentFetcher, Arc<MemorySource>) {
        let source = Arc::new(source);
        let fetcher = ContentFetcher::new(FixedSourceProvider(source.clone()));
        (fetcher, source)
    }

    #[tokio::test]
    async fn fetches_json() {
        let (fetcher, _) = fetcher(
            MemorySource::new().with_file("content/pages/home.json", r#"{"headline":"Hi"}"#),
        );

        let file = fetcher
            .fetch_json("content/pages/home.json", &SourceConnection::Local)
            .await
            .unwrap();

        assert_eq!(file.data, json!({ "headline": "Hi" }));
        assert_eq!(file.file_relative_path, "content/pages/home.json");
        assert_eq!(file.sha.as_deref(), Some("mem-1"));
    }

    #[tokio::test]
    async fn fetches_markdown() {
        let (fetcher, _) = fetcher(
            MemorySource::new().with_file("content/docs/intro.md", "---\ntitle: Intro\n---\nHello"),
        );

        let file = fetcher
            .fetch_markdown("content/docs/intro.md", &SourceConnection::Local)
            .await
            .unwrap();

        assert_eq!(file.data.frontmatter.title.as_deref(), Some("Intro"));
        assert_eq!(file.data.markdown_body, "Hello");
    }

    #[tokio::test]
    async fn both_shapes_report_not_found() {
        let (fetcher, _) = fetcher(MemorySource::new());

        let json = fetcher
            .fetch_json("content/x.json", &SourceConnection::Local)
            .await
            .unwrap_err();
        let markdown = fetcher
            .fetch_markdown("content/x.md", &SourceConnection::Local)
            .await
            .unwrap_err();

        assert!(json.is_not_found());
        assert!(markdown.is_not_found());
    }

    #[tokio::test]
    async fn parse_failures_are_distinct_from_not_found() {
        let (fetcher, _) = fetcher(
            MemorySource::new()
                .with_file("content/bad.json", "{ nope")
                .with_file("content/bad.md", "---\ntitle: x\n"),
        );

        let json = fetcher
            .fetch_json("content/bad.json", &SourceConnection::Local)
            .await
            .unwrap_err();
        let markdown = fetcher
            .fetch_markdown("content/bad.md", &SourceConnection::Local)
            .await
            .unwrap_err();

        assert!(matches!(json, ContentError::Json { .. }));
        assert!(matches!(markdown, ContentError::Markdown { .. }));
    }

    #[tokio::test]
    async fn saves_through_connection() {
        let (fetcher, source) = fetcher(MemorySource::new());

        fetcher
            .save(
                &WriteRequest {
                    path: "content/pages/home.json".to_string(),
                    contents: "{}".to_string(),
                    sha: None,
                    message: "Create home".to_string(),
                },
                &SourceConnection::Local,
            )
            .await
            .unwrap();

        assert_eq!(source.get("content/pages/home.json").as_deref(), Some("{}"));
    }
}
