//! Page data loaders.
//!
//! A loader turns a request's preview context into the props a page renders
//! from. Loaders never touch the response; the HTTP layer decides how a
//! failure is shown.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use lectern_content::{
    ContentError, ContentFetcher, JsonFile, MarkdownFile, PreviewData, SourceConnection,
};

/// Home page document.
pub const HOME_PATH: &str = "content/pages/home.json";

/// Table of contents shared by all docs.
pub const DOCS_TOC_PATH: &str = "content/toc-doc.json";

/// Request context a loader sees.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Whether the viewer is in preview (edit) mode
    pub preview: bool,
    pub preview_data: Option<PreviewData>,
    /// Query parameters of the page URL
    pub query: HashMap<String, String>,
}

impl PageRequest {
    /// A request with the given preview data.
    ///
    /// Only data naming a fork puts the viewer in preview mode. Anything that
    /// resolves to the local source is read-only.
    pub fn with_preview(preview_data: Option<PreviewData>) -> Self {
        Self {
            preview: SourceConnection::from_preview(preview_data.as_ref()).is_remote(),
            preview_data,
            query: HashMap::new(),
        }
    }

    pub fn connection(&self) -> SourceConnection {
        SourceConnection::from_preview(self.preview_data.as_ref())
    }
}

/// Errors from loading page data.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Invalid doc slug '{0}'")]
    InvalidSlug(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl LoaderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Content(e) if e.is_not_found())
    }

    /// A path, such as a `next` reference, that escapes the content root.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::Content(ContentError::InvalidPath(_)))
    }
}

/// Props for the home page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeProps {
    /// The home document, or `{}` when it could not be found
    #[serde(serialize_with = "file_or_empty")]
    pub home: Option<JsonFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_error: Option<String>,
    pub source_provider_connection: SourceConnection,
    pub edit_mode: bool,
}

fn file_or_empty<S: Serializer>(file: &Option<JsonFile>, serializer: S) -> Result<S::Ok, S::Error> {
    match file {
        Some(file) => file.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// A neighbouring doc. Both fields are absent when the doc has no such neighbour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Props for a documentation page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocProps {
    pub markdown_file: MarkdownFile,
    pub source_provider_connection: SourceConnection,
    pub edit_mode: bool,
    pub docs_nav: Value,
    pub next_page: NavLink,
    pub prev_page: NavLink,
}

/// Load the home page.
///
/// A missing home document is not an error: the page renders empty with a
/// `preview_error` explaining where the content was looked for.
pub async fn load_home(
    fetcher: &ContentFetcher,
    request: &PageRequest,
) -> Result<HomeProps, LoaderError> {
    let connection = request.connection();

    let (home, preview_error) = match fetcher.fetch_json(HOME_PATH, &connection).await {
        Ok(file) => (Some(file), None),
        Err(e) if e.is_not_found() => {
            tracing::warn!("{}", e);
            (None, Some(e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HomeProps {
        home,
        preview_error,
        source_provider_connection: connection,
        edit_mode: request.preview,
    })
}

/// Load a documentation page and its neighbours.
///
/// Fetches run one after another: the doc, the table of contents, then the
/// `next` and `prev` docs named in the frontmatter. Any failure, including a
/// missing doc, is returned as is.
pub async fn load_doc(
    fetcher: &ContentFetcher,
    request: &PageRequest,
    slug: &str,
) -> Result<DocProps, LoaderError> {
    if !is_valid_slug(slug) {
        return Err(LoaderError::InvalidSlug(slug.to_string()));
    }

    let connection = request.connection();

    let markdown_file = fetcher
        .fetch_markdown(&doc_path(slug), &connection)
        .await?;
    let docs_nav = fetcher.fetch_json(DOCS_TOC_PATH, &connection).await?.data;

    let next_page = neighbour(
        fetcher,
        &connection,
        markdown_file.data.frontmatter.next.as_deref(),
    )
    .await?;
    let prev_page = neighbour(
        fetcher,
        &connection,
        markdown_file.data.frontmatter.prev.as_deref(),
    )
    .await?;

    Ok(DocProps {
        markdown_file,
        source_provider_connection: connection,
        edit_mode: request.preview,
        docs_nav,
        next_page,
        prev_page,
    })
}

async fn neighbour(
    fetcher: &ContentFetcher,
    connection: &SourceConnection,
    reference: Option<&str>,
) -> Result<NavLink, LoaderError> {
    let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
        return Ok(NavLink::default());
    };

    let file = fetcher
        .fetch_markdown(&reference_path(reference), connection)
        .await?;

    Ok(NavLink {
        slug: Some(reference.to_string()),
        title: file.data.frontmatter.title,
    })
}

/// Path of the doc for `slug`.
pub fn doc_path(slug: &str) -> String {
    format!("content/docs/{}.md", slug)
}

/// Path of the doc a `next`/`prev` reference such as `/docs/intro` points at.
pub fn reference_path(reference: &str) -> String {
    format!("content/{}.md", reference.trim().trim_matches('/'))
}

/// Whether `slug` is a relative path of word segments.
pub fn is_valid_slug(slug: &str) -> bool {
    static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(/[A-Za-z0-9_-]+)*$").expect("Invalid slug regex")
    });

    SLUG_RE.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_content::{FixedSourceProvider, MemorySource};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    const TOC: &str = r#"[{ "title": "Getting Started", "items": [] }]"#;

    fn fetcher(source: MemorySource) -> (ContentFetcher, Arc<MemorySource>) {
        let source = Arc::new(source);
        let fetcher = ContentFetcher::new(FixedSourceProvider(source.clone()));
        (fetcher, source)
    }

    fn remote_request() -> PageRequest {
        PageRequest::with_preview(Some(PreviewData {
            fork_full_name: "alice/site".to_string(),
            head_branch: Some("edits".to_string()),
            github_access_token: None,
        }))
    }

    #[test]
    fn preview_without_fork_is_read_only() {
        let request = PageRequest::with_preview(Some(PreviewData {
            fork_full_name: "  ".to_string(),
            head_branch: Some("edits".to_string()),
            github_access_token: Some("gho_token".to_string()),
        }));

        assert!(!request.preview);
        assert_eq!(request.connection(), SourceConnection::Local);
        assert!(remote_request().preview);
        assert!(!PageRequest::with_preview(None).preview);
    }

    #[tokio::test]
    async fn home_loads_document() {
        let (fetcher, _) = fetcher(
            MemorySource::new().with_file(HOME_PATH, r#"{ "headline": "Edit in place" }"#),
        );

        let props = load_home(&fetcher, &PageRequest::default()).await.unwrap();

        let home = props.home.unwrap();
        assert_eq!(home.data, json!({ "headline": "Edit in place" }));
        assert_eq!(props.preview_error, None);
        assert_eq!(props.source_provider_connection, SourceConnection::Local);
        assert!(!props.edit_mode);
    }

    #[tokio::test]
    async fn home_not_found_becomes_preview_error() {
        let (fetcher, _) = fetcher(MemorySource::new());

        let props = load_home(&fetcher, &remote_request()).await.unwrap();

        assert!(props.home.is_none());
        let message = props.preview_error.clone().unwrap();
        assert!(message.contains(HOME_PATH));
        assert!(props.edit_mode);

        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["home"], json!({}));
        assert_eq!(json["sourceProviderConnection"]["kind"], "remote");
    }

    #[tokio::test]
    async fn home_other_failures_propagate() {
        let (fetcher, _) = fetcher(MemorySource::new().with_failure(HOME_PATH, 500));

        let err = load_home(&fetcher, &PageRequest::default()).await.unwrap_err();

        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn doc_without_neighbours() {
        let (fetcher, source) = fetcher(
            MemorySource::new()
                .with_file("content/docs/intro.md", "---\ntitle: Intro\n---\n# Hello\n")
                .with_file(DOCS_TOC_PATH, TOC),
        );

        let props = load_doc(&fetcher, &PageRequest::default(), "intro").await.unwrap();

        assert_eq!(props.markdown_file.data.frontmatter.title.as_deref(), Some("Intro"));
        assert_eq!(props.next_page, NavLink::default());
        assert_eq!(props.prev_page, NavLink::default());
        assert_eq!(props.docs_nav[0]["title"], "Getting Started");
        assert_eq!(
            source.reads(),
            vec!["content/docs/intro.md".to_string(), DOCS_TOC_PATH.to_string()]
        );

        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["nextPage"], json!({}));
    }

    #[tokio::test]
    async fn doc_with_neighbours_fetches_in_order() {
        let (fetcher, source) = fetcher(
            MemorySource::new()
                .with_file(
                    "content/docs/guide/fields.md",
                    "---\ntitle: Fields\nnext: /docs/guide/forms\nprev: /docs/intro\n---\nBody\n",
                )
                .with_file(DOCS_TOC_PATH, TOC)
                .with_file("content/docs/guide/forms.md", "---\ntitle: Forms\n---\n")
                .with_file("content/docs/intro.md", "---\ntitle: Intro\n---\n"),
        );

        let props = load_doc(&fetcher, &remote_request(), "guide/fields")
            .await
            .unwrap();

        assert_eq!(
            props.next_page,
            NavLink {
                slug: Some("/docs/guide/forms".to_string()),
                title: Some("Forms".to_string()),
            }
        );
        assert_eq!(props.prev_page.title.as_deref(), Some("Intro"));
        assert_eq!(
            source.reads(),
            vec![
                "content/docs/guide/fields.md".to_string(),
                DOCS_TOC_PATH.to_string(),
                "content/docs/guide/forms.md".to_string(),
                "content/docs/intro.md".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn doc_not_found_propagates() {
        let (fetcher, source) = fetcher(MemorySource::new().with_file(DOCS_TOC_PATH, TOC));

        let err = load_doc(&fetcher, &PageRequest::default(), "missing")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(source.reads(), vec!["content/docs/missing.md".to_string()]);
    }

    #[tokio::test]
    async fn missing_neighbour_propagates() {
        let (fetcher, _) = fetcher(
            MemorySource::new()
                .with_file("content/docs/intro.md", "---\nnext: /docs/gone\n---\n")
                .with_file(DOCS_TOC_PATH, TOC),
        );

        let err = load_doc(&fetcher, &PageRequest::default(), "intro")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn invalid_slug_fetches_nothing() {
        let (fetcher, source) = fetcher(MemorySource::new());

        for slug in ["../secrets", "a//b", "", "intro.md", "/intro"] {
            let err = load_doc(&fetcher, &PageRequest::default(), slug)
                .await
                .unwrap_err();
            assert!(matches!(err, LoaderError::InvalidSlug(_)), "{slug}");
        }
        assert!(source.reads().is_empty());
    }

    #[test]
    fn reference_paths() {
        assert_eq!(reference_path("/foo/bar"), "content/foo/bar.md");
        assert_eq!(reference_path("docs/intro"), "content/docs/intro.md");
    }
}
