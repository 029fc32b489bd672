//! Content documents as returned by the fetcher.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::frontmatter::{compose_markdown, extract_frontmatter, Frontmatter, FrontmatterError};

/// A fetched content file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFile<T> {
    /// Path relative to the content root (e.g. `content/pages/home.json`)
    pub file_relative_path: String,

    /// Blob id of the fetched revision, when the source tracks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,

    /// Parsed contents
    pub data: T,
}

/// A JSON document.
pub type JsonFile = ContentFile<Value>;

/// A Markdown document with frontmatter.
pub type MarkdownFile = ContentFile<MarkdownData>;

/// Parsed Markdown: frontmatter plus body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownData {
    /// Frontmatter (empty when the file has none)
    #[serde(default)]
    pub frontmatter: Frontmatter,

    /// Markdown content (without frontmatter)
    #[serde(default)]
    pub markdown_body: String,
}

impl MarkdownData {
    /// Parse a Markdown document.
    pub fn parse(source: &str) -> Result<Self, FrontmatterError> {
        let (frontmatter, body) = extract_frontmatter(source)?;

        Ok(Self {
            frontmatter: frontmatter.unwrap_or_default(),
            markdown_body: body.to_string(),
        })
    }

    /// Serialize back into a Markdown document.
    pub fn to_source(&self) -> Result<String, FrontmatterError> {
        compose_markdown(&self.frontmatter, &self.markdown_body)
    }

    /// Headings of the body, in document order.
    pub fn headings(&self) -> Vec<Heading> {
        headings(&self.markdown_body)
    }
}

/// A heading found in a Markdown body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Collect the headings of a Markdown body.
pub fn headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level as u8, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, ref mut title)) = current {
                    title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current.take() {
                    let id = slugify(&title);
                    headings.push(Heading { title, id, level });
                }
            }
            _ => {}
        }
    }

    headings
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_document_with_frontmatter() {
        let source = "---\ntitle: Fields\nnext: /docs/plugins\n---\n\n# Fields\n\nText.\n";

        let data = MarkdownData::parse(source).unwrap();

        assert_eq!(data.frontmatter.title.as_deref(), Some("Fields"));
        assert_eq!(data.frontmatter.next.as_deref(), Some("/docs/plugins"));
        assert_eq!(data.markdown_body, "# Fields\n\nText.\n");
    }

    #[test]
    fn document_without_frontmatter_gets_empty_frontmatter() {
        let data = MarkdownData::parse("# Plain").unwrap();

        assert_eq!(data.frontmatter, Frontmatter::default());
        assert_eq!(data.markdown_body, "# Plain");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let data = MarkdownData::parse("---\ntitle: A\n---\nBody").unwrap();
        let file = MarkdownFile {
            file_relative_path: "content/docs/a.md".to_string(),
            sha: None,
            data,
        };

        let json = serde_json::to_value(&file).unwrap();

        assert_eq!(json["fileRelativePath"], "content/docs/a.md");
        assert_eq!(json["data"]["markdownBody"], "Body");
        assert_eq!(json["data"]["frontmatter"]["title"], "A");
        assert!(json.get("sha").is_none());
    }

    #[test]
    fn collects_headings() {
        let headings = headings("# Getting Started\n\ntext\n\n## Install `lectern`\n");

        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].id, "getting-started");
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[1].title, "Install lectern");
        assert_eq!(headings[1].level, 2);
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }
}
