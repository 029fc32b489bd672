//! Frontmatter extraction and parsing.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Parsed frontmatter from a Markdown document.
///
/// Only the fields the site itself reads are typed. Everything else is kept in
/// `extra` so that an edit round-trip does not drop keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Page title
    #[serde(
        default,
        deserialize_with = "scalar_as_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    /// Path of the next document, relative to `content/` (e.g. `/docs/intro`)
    #[serde(
        default,
        deserialize_with = "scalar_as_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub next: Option<String>,

    /// Path of the previous document, relative to `content/`
    #[serde(
        default,
        deserialize_with = "scalar_as_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub prev: Option<String>,

    /// Any other keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read any scalar as text: `next: 3` is the reference `"3"`. Lists and
/// mappings are errors.
fn scalar_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(de::Error::custom(format!(
            "expected text, found {}",
            if other.is_array() { "a list" } else { "a mapping" }
        ))),
    }
}

/// Extract frontmatter from Markdown content.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    // Find the closing ---
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    // An empty block is valid and means "no fields"
    if yaml_content.is_empty() {
        return Ok((Some(Frontmatter::default()), remaining.trim_start()));
    }

    let frontmatter: Frontmatter = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Serialize frontmatter and body back into a Markdown document.
pub fn compose_markdown(frontmatter: &Frontmatter, body: &str) -> Result<String, FrontmatterError> {
    let yaml = serde_yaml::to_string(frontmatter)
        .map_err(|e| FrontmatterError::Serialize(e.to_string()))?;

    Ok(format!("---\n{}---\n{}", yaml, body))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Failed to serialize frontmatter: {0}")]
    Serialize(String),
}
