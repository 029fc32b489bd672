//! Content fetching for lectern sites.
//!
//! Reads JSON pages and Markdown documents with YAML frontmatter from either the
//! deployed content directory or a GitHub repository, depending on the
//! request's preview data.

pub mod connection;
pub mod document;
pub mod error;
pub mod fetch;
pub mod frontmatter;
pub mod github;
pub mod local;
pub mod memory;
pub mod source;

pub use connection::{Credential, PreviewData, SourceConnection, DEFAULT_BRANCH};
pub use document::{headings, slugify, ContentFile, Heading, JsonFile, MarkdownData, MarkdownFile};
pub use error::ContentError;
pub use fetch::ContentFetcher;
pub use frontmatter::{compose_markdown, extract_frontmatter, Frontmatter, FrontmatterError};
pub use github::{GithubSource, DEFAULT_API_BASE};
pub use local::LocalSource;
pub use memory::MemorySource;
pub use source::{
    validate_path, ContentSource, DefaultSourceProvider, FixedSourceProvider, RawFile,
    SourceProvider, WriteReceipt, WriteRequest,
};
