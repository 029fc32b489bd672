//! Site server for lectern.
//!
//! Loads page data through the content fetcher, renders pages with their
//! edit session's modals, and accepts inline edits from viewers in preview
//! mode.

pub mod config;
pub mod loaders;
pub mod page;
pub mod preview;
pub mod server;
pub mod session;

pub use config::{GithubSettings, ServerSettings, SiteConfig, SiteSettings};
pub use loaders::{
    load_doc, load_home, DocProps, HomeProps, LoaderError, NavLink, PageRequest, DOCS_TOC_PATH,
    HOME_PATH,
};
pub use preview::{generate_secret, PreviewKey, PREVIEW_COOKIE};
pub use server::{router, AppState, ServerConfig, ServerError, SiteServer};
pub use session::{EditSession, EditState, AUTO_AUTH_MARKER};
