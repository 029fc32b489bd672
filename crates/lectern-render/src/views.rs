//! View models handed to the page templates.

use serde::Serialize;
use serde_json::Value;

use lectern_content::Heading;

/// What a modal button does in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Navigate to `href`
    Navigate,
    /// Replace the current URL with `href` without reloading, then close the modal
    ReplaceUrl,
    /// Request `fetch`, wait for it to complete, then navigate to `href`
    FetchThenNavigate,
}

/// A button in a modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalAction {
    pub name: String,
    pub kind: ActionKind,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<String>,
}

/// A blocking dialog with one or more actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modal {
    pub title: String,
    pub message: String,
    pub actions: Vec<ModalAction>,
}

/// Parts shared by every page.
#[derive(Debug, Clone, Serialize)]
pub struct Chrome {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Whether the viewer is in edit mode
    pub edit_mode: bool,
    /// Whether the inline form starts active
    pub form_active: bool,
    /// Modals to show, in stacking order
    pub modals: Vec<Modal>,
    /// Form schema and values for the inline editor, as embeddable JSON
    pub form_json: String,
    /// Where edits are posted
    pub submit_url: String,
}

/// The home page.
#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub chrome: Chrome,
    /// Home page values (possibly with unsaved edits)
    pub home: Value,
}

/// A link to a neighbouring doc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub href: String,
    pub title: String,
}

/// A documentation page.
#[derive(Debug, Clone, Serialize)]
pub struct DocView {
    pub chrome: Chrome,
    /// Rendered body
    pub body_html: String,
    /// Headings of the body
    pub headings: Vec<Heading>,
    /// Table of contents of all docs, as stored in `content/toc-doc.json`
    pub docs_nav: Value,
    pub next_page: Option<PageLink>,
    pub prev_page: Option<PageLink>,
}

/// A page that could not be loaded.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub chrome: Chrome,
    pub status: u16,
}

/// Serialize a value for embedding in a `<script type="application/json">` tag.
pub fn embed_json(value: &Value) -> String {
    // Only "</" can end the script element early
    value.to_string().replace("</", "<\\/")
}
