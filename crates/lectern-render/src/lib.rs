//! HTML rendering for lectern pages.
//!
//! Pages are rendered server-side from view models; the inline editor and the
//! modal actions run in a small client script.

pub mod assets;
pub mod markdown;
pub mod templates;
pub mod views;

pub use assets::{SITE_CSS, SITE_JS};
pub use markdown::render_markdown;
pub use templates::{RenderError, TemplateEngine};
pub use views::{embed_json, ActionKind, Chrome, DocView, ErrorView, HomeView, Modal, ModalAction, PageLink};
