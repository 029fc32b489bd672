//! Inline edit forms for lectern pages.
//!
//! A page's fetched document is bound to a static [`FormSchema`] as an
//! [`InlineDraft`]. Edits apply to the draft in memory and are either
//! discarded or submitted as a write through the page's source connection.

pub mod draft;
pub mod field;
pub mod pages;
pub mod path;
pub mod schema;

pub use draft::{DocumentFormat, DraftError, DraftStatus, InlineDraft, Submission};
pub use field::{safe_slice, Field, FieldDescriptor, GroupList, ItemLabel};
pub use pages::{doc_schema, home_schema, PageKind, ITEM_LABEL_CHARS};
pub use path::PathError;
pub use schema::{FormSchema, SchemaViolation};
