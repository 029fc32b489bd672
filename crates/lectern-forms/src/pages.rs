//! Form schemas of the site's page types.

use serde_json::{json, Value};

use crate::field::{FieldDescriptor, ItemLabel};
use crate::schema::FormSchema;

/// Characters of item text shown in a group item's label.
pub const ITEM_LABEL_CHARS: usize = 15;

/// Page types with an edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Doc,
}

impl PageKind {
    pub fn schema(self) -> FormSchema {
        match self {
            Self::Home => home_schema(),
            Self::Doc => doc_schema(),
        }
    }
}

fn new_selling_point() -> Value {
    json!({
        "main": "New Point",
        "supporting": "",
        "_template": "selling_point",
    })
}

fn new_setup_step() -> Value {
    json!({
        "step": "New Step",
        "_template": "setup_point",
    })
}

/// Fields of `content/pages/home.json`.
pub fn home_schema() -> FormSchema {
    FormSchema::new(
        "home",
        "Home Page",
        vec![
            FieldDescriptor::text("headline", "Headline").describe("Enter the main headline here"),
            FieldDescriptor::textarea("description", "Description")
                .describe("Enter supporting main description"),
            FieldDescriptor::group_list(
                "three_points",
                "Selling Points",
                ItemLabel::new("main", ITEM_LABEL_CHARS),
                new_selling_point,
                vec![
                    FieldDescriptor::textarea("main", "Main"),
                    FieldDescriptor::textarea("supporting", "Supporting"),
                ],
            )
            .describe("Edit the points here"),
            FieldDescriptor::textarea("setup.headline", "Setup Headline")
                .describe("Enter the \"setup\" headline here"),
            FieldDescriptor::group_list(
                "setup.steps",
                "Setup Steps",
                ItemLabel::new("step", ITEM_LABEL_CHARS),
                new_setup_step,
                vec![FieldDescriptor::textarea("step", "Step")],
            )
            .describe("Edit the steps here"),
        ],
    )
}

/// Fields of a `content/docs/<slug>.md` document.
pub fn doc_schema() -> FormSchema {
    FormSchema::new(
        "doc",
        "Doc Page",
        vec![
            FieldDescriptor::text("frontmatter.title", "Title"),
            FieldDescriptor::textarea("markdownBody", "Content"),
        ],
    )
}
