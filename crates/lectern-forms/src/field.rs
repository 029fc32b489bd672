//! Field descriptors for inline edit forms.

use serde::Serialize;
use serde_json::Value;

/// A single editable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Dotted path of the value in the document (e.g. `setup.headline`)
    pub name: String,

    /// Label shown in the editor
    pub label: String,

    /// Help text shown under the input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A repeatable group of fields stored as a list of objects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupList {
    /// Dotted path of the list in the document
    pub name: String,

    /// Label shown in the editor
    pub label: String,

    /// Help text shown under the group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// How each item is labelled in the editor
    pub item_label: ItemLabel,

    /// Builds the item appended by "add"
    #[serde(skip)]
    pub default_item: fn() -> Value,

    /// Fields of each item, named relative to the item
    pub fields: Vec<FieldDescriptor>,
}

/// Describes one entry in a form.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "component", rename_all = "kebab-case")]
pub enum FieldDescriptor {
    /// Single-line text
    Text(Field),
    /// Multi-line text
    Textarea(Field),
    /// List of objects, each edited with the nested fields
    GroupList(GroupList),
}

impl FieldDescriptor {
    pub fn text(name: &str, label: &str) -> Self {
        Self::Text(Field::new(name, label))
    }

    pub fn textarea(name: &str, label: &str) -> Self {
        Self::Textarea(Field::new(name, label))
    }

    pub fn group_list(
        name: &str,
        label: &str,
        item_label: ItemLabel,
        default_item: fn() -> Value,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        Self::GroupList(GroupList {
            name: name.to_string(),
            label: label.to_string(),
            description: None,
            item_label,
            default_item,
            fields,
        })
    }

    /// Attach help text.
    pub fn describe(mut self, text: &str) -> Self {
        let description = Some(text.to_string());
        match &mut self {
            Self::Text(f) | Self::Textarea(f) => f.description = description,
            Self::GroupList(g) => g.description = description,
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text(f) | Self::Textarea(f) => &f.name,
            Self::GroupList(g) => &g.name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Text(f) | Self::Textarea(f) => &f.label,
            Self::GroupList(g) => &g.label,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::GroupList(_))
    }
}

impl Field {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            description: None,
        }
    }
}

/// Derives an editor label for a group item from one of its text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLabel {
    /// Field of the item the label is taken from
    pub source: String,

    /// Maximum number of characters taken from the field
    pub max_chars: usize,

    /// Appended after the truncated text
    pub suffix: String,
}

impl ItemLabel {
    pub fn new(source: &str, max_chars: usize) -> Self {
        Self {
            source: source.to_string(),
            max_chars,
            suffix: "...".to_string(),
        }
    }

    /// The truncated source text. Absent or non-text sources give `""`.
    pub fn prefix(&self, item: &Value) -> String {
        safe_slice(item.get(&self.source).and_then(Value::as_str), 0, self.max_chars)
    }

    /// Label for an item. Never fails.
    pub fn derive(&self, item: &Value) -> String {
        format!("{}{}", self.prefix(item), self.suffix)
    }
}

/// Slice `text` by characters, treating a missing string as empty.
pub fn safe_slice(text: Option<&str>, start: usize, end: usize) -> String {
    text.unwrap_or("")
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
