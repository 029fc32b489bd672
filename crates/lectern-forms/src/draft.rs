//! Inline drafts: fetched content bound to a form and edited in memory.

use serde::Serialize;
use serde_json::Value;

use lectern_content::{JsonFile, MarkdownData, MarkdownFile, SourceConnection, WriteReceipt, WriteRequest};

use crate::field::{FieldDescriptor, GroupList};
use crate::path::{self, PathError};
use crate::schema::{FormSchema, SchemaViolation};

/// How a document is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Markdown,
}

/// Whether the draft accepts edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Active,
    Inactive,
}

/// A write ready to be sent through the draft's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub request: WriteRequest,
    pub connection: SourceConnection,
}

/// Errors from editing a draft.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("The form is not active")]
    Inactive,

    #[error("Editing is only available in edit mode")]
    NotEditable,

    #[error("No field '{0}' in this form")]
    UnknownField(String),

    #[error("'{path}' expects {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("'{path}' has no item {index} (length {len})")]
    NoSuchItem {
        path: String,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Document does not match the form: {}", join_violations(.0))]
    Invalid(Vec<SchemaViolation>),

    #[error("Values do not form a valid {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("Failed to serialize {path}: {message}")]
    Serialize { path: String, message: String },
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A document bound to a form schema.
///
/// Holds the fetched values and an in-memory copy that edits apply to. The
/// copy is only persisted through [`InlineDraft::submit`].
#[derive(Debug, Clone)]
pub struct InlineDraft {
    schema: FormSchema,
    connection: SourceConnection,
    path: String,
    format: DocumentFormat,
    sha: Option<String>,
    original: Value,
    current: Value,
    edit_mode: bool,
    status: DraftStatus,
}

impl InlineDraft {
    fn new(
        path: &str,
        format: DocumentFormat,
        sha: Option<String>,
        values: Value,
        schema: FormSchema,
        connection: SourceConnection,
        edit_mode: bool,
    ) -> Self {
        Self {
            schema,
            connection,
            path: path.to_string(),
            format,
            sha,
            original: values.clone(),
            current: values,
            edit_mode,
            status: if edit_mode {
                DraftStatus::Active
            } else {
                DraftStatus::Inactive
            },
        }
    }

    /// Bind a JSON document.
    pub fn from_json(
        file: &JsonFile,
        schema: FormSchema,
        connection: SourceConnection,
        edit_mode: bool,
    ) -> Self {
        Self::new(
            &file.file_relative_path,
            DocumentFormat::Json,
            file.sha.clone(),
            file.data.clone(),
            schema,
            connection,
            edit_mode,
        )
    }

    /// Bind an empty JSON document that does not exist yet.
    pub fn empty_json(
        path: &str,
        schema: FormSchema,
        connection: SourceConnection,
        edit_mode: bool,
    ) -> Self {
        Self::new(
            path,
            DocumentFormat::Json,
            None,
            Value::Object(Default::default()),
            schema,
            connection,
            edit_mode,
        )
    }

    /// Bind a Markdown document. Values are `frontmatter.*` and `markdownBody`.
    pub fn from_markdown(
        file: &MarkdownFile,
        schema: FormSchema,
        connection: SourceConnection,
        edit_mode: bool,
    ) -> Result<Self, DraftError> {
        let values = serde_json::to_value(&file.data).map_err(|e| DraftError::Serialize {
            path: file.file_relative_path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self::new(
            &file.file_relative_path,
            DocumentFormat::Markdown,
            file.sha.clone(),
            values,
            schema,
            connection,
            edit_mode,
        ))
    }

    /// Current values, including unsaved edits.
    pub fn values(&self) -> &Value {
        &self.current
    }

    /// Current value at a dotted path.
    pub fn value(&self, path: &str) -> Option<&Value> {
        path::get(&self.current, path)
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn connection(&self) -> &SourceConnection {
        &self.connection
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    /// Write against `sha`, the version the editor loaded, instead of the
    /// version this draft was bound to. `None` means the document did not
    /// exist when it was loaded.
    pub fn set_base_sha(&mut self, sha: Option<String>) {
        self.sha = sha;
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == DraftStatus::Active
    }

    /// Whether the values differ from what was fetched or last saved.
    pub fn is_dirty(&self) -> bool {
        self.current != self.original
    }

    /// Turn editing on. Only possible in edit mode.
    pub fn activate(&mut self) -> Result<(), DraftError> {
        if !self.edit_mode {
            return Err(DraftError::NotEditable);
        }
        self.status = DraftStatus::Active;
        Ok(())
    }

    /// Turn editing off, keeping any edits.
    pub fn deactivate(&mut self) {
        self.status = DraftStatus::Inactive;
    }

    fn ensure_active(&self) -> Result<(), DraftError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DraftError::Inactive)
        }
    }

    fn group(&self, name: &str) -> Result<&GroupList, DraftError> {
        match self.schema.resolve(name) {
            Some(FieldDescriptor::GroupList(group)) if group.name == name => Ok(group),
            _ => Err(DraftError::UnknownField(name.to_string())),
        }
    }

    fn list_mut(&mut self, name: &str) -> Result<&mut Vec<Value>, DraftError> {
        if matches!(self.value(name), None | Some(Value::Null)) {
            path::set(&mut self.current, name, Value::Array(Vec::new()))?;
        }

        path::get_mut(&mut self.current, name)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DraftError::TypeMismatch {
                path: name.to_string(),
                expected: "a list",
            })
    }

    /// Set the value at a path the form knows about.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), DraftError> {
        self.ensure_active()?;

        let field = self
            .schema
            .resolve(path)
            .ok_or_else(|| DraftError::UnknownField(path.to_string()))?;

        let expected = match field {
            FieldDescriptor::Text(_) | FieldDescriptor::Textarea(_) => {
                (!value.is_string()).then_some("text")
            }
            // The whole list
            FieldDescriptor::GroupList(group) if group.name == path => value
                .as_array()
                .filter(|items| items.iter().all(Value::is_object))
                .is_none()
                .then_some("a list of objects"),
            // One item
            FieldDescriptor::GroupList(_) => (!value.is_object()).then_some("an object"),
        };

        if let Some(expected) = expected {
            return Err(DraftError::TypeMismatch {
                path: path.to_string(),
                expected,
            });
        }

        path::set(&mut self.current, path, value)?;
        Ok(())
    }

    /// Append the group's default item. Returns its index.
    pub fn add_item(&mut self, group: &str) -> Result<usize, DraftError> {
        self.ensure_active()?;
        let default_item = self.group(group)?.default_item;

        let items = self.list_mut(group)?;
        items.push(default_item());
        Ok(items.len() - 1)
    }

    /// Remove an item from a group, returning it.
    pub fn remove_item(&mut self, group: &str, index: usize) -> Result<Value, DraftError> {
        self.ensure_active()?;
        self.group(group)?;

        let items = self.list_mut(group)?;
        if index >= items.len() {
            return Err(DraftError::NoSuchItem {
                path: group.to_string(),
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// Move an item within a group.
    pub fn move_item(&mut self, group: &str, from: usize, to: usize) -> Result<(), DraftError> {
        self.ensure_active()?;
        self.group(group)?;

        let items = self.list_mut(group)?;
        let len = items.len();
        for index in [from, to] {
            if index >= len {
                return Err(DraftError::NoSuchItem {
                    path: group.to_string(),
                    index,
                    len,
                });
            }
        }

        let item = items.remove(from);
        items.insert(to, item);
        Ok(())
    }

    /// Editor labels for the items of a group.
    pub fn item_labels(&self, group: &str) -> Result<Vec<String>, DraftError> {
        let group_field = self.group(group)?;

        match self.value(group) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .map(|item| group_field.item_label.derive(item))
                .collect()),
            Some(_) => Err(DraftError::TypeMismatch {
                path: group.to_string(),
                expected: "a list",
            }),
        }
    }

    /// Replace all values at once, as when an editor posts the whole form.
    pub fn replace(&mut self, values: Value) -> Result<(), DraftError> {
        self.ensure_active()?;
        self.schema.validate(&values).map_err(DraftError::Invalid)?;
        self.current = values;
        Ok(())
    }

    /// Drop all unsaved edits.
    pub fn discard(&mut self) {
        tracing::debug!("Discarding edits to {}", self.path);
        self.current = self.original.clone();
    }

    /// Prepare the current values for writing.
    pub fn submit(&self) -> Result<Submission, DraftError> {
        self.ensure_active()?;
        self.schema.validate(&self.current).map_err(DraftError::Invalid)?;

        let serialize_error = |message: String| DraftError::Serialize {
            path: self.path.clone(),
            message,
        };

        let contents = match self.format {
            DocumentFormat::Json => serde_json::to_string_pretty(&self.current)
                .map(|json| json + "\n")
                .map_err(|e| serialize_error(e.to_string()))?,
            DocumentFormat::Markdown => {
                let data: MarkdownData = serde_json::from_value(self.current.clone())
                    .map_err(|e| DraftError::Malformed {
                        path: self.path.clone(),
                        message: e.to_string(),
                    })?;
                data.to_source().map_err(|e| serialize_error(e.to_string()))?
            }
        };

        tracing::debug!("Submitting {} ({} bytes)", self.path, contents.len());

        Ok(Submission {
            request: WriteRequest {
                path: self.path.clone(),
                contents,
                sha: self.sha.clone(),
                message: format!("Update {}", self.path),
            },
            connection: self.connection.clone(),
        })
    }

    /// Record a successful write: the submitted values become the baseline.
    pub fn mark_saved(&mut self, receipt: &WriteReceipt) {
        self.original = self.current.clone();
        self.sha = receipt.sha.clone();
    }
}
