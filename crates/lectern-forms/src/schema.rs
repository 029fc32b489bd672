//! Form schemas and boundary validation of content documents.

use serde::Serialize;
use serde_json::Value;

use crate::field::FieldDescriptor;

/// A static description of the editable fields of one page type.
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    /// Form identifier
    pub id: String,

    /// Label shown in the editor
    pub label: String,

    /// Editable fields
    pub fields: Vec<FieldDescriptor>,
}

/// A value in a document that does not match the schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: expected {expected}, found {found}")]
pub struct SchemaViolation {
    /// Dotted path of the offending value
    pub path: String,
    /// What the schema allows
    pub expected: &'static str,
    /// What the document holds
    pub found: &'static str,
}

impl FormSchema {
    pub fn new(id: &str, label: &str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            fields,
        }
    }

    /// Find the descriptor that governs a concrete path.
    ///
    /// `three_points` resolves to the group, `three_points.2.main` to the
    /// nested `main` field.
    pub fn resolve(&self, path: &str) -> Option<&FieldDescriptor> {
        resolve_in(&self.fields, path)
    }

    /// Check a document against the schema.
    ///
    /// The document must be an object. Every field may be absent, but the
    /// objects on the way to a field must be objects when present. Present
    /// leaf values must be strings and present groups must be lists of
    /// objects.
    pub fn validate(&self, document: &Value) -> Result<(), Vec<SchemaViolation>> {
        if !document.is_object() {
            return Err(vec![SchemaViolation {
                path: String::new(),
                expected: "object",
                found: kind_of(document),
            }]);
        }

        let mut violations = Vec::new();
        validate_fields(&self.fields, document, "", &mut violations);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn resolve_in<'a>(fields: &'a [FieldDescriptor], path: &str) -> Option<&'a FieldDescriptor> {
    for field in fields {
        let name = field.name();

        if path == name {
            return Some(field);
        }

        let Some(rest) = path
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            continue;
        };

        if let FieldDescriptor::GroupList(group) = field {
            // rest is "<index>" or "<index>.<field path>"
            let (index, inner) = match rest.split_once('.') {
                Some((index, inner)) => (index, Some(inner)),
                None => (rest, None),
            };
            if index.parse::<usize>().is_err() {
                return None;
            }
            return match inner {
                Some(inner) => resolve_in(&group.fields, inner),
                None => Some(field),
            };
        }
    }

    None
}

fn validate_fields(
    fields: &[FieldDescriptor],
    document: &Value,
    prefix: &str,
    violations: &mut Vec<SchemaViolation>,
) {
    for field in fields {
        let full_path = join(prefix, field.name());
        let value = match lookup(document, field.name(), prefix) {
            Ok(None | Some(Value::Null)) => continue,
            Ok(Some(value)) => value,
            Err(violation) => {
                // fields sharing a prefix report a bad container once
                if !violations.contains(&violation) {
                    violations.push(violation);
                }
                continue;
            }
        };

        match field {
            FieldDescriptor::Text(_) | FieldDescriptor::Textarea(_) => {
                if !value.is_string() {
                    violations.push(SchemaViolation {
                        path: full_path,
                        expected: "text",
                        found: kind_of(value),
                    });
                }
            }
            FieldDescriptor::GroupList(group) => {
                let Some(items) = value.as_array() else {
                    violations.push(SchemaViolation {
                        path: full_path,
                        expected: "list",
                        found: kind_of(value),
                    });
                    continue;
                };

                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{}.{}", full_path, index);
                    if !item.is_object() {
                        violations.push(SchemaViolation {
                            path: item_path,
                            expected: "object",
                            found: kind_of(item),
                        });
                        continue;
                    }
                    validate_fields(&group.fields, item, &item_path, violations);
                }
            }
        }
    }
}

/// Follow a dotted field name through nested objects.
///
/// A missing or null container means the field is absent. Any other
/// container that is not an object is reported at its own path.
fn lookup<'a>(
    object: &'a Value,
    name: &str,
    prefix: &str,
) -> Result<Option<&'a Value>, SchemaViolation> {
    let mut current = object;
    let mut walked = prefix.to_string();

    for segment in name.split('.') {
        let map = match current {
            Value::Object(map) => map,
            Value::Null => return Ok(None),
            other => {
                return Err(SchemaViolation {
                    path: walked,
                    expected: "object",
                    found: kind_of(other),
                })
            }
        };
        walked = join(&walked, segment);
        match map.get(segment) {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    Ok(Some(current))
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ItemLabel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> FormSchema {
        FormSchema::new(
            "test",
            "Test",
            vec![
                FieldDescriptor::text("headline", "Headline"),
                FieldDescriptor::textarea("setup.headline", "Setup Headline"),
                FieldDescriptor::group_list(
                    "setup.steps",
                    "Steps",
                    ItemLabel::new("step", 15),
                    || json!({ "step": "New Step" }),
                    vec![FieldDescriptor::textarea("step", "Step")],
                ),
            ],
        )
    }

    #[test]
    fn resolves_paths() {
        let schema = schema();

        assert_eq!(schema.resolve("headline").map(|f| f.name()), Some("headline"));
        assert_eq!(
            schema.resolve("setup.headline").map(|f| f.name()),
            Some("setup.headline")
        );
        assert_eq!(
            schema.resolve("setup.steps").map(|f| f.name()),
            Some("setup.steps")
        );
        assert_eq!(
            schema.resolve("setup.steps.3.step").map(|f| f.name()),
            Some("step")
        );
        assert_eq!(
            schema.resolve("setup.steps.3").map(|f| f.name()),
            Some("setup.steps")
        );
        assert!(schema.resolve("setup.steps.x.step").is_none());
        assert!(schema.resolve("setup.steps.0.other").is_none());
        assert!(schema.resolve("hero_video").is_none());
    }

    #[test]
    fn absent_fields_are_valid() {
        assert!(schema().validate(&json!({})).is_ok());
        assert!(schema().validate(&json!({ "headline": null })).is_ok());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc = json!({ "headline": "Hi", "hero_video": "intro.mp4", "title": "Home" });

        assert!(schema().validate(&doc).is_ok());
    }

    #[test]
    fn reports_every_violation_with_path() {
        let doc = json!({
            "headline": 3,
            "setup": {
                "headline": "ok",
                "steps": [{ "step": "one" }, "two", { "step": true }],
            },
        });

        let violations = schema().validate(&doc).unwrap_err();

        assert_eq!(
            violations,
            vec![
                SchemaViolation {
                    path: "headline".to_string(),
                    expected: "text",
                    found: "number"
                },
                SchemaViolation {
                    path: "setup.steps.1".to_string(),
                    expected: "object",
                    found: "text"
                },
                SchemaViolation {
                    path: "setup.steps.2.step".to_string(),
                    expected: "text",
                    found: "boolean"
                },
            ]
        );
    }

    #[test]
    fn document_must_be_an_object() {
        for document in [json!("hello"), json!([]), json!(42), json!(null)] {
            let violations = schema().validate(&document).unwrap_err();

            assert_eq!(violations.len(), 1, "{document}");
            assert_eq!(violations[0].path, "");
            assert_eq!(violations[0].expected, "object");
        }
    }

    #[test]
    fn containers_on_the_way_must_be_objects() {
        let violations = schema().validate(&json!({ "setup": "x" })).unwrap_err();

        assert_eq!(
            violations,
            vec![SchemaViolation {
                path: "setup".to_string(),
                expected: "object",
                found: "text"
            }]
        );
        assert!(schema().validate(&json!({ "setup": null })).is_ok());
    }

    #[test]
    fn containers_inside_group_items_report_full_path() {
        let schema = FormSchema::new(
            "test",
            "Test",
            vec![FieldDescriptor::group_list(
                "items",
                "Items",
                ItemLabel::new("meta.name", 15),
                || json!({}),
                vec![FieldDescriptor::text("meta.name", "Name")],
            )],
        );

        let violations = schema
            .validate(&json!({ "items": [{ "meta": { "name": "ok" } }, { "meta": [] }] }))
            .unwrap_err();

        assert_eq!(violations[0].to_string(), "items.1.meta: expected object, found list");
    }

    #[test]
    fn group_must_be_a_list() {
        let violations = schema()
            .validate(&json!({ "setup": { "steps": { "step": "x" } } }))
            .unwrap_err();

        assert_eq!(violations[0].to_string(), "setup.steps: expected list, found object");
    }
}
