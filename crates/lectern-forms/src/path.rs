//! Dotted field paths into JSON values (`setup.steps.0.step`).

use serde_json::{Map, Value};

/// Errors from resolving a field path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Empty field path")]
    Empty,

    #[error("Cannot descend into '{segment}' of '{path}': not an object or list")]
    NotContainer { path: String, segment: String },

    #[error("Index {index} out of range in '{path}'")]
    OutOfRange { path: String, index: usize },
}

/// Look up the value at a path.
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Mutable lookup. Does not create anything.
pub fn get_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set the value at a path, creating intermediate objects as needed.
///
/// List items are never created implicitly; an index past the end is an error.
pub fn set(root: &mut Value, path: &str, new_value: Value) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let mut current = root;
    for segment in path.split('.') {
        current = slot(current, path, segment)?;
    }
    *current = new_value;

    Ok(())
}

fn slot<'a>(current: &'a mut Value, path: &str, segment: &str) -> Result<&'a mut Value, PathError> {
    if current.is_null() {
        *current = Value::Object(Map::new());
    }

    let not_container = || PathError::NotContainer {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    match current {
        Value::Object(map) => Ok(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = segment.parse::<usize>().map_err(|_| not_container())?;
            items.get_mut(index).ok_or_else(|| PathError::OutOfRange {
                path: path.to_string(),
                index,
            })
        }
        _ => Err(not_container()),
    }
}
