use std::fmt;
use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};
use crate::error::FormError;
use crate::model::json_type_name;

/// How far past the end of an array a write may land. Anything further is
/// rejected instead of padding the array with that many `null`s.
pub const MAX_ARRAY_GAP: usize = 10_000;

/// One step from the root of a JSON document towards a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// `["config", "params", 0, "value"]` -> `config.params[0].value`
///
/// Every segment is appended to the accumulated string exactly once. An empty
/// sequence produces an empty string, which callers treat as "nothing to dispatch".
pub fn build_path(segments: &[PathSegment]) -> String {
    let mut path = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
            }
            PathSegment::Index(index) => {
                path.push('[');
                path.push_str(&index.to_string());
                path.push(']');
            }
        }
    }
    path
}

/// Inverse of [`build_path`].
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, FormError> {
    if path.is_empty() {
        return Err(FormError::invalid_path(path, "empty path"));
    }

    let mut segments = Vec::new();
    let mut key = String::new();
    // true right after `]`, where only `.` or `[` may follow
    let mut after_index = false;
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if key.is_empty() && !after_index {
                    return Err(FormError::invalid_path(path, "empty key segment"));
                }
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
                after_index = false;
                if chars.peek().is_none() {
                    return Err(FormError::invalid_path(path, "trailing `.`"));
                }
            }
            '[' => {
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
                let mut digits = String::new();
                let mut closed = false;
                for d in chars.by_ref() {
                    if d == ']' {
                        closed = true;
                        break;
                    }
                    digits.push(d);
                }
                if !closed {
                    return Err(FormError::invalid_path(path, "unclosed `[`"));
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| FormError::invalid_path(path, format!("`{}` is not an array index", digits)))?;
                segments.push(PathSegment::Index(index));
                after_index = true;
            }
            ']' => return Err(FormError::invalid_path(path, "unexpected `]`")),
            _ => {
                if after_index {
                    return Err(FormError::invalid_path(path, "missing `.` after index"));
                }
                key.push(c);
            }
        }
    }

    if !key.is_empty() {
        segments.push(PathSegment::Key(key));
    }
    Ok(segments)
}

pub fn get_at_path<'a>(root: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match (segment, current) {
            (PathSegment::Key(k), Value::Object(map)) => map.get(k)?,
            (PathSegment::Index(i), Value::Array(arr)) => arr.get(*i)?,
            (PathSegment::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
            (PathSegment::Key(k), Value::Array(arr)) => arr.get(k.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `segments`, creating intermediate containers on the way.
///
/// A missing or scalar intermediate becomes an array when the following segment
/// is an index and an object otherwise. Arrays are padded with `null`.
pub fn set_at_path(root: &mut Value, segments: &[PathSegment], value: Value) -> Result<(), FormError> {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        let next_is_index = matches!(segments[i + 1], PathSegment::Index(_));
        let slot = child_slot(current, segment)?;
        if !matches!(slot, Value::Object(_) | Value::Array(_)) {
            *slot = if next_is_index { Value::Array(Vec::new()) } else { Value::Object(Map::new()) };
        }
        current = slot;
    }

    *child_slot(current, last)? = value;
    Ok(())
}

/// Returns the slot for `segment` inside `container`, inserting `null` if absent.
fn child_slot<'a>(container: &'a mut Value, segment: &PathSegment) -> Result<&'a mut Value, FormError> {
    if !matches!(container, Value::Object(_) | Value::Array(_)) {
        *container = match segment {
            PathSegment::Index(_) => Value::Array(Vec::new()),
            PathSegment::Key(_) => Value::Object(Map::new()),
        };
    }

    match container {
        Value::Object(map) => {
            let key = match segment {
                PathSegment::Key(k) => k.clone(),
                PathSegment::Index(i) => i.to_string(),
            };
            Ok(map.entry(key).or_insert(Value::Null))
        }
        Value::Array(arr) => {
            let index = match segment {
                PathSegment::Index(i) => *i,
                PathSegment::Key(k) => k
                    .parse::<usize>()
                    .map_err(|_| FormError::KeyOnArray { key: k.clone() })?,
            };
            if index > arr.len().saturating_add(MAX_ARRAY_GAP) {
                return Err(FormError::invalid_path(
                    &segment.to_string(),
                    format!("index {} is too far past the end of an array of length {}", index, arr.len()),
                ));
            }
            if arr.len() <= index {
                arr.resize(index + 1, Value::Null);
            }
            Ok(&mut arr[index])
        }
        other => Err(FormError::NotAnObject(json_type_name(other).to_string())),
    }
}
