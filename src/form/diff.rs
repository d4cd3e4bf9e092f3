use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::form::path::PathSegment;

/// What happened at a difference entry's path, going from `lhs` to `rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DiffKind {
    /// Present only on the right.
    #[serde(rename = "N")]
    New { rhs: Value },
    #[serde(rename = "E")]
    Edited { lhs: Value, rhs: Value },
    /// Present only on the left.
    #[serde(rename = "D")]
    Deleted { lhs: Value },
    /// An array grew or shrank at `index`; `item` is `New` or `Deleted`.
    #[serde(rename = "A")]
    Array { index: usize, item: Box<DiffKind> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceEntry {
    pub path: Vec<PathSegment>,
    #[serde(flatten)]
    pub kind: DiffKind,
}

impl DifferenceEntry {
    pub fn new(path: Vec<PathSegment>, kind: DiffKind) -> Self {
        Self { path, kind }
    }

    /// Full leaf path and value to write, for entries that add or change a value.
    ///
    /// Deletions and array shrinks yield `None`.
    pub fn applicable_change(&self) -> Option<(Vec<PathSegment>, &Value)> {
        match &self.kind {
            DiffKind::New { rhs } | DiffKind::Edited { rhs, .. } => Some((self.path.clone(), rhs)),
            DiffKind::Array { index, item } => match item.as_ref() {
                DiffKind::New { rhs } => {
                    let mut path = self.path.clone();
                    path.push(PathSegment::Index(*index));
                    Some((path, rhs))
                }
                _ => None,
            },
            DiffKind::Deleted { .. } => None,
        }
    }
}

/// Leaf-level differences going from `lhs` to `rhs`, in document order.
pub fn diff(lhs: &Value, rhs: &Value) -> Vec<DifferenceEntry> {
    let mut entries = Vec::new();
    let mut path = Vec::new();
    walk(lhs, rhs, &mut path, &mut entries);
    entries
}

fn walk(lhs: &Value, rhs: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<DifferenceEntry>) {
    match (lhs, rhs) {
        (Value::Object(left), Value::Object(right)) => {
            for (key, left_value) in left {
                path.push(PathSegment::Key(key.clone()));
                match right.get(key) {
                    Some(right_value) => walk(left_value, right_value, path, out),
                    None => out.push(DifferenceEntry::new(
                        path.clone(),
                        DiffKind::Deleted { lhs: left_value.clone() },
                    )),
                }
                path.pop();
            }
            for (key, right_value) in right {
                if !left.contains_key(key) {
                    path.push(PathSegment::Key(key.clone()));
                    out.push(DifferenceEntry::new(
                        path.clone(),
                        DiffKind::New { rhs: right_value.clone() },
                    ));
                    path.pop();
                }
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            let common = left.len().min(right.len());
            for i in 0..common {
                path.push(PathSegment::Index(i));
                walk(&left[i], &right[i], path, out);
                path.pop();
            }
            for (offset, removed) in left[common..].iter().enumerate() {
                out.push(DifferenceEntry::new(
                    path.clone(),
                    DiffKind::Array {
                        index: common + offset,
                        item: Box::new(DiffKind::Deleted { lhs: removed.clone() }),
                    },
                ));
            }
            for (offset, added) in right[common..].iter().enumerate() {
                out.push(DifferenceEntry::new(
                    path.clone(),
                    DiffKind::Array {
                        index: common + offset,
                        item: Box::new(DiffKind::New { rhs: added.clone() }),
                    },
                ));
            }
        }
        (l, r) if l != r => out.push(DifferenceEntry::new(
            path.clone(),
            DiffKind::Edited { lhs: l.clone(), rhs: r.clone() },
        )),
        _ => {}
    }
}
