use crate::collection::{parse_index, Document, FieldPath};
use crate::common::Value;

/// The virtual value found at a path while matching a candidate document.
///
/// `exists` separates a missing field from one that is present and null.
/// When a non-numeric segment meets an array, the remaining path is resolved
/// against every document element and the hits are gathered into one array
/// value, with array hits flattened one level.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchContext {
    path: String,
    exists: bool,
    value: Value,
}

impl MatchContext {
    /// Resolves `path` against `doc`.
    pub fn resolve(doc: &Document, path: &FieldPath) -> MatchContext {
        let found = match path.segments().split_first() {
            Some((head, rest)) => doc.get(head).and_then(|value| descend(value, rest)),
            None => None,
        };

        match found {
            Some(value) => MatchContext {
                path: path.as_str().to_string(),
                exists: true,
                value,
            },
            None => MatchContext::missing(path.as_str()),
        }
    }

    /// A context for a standalone value, as used when matching array elements.
    pub fn of(value: &Value) -> MatchContext {
        MatchContext {
            path: String::new(),
            exists: true,
            value: value.clone(),
        }
    }

    pub fn missing(path: &str) -> MatchContext {
        MatchContext {
            path: path.to_string(),
            exists: false,
            value: Value::Null,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    /// The value at the path; `Null` when missing.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn descend(current: &Value, segments: &[String]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(current.clone());
    };

    match current {
        Value::Document(doc) => doc.get(head).and_then(|value| descend(value, rest)),
        Value::Array(items) => match parse_index(head) {
            Some(index) => items.get(index).and_then(|value| descend(value, rest)),
            None => {
                let mut collected = Vec::new();
                let mut found = false;
                for item in items.iter().filter(|item| item.is_document()) {
                    if let Some(value) = descend(item, segments) {
                        found = true;
                        match value {
                            Value::Array(inner) => collected.extend(inner),
                            other => collected.push(other),
                        }
                    }
                }
                found.then_some(Value::Array(collected))
            }
        },
        _ => None,
    }
}
