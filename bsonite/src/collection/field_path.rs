use smallvec::SmallVec;
use std::fmt::Display;

use crate::collection::Document;
use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

type Segments = SmallVec<[String; 4]>;

/// Most null slots a single set may add when it writes past the end of an array.
pub const MAX_ARRAY_PADDING: usize = 1_500_000;

/// A dotted path such as `a.b.2`, parsed once into segments.
///
/// A segment made only of ASCII digits addresses an array slot when the value
/// it meets is an array; against a document it is an ordinary key.
///
/// The three accessors never fail on a missing path:
///
/// * [FieldPath::get] reports `None` when any segment is missing, out of range
///   or meets an atomic value.
/// * [FieldPath::set] creates intermediate documents and pads arrays with
///   nulls, failing only when it would have to traverse an atomic value, use
///   a non-numeric segment on an array or pad more than [MAX_ARRAY_PADDING]
///   slots.
/// * [FieldPath::delete] removes the last key, or nulls the last array slot,
///   and silently does nothing when the path does not resolve.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Segments,
}

impl FieldPath {
    pub fn parse(path: &str) -> FieldPath {
        FieldPath {
            raw: path.to_string(),
            segments: path.split(FIELD_SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, the top-level key the path starts from.
    pub fn head(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }

    /// True when no segment is empty.
    pub fn is_valid(&self) -> bool {
        self.segments.iter().all(|segment| !segment.is_empty())
    }

    /// Fails with `BadValue` if any segment is empty.
    pub fn validate(&self) -> BsoniteResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            log::error!("Field path '{}' contains an empty segment", self.raw);
            Err(BsoniteError::new(
                &format!("The update path '{}' contains an empty field name, which is not allowed.", self.raw),
                ErrorKind::BadValue,
            ))
        }
    }

    /// Reads the value at this path. `None` means missing.
    pub fn get<'a>(&self, doc: &'a Document) -> Option<&'a Value> {
        let (head, rest) = self.segments.split_first()?;
        let mut current = doc.get(head)?;
        for segment in rest {
            current = match current {
                Value::Document(inner) => inner.get(segment)?,
                Value::Array(items) => items.get(parse_index(segment)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable variant of [FieldPath::get], used by in-place array operators.
    pub fn get_mut<'a>(&self, doc: &'a mut Document) -> Option<&'a mut Value> {
        let (head, rest) = self.segments.split_first()?;
        let mut current = doc.get_mut(head)?;
        for segment in rest {
            current = match current {
                Value::Document(inner) => inner.get_mut(segment)?,
                Value::Array(items) => items.get_mut(parse_index(segment)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Writes `value` at this path.
    pub fn set(&self, doc: &mut Document, value: Value) -> BsoniteResult<()> {
        self.validate()?;
        set_in_document(doc, &self.segments, value, self)
    }

    /// Deletes the value at this path. Never fails.
    pub fn delete(&self, doc: &mut Document) {
        if !self.is_valid() {
            return;
        }
        delete_in_document(doc, &self.segments);
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl std::fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldPath({})", self.raw)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::parse(path)
    }
}

/// Parses a non-negative integer literal array index.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn set_in_document(
    doc: &mut Document,
    segments: &[String],
    value: Value,
    path: &FieldPath,
) -> BsoniteResult<()> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };

    if rest.is_empty() {
        doc.put(head.as_str(), value);
        return Ok(());
    }

    let child = doc.get_or_insert_with(head, || Value::Document(Document::new()));
    set_in_value(child, head, rest, value, path)
}

fn set_in_value(
    current: &mut Value,
    current_key: &str,
    segments: &[String],
    value: Value,
    path: &FieldPath,
) -> BsoniteResult<()> {
    match current {
        Value::Document(doc) => set_in_document(doc, segments, value, path),
        Value::Array(items) => {
            let Some((head, rest)) = segments.split_first() else {
                return Ok(());
            };
            let index = parse_index(head).ok_or_else(|| {
                log::error!("Cannot use non-numeric segment '{}' of '{}' on an array", head, path);
                BsoniteError::new(
                    &format!(
                        "cannot use the part ({} of {}) to traverse the element ({}: array)",
                        head, path, current_key
                    ),
                    ErrorKind::TraversalError,
                )
            })?;

            if index.saturating_sub(items.len()) > MAX_ARRAY_PADDING {
                log::error!("Refusing to pad '{}' of '{}' to index {}", current_key, path, index);
                return Err(BsoniteError::new(
                    &format!(
                        "can't backfill more than {} elements (index {} of {})",
                        MAX_ARRAY_PADDING, index, path
                    ),
                    ErrorKind::BadValue,
                ));
            }

            if items.len() <= index {
                items.resize(index, Value::Null);
                if rest.is_empty() {
                    items.push(Value::Null);
                } else {
                    items.push(Value::Document(Document::new()));
                }
            }

            if rest.is_empty() {
                items[index] = value;
                Ok(())
            } else {
                set_in_value(&mut items[index], head, rest, value, path)
            }
        }
        other => {
            let part = segments.first().map(String::as_str).unwrap_or("");
            log::error!("Cannot traverse {} value at '{}' while setting '{}'", other.type_name(), current_key, path);
            Err(BsoniteError::new(
                &format!(
                    "cannot use the part ({} of {}) to traverse the element ({}: {})",
                    part,
                    path,
                    current_key,
                    other.type_name()
                ),
                ErrorKind::TraversalError,
            ))
        }
    }
}

fn delete_in_document(doc: &mut Document, segments: &[String]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        doc.remove(head);
    } else if let Some(child) = doc.get_mut(head) {
        delete_in_value(child, rest);
    }
}

fn delete_in_value(current: &mut Value, segments: &[String]) {
    match current {
        Value::Document(doc) => delete_in_document(doc, segments),
        Value::Array(items) => {
            let Some((head, rest)) = segments.split_first() else {
                return;
            };
            let Some(index) = parse_index(head) else {
                return;
            };
            let Some(slot) = items.get_mut(index) else {
                return;
            };
            if rest.is_empty() {
                *slot = Value::Null;
            } else {
                delete_in_value(slot, rest);
            }
        }
        _ => {}
    }
}
