use indexmap::map::{IntoIter, Iter, IterMut};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

use crate::collection::FieldPath;
use crate::common::{compare_documents, Value, DOC_ID};
use crate::errors::BsoniteResult;

/// Represents a document in the store.
///
/// A document is an ordered mapping of string keys to [Value]s. Field order is
/// significant: it decides how two documents compare, and replacement updates
/// keep the surviving fields where they were.
///
/// Keys are taken literally by [Document::put] and [Document::get]. Dotted
/// paths such as `a.b.2` go through [Document::get_path],
/// [Document::set_path] and [Document::remove_path], which delegate to
/// [FieldPath].
///
/// Two documents are equal only when they hold the same keys in the same order
/// with equal values.
#[derive(Clone, Default)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert!(doc.is_empty());
    /// assert_eq!(doc.size(), 0);
    /// ```
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified top-level key.
    ///
    /// An existing key keeps its position and gets the new value; a new key
    /// is appended.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Alice");
    /// doc.put("a.b", 1); // a literal key named "a.b"
    /// ```
    pub fn put<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Inserts a key at the front of the document, as `_id` is placed on insert.
    pub fn put_first<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) {
        self.data.shift_insert(0, key.into(), value.into());
    }

    /// Returns the value of a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Returns the value under `key`, inserting the result of `default` first if absent.
    pub(crate) fn get_or_insert_with(
        &mut self,
        key: &str,
        default: impl FnOnce() -> Value,
    ) -> &mut Value {
        self.data.entry(key.to_string()).or_insert_with(default)
    }

    /// Removes a top-level key, keeping the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the `_id` of the document, if present.
    pub fn id(&self) -> Option<&Value> {
        self.data.get(DOC_ID)
    }

    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// Returns the top-level keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.data.values()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, String, Value> {
        self.data.iter_mut()
    }

    /// Keeps only the entries for which the predicate returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.data.retain(|key, value| keep(key, value));
    }

    /// Copies every entry of `other` into this document.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Reads a dotted path. `None` means the path is missing.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        FieldPath::parse(path).get(self)
    }

    /// Writes a dotted path, creating intermediate documents.
    pub fn set_path<T: Into<Value>>(&mut self, path: &str, value: T) -> BsoniteResult<()> {
        FieldPath::parse(path).set(self, value.into())
    }

    /// Deletes a dotted path. Never fails.
    pub fn remove_path(&mut self, path: &str) {
        FieldPath::parse(path).delete(self)
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut json_string = String::with_capacity(self.data.len() * 30 + indent * 2);
        json_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            json_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_pretty_json(indent + 2)
            ));
        }

        json_string.pop();
        json_string.pop();
        json_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        json_string
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut debug_string = String::new();
        debug_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            debug_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_debug_string(indent + 2)
            ));
        }

        debug_string.pop();
        debug_string.pop();
        debug_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        debug_string
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_documents(self, other)
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Strips the quotes `stringify!` leaves around string-literal keys.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a Document with JSON-like syntax.
///
/// Negative numbers and other multi-token expressions go in parentheses.
/// `null` is accepted as a value.
///
/// # Examples
///
/// ```rust
/// use bsonite::doc;
///
/// let empty = doc!{};
///
/// let update = doc!{
///     "$set": { "a.b": 1 },
///     "$pull": { tags: "old" },
/// };
///
/// let sort = doc!{ age: (-1), name: 1 };
///
/// let nested = doc!{
///     user: {
///         name: "Charlie",
///         tags: ["admin", "user"],
///         manager: null
///     }
/// };
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    (null) => {
        $crate::common::Value::Null
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
