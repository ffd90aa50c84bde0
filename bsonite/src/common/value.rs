use crate::collection::{Document, ObjectId};
use crate::common::compare_values;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Compare two numbers for equality with NaN equal to itself.
#[inline]
fn num_eq(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Represents a [Document] value.
///
/// The variants mirror the BSON types a legacy driver exchanges with the
/// server. Numbers are untyped: every integer or floating point input is held
/// as an `f64`, and the wire codec decides the encoded width.
///
/// # Usage
/// Create values using the `From` trait or the `val!` macro:
/// ```text
/// let v1: Value = 42.into();           // Number(42.0)
/// let v2 = Value::from("hello");       // String
/// let v3 = val!(true);                 // Bool
/// let doc = doc! { "age": 42, "name": "Alice" };
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a number. Integral and fractional numbers share this variant.
    Number(f64),
    /// Represents a string value.
    String(String),
    /// Represents a UTC timestamp with millisecond precision.
    Date(DateTime<Utc>),
    /// Represents a 12-byte object id.
    ObjectId(ObjectId),
    /// Represents an array value.
    Array(Vec<Value>),
    /// Represents an embedded document.
    Document(Document),
    /// Represents a regular expression literal.
    Regex(RegexValue),
}

/// A regular expression literal: source pattern plus option flags.
///
/// The literal is kept uncompiled so it can be stored, compared and sent over
/// the wire unchanged. [RegexValue::compile] builds the matcher and is where
/// unsupported flags are rejected.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RegexValue {
    pattern: String,
    options: String,
}

impl RegexValue {
    pub fn new(pattern: &str, options: &str) -> Self {
        RegexValue {
            pattern: pattern.to_string(),
            options: options.to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    /// Compiles the literal, accepting only the `i` and `m` flags.
    pub fn compile(&self) -> BsoniteResult<regex::Regex> {
        let mut builder = regex::RegexBuilder::new(&self.pattern);
        for flag in self.options.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                other => {
                    log::error!("Invalid flag '{}' in regex options of /{}/", other, self.pattern);
                    return Err(BsoniteError::new(
                        &format!("invalid flag in regex options: {}", other),
                        ErrorKind::BadValue,
                    ));
                }
            }
        }
        builder.build().map_err(|err| {
            log::error!("Invalid regular expression /{}/: {}", self.pattern, err);
            BsoniteError::from(err)
        })
    }
}

impl Display for RegexValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.options)
    }
}

impl Debug for RegexValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "regex(/{}/{})", self.pattern, self.options)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => num_eq(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::ObjectId(a), Value::ObjectId(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(self, other)
    }
}

impl Value {
    /// Creates a new [Value] from the given [Option] value. [None] becomes [Value::Null].
    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Value {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }

    /// Creates an array [Value] from a vector of convertible items.
    pub fn from_vec<T: Into<Value>>(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(|v| v.into()).collect())
    }

    /// The runtime type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::ObjectId(_) => "objectId",
            Value::Array(_) => "array",
            Value::Document(_) => "object",
            Value::Regex(_) => "regex",
        }
    }

    /// Truthiness as used by `$cond` and projection specs.
    ///
    /// `false`, `0` and `null` are false. Everything else is true, including
    /// empty arrays, empty documents and the epoch date.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            _ => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number as an integer when it has no fractional part.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Value::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&RegexValue> {
        match self {
            Value::Regex(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    /// Moves the value out, leaving [Value::Null] behind.
    pub fn take(&mut self) -> Value {
        std::mem::replace(self, Value::Null)
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Number(v) => v.to_string(),
            Value::String(v) => format!("\"{}\"", v),
            Value::Date(v) => format!(
                "ISODate(\"{}\")",
                v.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            Value::ObjectId(v) => format!("ObjectId(\"{}\")", v),
            Value::Array(v) => {
                if v.is_empty() {
                    return "[]".to_string();
                }

                let mut json_str = String::new();
                json_str.push_str("[\n");
                let indent_str = " ".repeat(indent + 2);
                for value in v {
                    json_str.push_str(&format!(
                        "{}{},\n",
                        indent_str,
                        value.to_pretty_json(indent + 2)
                    ));
                }
                json_str.pop(); // remove last newline
                json_str.pop(); // remove last comma
                json_str.push_str(&format!("\n{}]", " ".repeat(indent)));
                json_str
            }
            Value::Document(v) => v.to_pretty_json(indent),
            Value::Regex(v) => v.to_string(),
        }
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => format!("bool({})", v),
            Value::Number(v) => format!("number({})", v),
            Value::String(v) => format!("string(\"{}\")", v),
            Value::Date(v) => format!(
                "date({})",
                v.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            Value::ObjectId(v) => format!("object_id(\"{}\")", v),
            Value::Array(v) => {
                if v.is_empty() {
                    return "array([])".to_string();
                }

                let mut debug_str = String::new();
                debug_str.push_str("array([\n");
                let indent_str = " ".repeat(indent + 2);
                for value in v {
                    debug_str.push_str(&format!(
                        "{}{},\n",
                        indent_str,
                        value.to_debug_string(indent + 2)
                    ));
                }
                debug_str.pop(); // remove last newline
                debug_str.pop(); // remove last comma
                debug_str.push_str(&format!("\n{}])", " ".repeat(indent)));
                debug_str
            }
            Value::Document(v) => format!("object({})", v.to_debug_string(indent)),
            Value::Regex(v) => format!("{:?}", v),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(value: $t) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    };
}

number_from!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize, f32, f64);

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::ObjectId(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<RegexValue> for Value {
    fn from(value: RegexValue) -> Self {
        Value::Regex(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        Value::from_option(value)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::from_vec(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// A macro to create a `Value` from a given expression.
///
/// # Examples
///
/// ```rust
/// use bsonite::common::Value;
/// use bsonite::val;
///
/// let int_value = val!(42);
/// assert_eq!(int_value, Value::Number(42.0));
///
/// let string_value = val!("hello");
/// assert_eq!(string_value, Value::String("hello".to_string()));
/// ```
#[macro_export]
macro_rules! val {
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
