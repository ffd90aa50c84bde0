use bson::Bson;
use chrono::{TimeZone, Utc};

use crate::collection::{Document, ObjectId};
use crate::common::{RegexValue, Value};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

/// Converts a value to BSON.
///
/// Integral numbers that fit an int32 become `Int32`. Every other number,
/// negative zero included, is a `Double`.
pub fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            let negative_zero = *n == 0.0 && n.is_sign_negative();
            if !negative_zero && n.fract() == 0.0 && *n >= i32::MIN as f64 && *n <= i32::MAX as f64 {
                Bson::Int32(*n as i32)
            } else {
                Bson::Double(*n)
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Date(date) => Bson::DateTime(bson::DateTime::from_millis(date.timestamp_millis())),
        Value::ObjectId(id) => Bson::ObjectId(bson::oid::ObjectId::from_bytes(id.bytes())),
        Value::Array(items) => Bson::Array(items.iter().map(to_bson).collect()),
        Value::Document(doc) => Bson::Document(to_bson_document(doc)),
        Value::Regex(regex) => Bson::RegularExpression(bson::Regex {
            pattern: regex.pattern().to_string(),
            options: regex.options().to_string(),
        }),
    }
}

pub fn to_bson_document(doc: &Document) -> bson::Document {
    let mut converted = bson::Document::new();
    for (key, value) in doc.iter() {
        converted.insert(key.clone(), to_bson(value));
    }
    converted
}

/// Converts BSON to a value. `Int32`, `Int64` and `Double` all become numbers.
pub fn from_bson(bson: &Bson) -> BsoniteResult<Value> {
    Ok(match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::Number(*n as f64),
        Bson::Int64(n) => Value::Number(*n as f64),
        Bson::Double(n) => Value::Number(*n),
        Bson::String(s) => Value::String(s.clone()),
        Bson::DateTime(date) => {
            let millis = date.timestamp_millis();
            match Utc.timestamp_millis_opt(millis).single() {
                Some(date) => Value::Date(date),
                None => {
                    log::error!("BSON date {} is out of range", millis);
                    return Err(BsoniteError::new(
                        &format!("date {} is out of range", millis),
                        ErrorKind::EncodingError,
                    ));
                }
            }
        }
        Bson::ObjectId(id) => Value::ObjectId(ObjectId::from_bytes(id.bytes())),
        Bson::Array(items) => Value::Array(items.iter().map(from_bson).collect::<BsoniteResult<_>>()?),
        Bson::Document(doc) => Value::Document(from_bson_document(doc)?),
        Bson::RegularExpression(regex) => {
            Value::Regex(RegexValue::new(&regex.pattern, &regex.options))
        }
        other => {
            log::error!("Unsupported BSON element type {:?}", other.element_type());
            return Err(BsoniteError::new(
                &format!("unsupported BSON type {:?}", other.element_type()),
                ErrorKind::EncodingError,
            ));
        }
    })
}

pub fn from_bson_document(doc: &bson::Document) -> BsoniteResult<Document> {
    let mut converted = Document::new();
    for (key, value) in doc.iter() {
        converted.put(key.as_str(), from_bson(value)?);
    }
    Ok(converted)
}
