use crate::collection::Document;
use crate::common::Value;
use std::cmp::Ordering;

/// Type rank of a value in the full order.
///
/// Null < Number < String < Document < Array < ObjectId < Bool < Date < Regex.
pub fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Document(_) => 3,
        Value::Array(_) => 4,
        Value::ObjectId(_) => 5,
        Value::Bool(_) => 6,
        Value::Date(_) => 7,
        Value::Regex(_) => 8,
    }
}

/// NaN sorts below every other number and equal to itself.
#[inline]
fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// The full-order comparator over typed values.
///
/// Values of different types order by [type_rank]. Within a type, scalars use
/// their native order, documents compare field by field in insertion order
/// (key first, then value) and arrays compare element-wise; in both cases a
/// strict prefix ranks lower.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(*x, *y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Document(x), Value::Document(y)) => compare_documents(x, y),
        (Value::Array(x), Value::Array(y)) => compare_arrays(x, y),
        (Value::ObjectId(x), Value::ObjectId(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Regex(x), Value::Regex(y)) => x
            .pattern()
            .cmp(y.pattern())
            .then_with(|| x.options().cmp(y.options())),
        _ => Ordering::Equal,
    }
}

/// Compares two documents field by field in insertion order.
pub fn compare_documents(a: &Document, b: &Document) -> Ordering {
    for ((key_a, value_a), (key_b, value_b)) in a.iter().zip(b.iter()) {
        let ordering = key_a
            .cmp(key_b)
            .then_with(|| compare_values(value_a, value_b));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.size().cmp(&b.size())
}

fn compare_arrays(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ordering = compare_values(x, y);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

/// Orders two values only when they belong to the same comparable family.
///
/// The families are Number, String, Date, ObjectId and Bool. Any other pairing,
/// and any comparison involving NaN, yields `None`, which range operators treat
/// as a non-match.
pub fn compare_same_family(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::ObjectId(x), Value::ObjectId(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Maps an ordering to the -1/0/1 convention of `$cmp`.
pub fn ordering_to_int(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}
