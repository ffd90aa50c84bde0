use std::cmp::Ordering;
use std::fmt::Display;

use crate::collection::Document;
use crate::common::{compare_same_family, Value};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

use super::pattern_filters::RegexMatcher;
use super::MatchContext;

/// One operator applied to the value at a field path.
///
/// Parsed once from the operator document of a field expression, then
/// evaluated against a [MatchContext] per candidate document.
#[derive(Clone)]
pub(crate) enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    /// Each candidate is an `Eq` or a `Regex` condition.
    In(Vec<Condition>),
    Nin(Vec<Condition>),
    Exists(bool),
    Not(Vec<Condition>),
    All(Vec<Value>),
    Regex(RegexMatcher),
}

impl Condition {
    /// Parses the value a field expression maps to.
    ///
    /// An operator document yields one condition per operator; a regex literal
    /// is an implicit `$regex`; anything else is an implicit `$eq`.
    pub(crate) fn parse_expression(field: &str, value: &Value) -> BsoniteResult<Vec<Condition>> {
        match value {
            Value::Regex(literal) => Ok(vec![Condition::Regex(RegexMatcher::new(literal.clone())?)]),
            Value::Document(operators) if is_operator_document(operators) => {
                if let Some(key) = operators.keys().find(|key| !key.starts_with('$')) {
                    log::error!("Field expression for '{}' mixes operators with field '{}'", field, key);
                    return Err(BsoniteError::new(
                        &format!("unknown operator: {}", key),
                        ErrorKind::BadValue,
                    ));
                }
                parse_operators(field, operators)
            }
            other => Ok(vec![Condition::Eq(other.clone())]),
        }
    }

    pub(crate) fn matches(&self, ctx: &MatchContext) -> bool {
        match self {
            Condition::Eq(expected) => eq_matches(ctx, expected),
            Condition::Ne(expected) => !eq_matches(ctx, expected),
            Condition::Gt(bound) => range_matches(ctx, bound, |o| o == Ordering::Greater),
            Condition::Gte(bound) => range_matches(ctx, bound, |o| o != Ordering::Less),
            Condition::Lt(bound) => range_matches(ctx, bound, |o| o == Ordering::Less),
            Condition::Lte(bound) => range_matches(ctx, bound, |o| o != Ordering::Greater),
            Condition::In(candidates) => candidates.iter().any(|c| c.matches(ctx)),
            Condition::Nin(candidates) => !candidates.iter().any(|c| c.matches(ctx)),
            Condition::Exists(expected) => ctx.exists() == *expected,
            Condition::Not(conditions) => !conditions.iter().all(|c| c.matches(ctx)),
            Condition::All(required) => all_matches(ctx, required),
            Condition::Regex(matcher) => any_value(ctx, |value| matcher.is_match(value)),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Eq(v) => write!(f, "== {}", v),
            Condition::Ne(v) => write!(f, "!= {}", v),
            Condition::Gt(v) => write!(f, "> {}", v),
            Condition::Gte(v) => write!(f, ">= {}", v),
            Condition::Lt(v) => write!(f, "< {}", v),
            Condition::Lte(v) => write!(f, "<= {}", v),
            Condition::In(c) => write!(f, "in [{}]", join(c)),
            Condition::Nin(c) => write!(f, "not in [{}]", join(c)),
            Condition::Exists(b) => write!(f, "exists {}", b),
            Condition::Not(c) => write!(f, "not ({})", join(c)),
            Condition::All(v) => write!(f, "all {}", Value::Array(v.clone())),
            Condition::Regex(m) => write!(f, "=~ {}", m),
        }
    }
}

fn join(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// True when at least one key starts with `$`.
pub(crate) fn is_operator_document(doc: &Document) -> bool {
    doc.keys().any(|key| key.starts_with('$'))
}

fn parse_operators(field: &str, operators: &Document) -> BsoniteResult<Vec<Condition>> {
    let options = operators.get("$options");
    if options.is_some() && !operators.contains_key("$regex") {
        log::error!("$options without $regex for field '{}'", field);
        return Err(BsoniteError::new("$options needs a $regex", ErrorKind::BadValue));
    }

    let mut conditions = Vec::with_capacity(operators.size());
    for (operator, operand) in operators.iter() {
        let condition = match operator.as_str() {
            "$eq" => Condition::Eq(operand.clone()),
            "$ne" => Condition::Ne(operand.clone()),
            "$gt" => Condition::Gt(operand.clone()),
            "$gte" => Condition::Gte(operand.clone()),
            "$lt" => Condition::Lt(operand.clone()),
            "$lte" => Condition::Lte(operand.clone()),
            "$in" => Condition::In(parse_candidates(operator, operand)?),
            "$nin" => Condition::Nin(parse_candidates(operator, operand)?),
            "$exists" => Condition::Exists(operand.is_truthy()),
            "$not" => Condition::Not(parse_not(field, operand)?),
            "$all" => Condition::All(array_operand(operator, operand)?.clone()),
            "$regex" => Condition::Regex(RegexMatcher::from_operands(operand, options)?),
            "$options" => continue,
            unknown => {
                log::error!("Unknown query operator {} for field '{}'", unknown, field);
                return Err(BsoniteError::new(
                    &format!("unknown operator: {}", unknown),
                    ErrorKind::BadValue,
                ));
            }
        };
        conditions.push(condition);
    }
    Ok(conditions)
}

fn parse_not(field: &str, operand: &Value) -> BsoniteResult<Vec<Condition>> {
    match operand {
        Value::Regex(literal) => Ok(vec![Condition::Regex(RegexMatcher::new(literal.clone())?)]),
        Value::Document(inner) => {
            if inner.is_empty() {
                log::error!("Empty $not for field '{}'", field);
                return Err(BsoniteError::new("$not cannot be empty", ErrorKind::BadValue));
            }
            if let Some(key) = inner.keys().find(|key| !key.starts_with('$')) {
                log::error!("$not for field '{}' contains non-operator key '{}'", field, key);
                return Err(BsoniteError::new(
                    &format!("unknown operator: {}", key),
                    ErrorKind::BadValue,
                ));
            }
            if inner.contains_key("$regex") {
                log::error!("$not for field '{}' contains $regex", field);
                return Err(BsoniteError::new(
                    "$not cannot have a regex",
                    ErrorKind::BadValue,
                ));
            }
            parse_operators(field, inner)
        }
        other => {
            log::error!("$not for field '{}' given {}", field, other.type_name());
            Err(BsoniteError::new(
                "$not needs a regex or a document",
                ErrorKind::BadValue,
            ))
        }
    }
}

fn parse_candidates(operator: &str, operand: &Value) -> BsoniteResult<Vec<Condition>> {
    array_operand(operator, operand)?
        .iter()
        .map(|candidate| match candidate {
            Value::Regex(literal) => Ok(Condition::Regex(RegexMatcher::new(literal.clone())?)),
            other => Ok(Condition::Eq(other.clone())),
        })
        .collect()
}

fn array_operand<'a>(operator: &str, operand: &'a Value) -> BsoniteResult<&'a Vec<Value>> {
    operand.as_array().ok_or_else(|| {
        log::error!("{} given {} instead of an array", operator, operand.type_name());
        BsoniteError::new(&format!("{} needs an array", operator), ErrorKind::BadValue)
    })
}

/// Applies `predicate` to the value, then to each element when it is an array.
fn any_value(ctx: &MatchContext, predicate: impl Fn(&Value) -> bool) -> bool {
    if !ctx.exists() {
        return false;
    }
    let value = ctx.value();
    predicate(value)
        || matches!(value, Value::Array(items) if items.iter().any(|item| predicate(item)))
}

fn eq_matches(ctx: &MatchContext, expected: &Value) -> bool {
    if !ctx.exists() {
        return expected.is_null();
    }
    any_value(ctx, |value| value == expected)
}

fn range_matches(
    ctx: &MatchContext,
    bound: &Value,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    any_value(ctx, |value| {
        compare_same_family(value, bound).is_some_and(|ordering| accept(ordering))
    })
}

fn all_matches(ctx: &MatchContext, required: &[Value]) -> bool {
    match ctx.value() {
        Value::Array(items) if ctx.exists() => {
            !required.is_empty() && required.iter().all(|value| items.contains(value))
        }
        _ => false,
    }
}
