use std::fmt::Display;

use crate::collection::{Document, FieldPath};
use crate::common::Value;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};
use crate::filter::{Condition, MatchContext};

/// How `$pull` selects the elements it removes.
#[derive(Clone)]
pub(crate) enum PullMatcher {
    /// Elements deep-equal to the value.
    Equals(Value),
    /// Elements satisfying every condition of an operator document.
    Matches(Vec<Condition>),
}

impl PullMatcher {
    fn parse(path: &FieldPath, operand: &Value) -> BsoniteResult<PullMatcher> {
        match operand {
            Value::Document(operators) if operators.keys().any(|k| k.starts_with('$')) => Ok(
                PullMatcher::Matches(Condition::parse_expression(path.as_str(), operand)?),
            ),
            other => Ok(PullMatcher::Equals(other.clone())),
        }
    }

    fn is_match(&self, element: &Value) -> bool {
        match self {
            PullMatcher::Equals(expected) => element == expected,
            PullMatcher::Matches(conditions) => {
                let ctx = MatchContext::of(element);
                conditions.iter().all(|condition| condition.matches(&ctx))
            }
        }
    }
}

/// One field-level mutation of an operator-style update.
#[derive(Clone)]
pub(crate) enum Modifier {
    Set(FieldPath, Value),
    Unset(FieldPath),
    SetOnInsert(FieldPath, Value),
    Inc(FieldPath, f64),
    Mul(FieldPath, f64),
    Push(FieldPath, Vec<Value>),
    PushAll(FieldPath, Vec<Value>),
    AddToSet(FieldPath, Vec<Value>),
    Pull(FieldPath, PullMatcher),
    PullAll(FieldPath, Vec<Value>),
    /// `true` removes the first element, `false` the last one.
    Pop(FieldPath, bool),
    Rename(FieldPath, FieldPath),
}

impl Modifier {
    /// Parses one `{$op: {path: operand, ...}}` entry into its modifiers.
    pub(crate) fn parse(operator: &str, operand: &Value) -> BsoniteResult<Vec<Modifier>> {
        let Value::Document(fields) = operand else {
            log::error!("Modifier {} given {} instead of an object", operator, operand.type_name());
            return Err(BsoniteError::new(
                &format!("Modifier {} allowed for objects only", operator),
                ErrorKind::BadValue,
            ));
        };

        let mut modifiers = Vec::with_capacity(fields.size());
        for (field, value) in fields.iter() {
            let path = FieldPath::parse(field);
            path.validate()?;

            let modifier = match operator {
                "$set" => Modifier::Set(path, value.clone()),
                "$unset" => Modifier::Unset(path),
                "$setOnInsert" => Modifier::SetOnInsert(path, value.clone()),
                "$inc" => Modifier::Inc(path, numeric_operand(operator, field, value)?),
                "$mul" => Modifier::Mul(path, numeric_operand(operator, field, value)?),
                "$push" => Modifier::Push(path, each_operand(value)?),
                "$addToSet" => Modifier::AddToSet(path, each_operand(value)?),
                "$pushAll" => Modifier::PushAll(path, array_operand(operator, value)?),
                "$pullAll" => Modifier::PullAll(path, array_operand(operator, value)?),
                "$pull" => {
                    let matcher = PullMatcher::parse(&path, value)?;
                    Modifier::Pull(path, matcher)
                }
                "$pop" => {
                    let direction = numeric_operand(operator, field, value)?;
                    Modifier::Pop(path, direction < 0.0)
                }
                "$rename" => Modifier::Rename(path, rename_target(field, value)?),
                unknown => {
                    log::error!("Unknown update modifier {}", unknown);
                    return Err(BsoniteError::new(
                        &format!("Unknown modifier: {}", unknown),
                        ErrorKind::BadValue,
                    ));
                }
            };
            modifiers.push(modifier);
        }
        Ok(modifiers)
    }

    /// Applies the modifier to `doc`. `inserting` is true for a document being
    /// synthesized by an upsert.
    pub(crate) fn apply(&self, doc: &mut Document, inserting: bool) -> BsoniteResult<()> {
        match self {
            Modifier::Set(path, value) => path.set(doc, value.clone()),
            Modifier::Unset(path) => {
                path.delete(doc);
                Ok(())
            }
            Modifier::SetOnInsert(path, value) => {
                if inserting {
                    path.set(doc, value.clone())?;
                }
                Ok(())
            }
            Modifier::Inc(path, delta) => arithmetic(doc, path, "$inc", *delta, |n| n + delta),
            Modifier::Mul(path, factor) => arithmetic(doc, path, "$mul", 0.0, |n| n * factor),
            Modifier::Push(path, values) | Modifier::PushAll(path, values) => {
                with_array(doc, path, self.name(), Some(values), |items| {
                    items.extend(values.iter().cloned());
                })
            }
            Modifier::AddToSet(path, values) => {
                let mut distinct: Vec<Value> = Vec::with_capacity(values.len());
                for value in values {
                    if !distinct.contains(value) {
                        distinct.push(value.clone());
                    }
                }
                with_array(doc, path, "$addToSet", Some(&distinct), |items| {
                    for value in values {
                        if !items.contains(value) {
                            items.push(value.clone());
                        }
                    }
                })
            }
            Modifier::Pull(path, matcher) => {
                if path.get(doc).is_none() {
                    log::error!("Cannot apply $pull to missing field '{}'", path);
                    return Err(BsoniteError::new(
                        &format!(
                            "Cannot apply $pull to a non-array field. Field named '{}' is missing",
                            path
                        ),
                        ErrorKind::InputDataError,
                    ));
                }
                with_array(doc, path, "$pull", None, |items| {
                    items.retain(|item| !matcher.is_match(item));
                })
            }
            Modifier::PullAll(path, values) => with_array(doc, path, "$pullAll", None, |items| {
                items.retain(|item| !values.contains(item));
            }),
            Modifier::Pop(path, first) => with_array(doc, path, "$pop", None, |items| {
                if items.is_empty() {
                    return;
                }
                if *first {
                    items.remove(0);
                } else {
                    items.pop();
                }
            }),
            Modifier::Rename(from, to) => {
                let Some(value) = from.get(doc).cloned() else {
                    return Ok(());
                };
                from.delete(doc);
                to.set(doc, value)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Modifier::Set(..) => "$set",
            Modifier::Unset(..) => "$unset",
            Modifier::SetOnInsert(..) => "$setOnInsert",
            Modifier::Inc(..) => "$inc",
            Modifier::Mul(..) => "$mul",
            Modifier::Push(..) => "$push",
            Modifier::PushAll(..) => "$pushAll",
            Modifier::AddToSet(..) => "$addToSet",
            Modifier::Pull(..) => "$pull",
            Modifier::PullAll(..) => "$pullAll",
            Modifier::Pop(..) => "$pop",
            Modifier::Rename(..) => "$rename",
        }
    }

    fn path(&self) -> &FieldPath {
        match self {
            Modifier::Set(path, _)
            | Modifier::Unset(path)
            | Modifier::SetOnInsert(path, _)
            | Modifier::Inc(path, _)
            | Modifier::Mul(path, _)
            | Modifier::Push(path, _)
            | Modifier::PushAll(path, _)
            | Modifier::AddToSet(path, _)
            | Modifier::Pull(path, _)
            | Modifier::PullAll(path, _)
            | Modifier::Pop(path, _)
            | Modifier::Rename(path, _) => path,
        }
    }
}

impl Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name(), self.path())
    }
}

/// Replaces the number at `path` with `op(current)`; a missing field becomes
/// `missing_as`.
fn arithmetic(
    doc: &mut Document,
    path: &FieldPath,
    operator: &str,
    missing_as: f64,
    op: impl Fn(f64) -> f64,
) -> BsoniteResult<()> {
    let result = match path.get(doc) {
        None => missing_as,
        Some(Value::Number(current)) => op(*current),
        Some(other) => {
            log::error!("Cannot apply {} to {} field '{}'", operator, other.type_name(), path);
            return Err(BsoniteError::new(
                &format!(
                    "Cannot apply {} to a value of non-numeric type. The field '{}' has type {}",
                    operator,
                    path,
                    other.type_name()
                ),
                ErrorKind::InputDataError,
            ));
        }
    };
    path.set(doc, Value::Number(result))
}

/// Runs `mutate` on the array at `path`.
///
/// A missing field is set to `initial` when given and left alone otherwise.
/// A present non-array field is an input data error.
fn with_array(
    doc: &mut Document,
    path: &FieldPath,
    operator: &str,
    initial: Option<&Vec<Value>>,
    mutate: impl FnOnce(&mut Vec<Value>),
) -> BsoniteResult<()> {
    match path.get_mut(doc) {
        Some(Value::Array(items)) => {
            mutate(items);
            Ok(())
        }
        Some(other) => {
            log::error!("Cannot apply {} to {} field '{}'", operator, other.type_name(), path);
            Err(BsoniteError::new(
                &format!(
                    "Cannot apply {} to a non-array field. Field named '{}' has type {}",
                    operator,
                    path,
                    other.type_name()
                ),
                ErrorKind::InputDataError,
            ))
        }
        None => match initial {
            Some(values) => path.set(doc, Value::Array(values.clone())),
            None => Ok(()),
        },
    }
}

fn numeric_operand(operator: &str, field: &str, value: &Value) -> BsoniteResult<f64> {
    value.as_number().ok_or_else(|| {
        log::error!("{} on '{}' given {}", operator, field, value.type_name());
        BsoniteError::new(
            &format!("Modifier {} allowed for numbers only", operator),
            ErrorKind::BadValue,
        )
    })
}

fn array_operand(operator: &str, value: &Value) -> BsoniteResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        other => {
            log::error!("{} given {} instead of an array", operator, other.type_name());
            Err(BsoniteError::new(
                &format!("{} requires an array argument", operator),
                ErrorKind::BadValue,
            ))
        }
    }
}

/// `{$each: [..]}` expands to its elements; anything else is a single value.
fn each_operand(value: &Value) -> BsoniteResult<Vec<Value>> {
    match value {
        Value::Document(doc) if doc.contains_key("$each") => {
            if doc.size() > 1 {
                log::error!("$each used together with other modifiers: {}", doc);
                return Err(BsoniteError::new(
                    "$each cannot be combined with other modifiers",
                    ErrorKind::BadValue,
                ));
            }
            match doc.get("$each") {
                Some(each) => array_operand("$each", each),
                None => Ok(Vec::new()),
            }
        }
        other => Ok(vec![other.clone()]),
    }
}

fn rename_target(field: &str, value: &Value) -> BsoniteResult<FieldPath> {
    let Value::String(target) = value else {
        log::error!("$rename of '{}' given {} target", field, value.type_name());
        return Err(BsoniteError::new(
            "The 'to' field for $rename must be a string",
            ErrorKind::BadValue,
        ));
    };
    if target == field {
        log::error!("$rename of '{}' onto itself", field);
        return Err(BsoniteError::new(
            "The source and target field for $rename must differ",
            ErrorKind::BadValue,
        ));
    }
    let path = FieldPath::parse(target);
    path.validate()?;
    Ok(path)
}
