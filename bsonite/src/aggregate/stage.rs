use std::fmt::Display;

use itertools::Itertools;

use crate::collection::{Document, FieldPath};
use crate::common::{compare_values, Value};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};
use crate::filter::Filter;
use crate::projection::Projection;

use super::group::GroupStage;
use super::pipeline_error;

/// One stage of an aggregation pipeline.
#[derive(Clone)]
pub(crate) enum Stage {
    Match(Filter),
    Group(GroupStage),
    Project(Projection),
    /// Sort keys with `true` for ascending.
    Sort(Vec<(FieldPath, bool)>),
    Skip(usize),
    Limit(usize),
}

impl Stage {
    /// Parses the stage document at position `index` of a pipeline.
    pub(crate) fn parse(index: usize, spec: &Value) -> BsoniteResult<Stage> {
        let stage = match spec {
            Value::Document(stage) if stage.size() == 1 => stage,
            _ => {
                return Err(pipeline_error(
                    16435,
                    format!(
                        "stage {}: A pipeline stage specification object must contain exactly one field.",
                        index
                    ),
                ))
            }
        };

        let Some((name, operand)) = stage.iter().next() else {
            return Err(pipeline_error(
                16435,
                format!(
                    "stage {}: A pipeline stage specification object must contain exactly one field.",
                    index
                ),
            ));
        };

        match name.as_str() {
            "$match" => match operand {
                Value::Document(query) => Ok(Stage::Match(Filter::parse(query)?)),
                _ => Err(pipeline_error(
                    15959,
                    "the match filter must be an expression in an object".to_string(),
                )),
            },
            "$group" => Ok(Stage::Group(GroupStage::parse(operand)?)),
            "$project" => match operand {
                Value::Document(spec) => Ok(Stage::Project(Projection::parse(spec)?)),
                _ => Err(pipeline_error(
                    15969,
                    "$project specification must be an object".to_string(),
                )),
            },
            "$sort" => Ok(Stage::Sort(parse_sort(operand)?)),
            "$skip" => Ok(Stage::Skip(parse_count("$skip", operand)?)),
            "$limit" => Ok(Stage::Limit(parse_count("$limit", operand)?)),
            unknown => Err(pipeline_error(
                16436,
                format!("Unrecognized pipeline stage name: '{}'", unknown),
            )),
        }
    }

    pub(crate) fn run(&self, docs: Vec<Document>) -> BsoniteResult<Vec<Document>> {
        match self {
            Stage::Match(filter) => {
                let mut matched = Vec::with_capacity(docs.len());
                for doc in docs {
                    if filter.apply(&doc)? {
                        matched.push(doc);
                    }
                }
                Ok(matched)
            }
            Stage::Group(group) => group.run(docs),
            Stage::Project(projection) => projection.apply_all(docs),
            Stage::Sort(keys) => Ok(docs
                .into_iter()
                .sorted_by(|a, b| {
                    keys.iter()
                        .map(|(path, ascending)| {
                            let left = path.get(a).unwrap_or(&Value::Null);
                            let right = path.get(b).unwrap_or(&Value::Null);
                            let ordering = compare_values(left, right);
                            if *ascending {
                                ordering
                            } else {
                                ordering.reverse()
                            }
                        })
                        .find(|ordering| ordering.is_ne())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .collect()),
            Stage::Skip(count) => Ok(docs.into_iter().skip(*count).collect()),
            Stage::Limit(count) => Ok(docs.into_iter().take(*count).collect()),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Match(filter) => write!(f, "$match {}", filter),
            Stage::Group(_) => write!(f, "$group"),
            Stage::Project(projection) => write!(f, "$project {}", projection),
            Stage::Sort(keys) => write!(
                f,
                "$sort {}",
                keys.iter()
                    .map(|(path, ascending)| format!("{} {}", path, if *ascending { 1 } else { -1 }))
                    .join(", ")
            ),
            Stage::Skip(count) => write!(f, "$skip {}", count),
            Stage::Limit(count) => write!(f, "$limit {}", count),
        }
    }
}

fn parse_sort(operand: &Value) -> BsoniteResult<Vec<(FieldPath, bool)>> {
    let Value::Document(spec) = operand else {
        log::error!("$sort given {}", operand.type_name());
        return Err(BsoniteError::new(
            "the $sort key specification must be an object",
            ErrorKind::BadValue,
        )
        .with_code(15973));
    };
    if spec.is_empty() {
        log::error!("$sort given an empty specification");
        return Err(BsoniteError::new(
            "$sort stage must have at least one sort key",
            ErrorKind::BadValue,
        )
        .with_code(15976));
    }

    spec.iter()
        .map(|(field, direction)| match direction.as_integer() {
            Some(1) => Ok((FieldPath::parse(field), true)),
            Some(-1) => Ok((FieldPath::parse(field), false)),
            _ => {
                log::error!("$sort direction for '{}' is {}", field, direction);
                Err(BsoniteError::new(
                    "$sort key ordering must be 1 (for ascending) or -1 (for descending)",
                    ErrorKind::BadValue,
                )
                .with_code(15975))
            }
        })
        .collect()
}

fn parse_count(stage: &str, operand: &Value) -> BsoniteResult<usize> {
    match operand.as_integer() {
        Some(count) if count >= 0 => Ok(count as usize),
        _ => {
            log::error!("{} given {}", stage, operand);
            Err(BsoniteError::new(
                &format!("{} must be a non-negative integer", stage),
                ErrorKind::BadValue,
            ))
        }
    }
}
