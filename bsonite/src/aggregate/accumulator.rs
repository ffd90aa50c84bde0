use std::cmp::Ordering;

use crate::collection::Document;
use crate::common::{compare_values, Value};
use crate::errors::BsoniteResult;

use super::expression::Expression;
use super::pipeline_error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AccumulatorOp {
    Sum,
    Avg,
    Min,
    Max,
    First,
    Last,
    Push,
    AddToSet,
}

impl AccumulatorOp {
    fn from_name(name: &str) -> Option<AccumulatorOp> {
        match name {
            "$sum" => Some(AccumulatorOp::Sum),
            "$avg" => Some(AccumulatorOp::Avg),
            "$min" => Some(AccumulatorOp::Min),
            "$max" => Some(AccumulatorOp::Max),
            "$first" => Some(AccumulatorOp::First),
            "$last" => Some(AccumulatorOp::Last),
            "$push" => Some(AccumulatorOp::Push),
            "$addToSet" => Some(AccumulatorOp::AddToSet),
            _ => None,
        }
    }
}

/// One computed field of a `$group` stage: `field: {$op: expression}`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Accumulator {
    field: String,
    op: AccumulatorOp,
    expression: Expression,
}

impl Accumulator {
    pub(crate) fn parse(field: &str, spec: &Value) -> BsoniteResult<Accumulator> {
        let Value::Document(spec) = spec else {
            return Err(pipeline_error(
                15951,
                format!(
                    "the group aggregate field '{}' must be defined as an expression inside an object",
                    field
                ),
            ));
        };
        if spec.size() != 1 {
            return Err(pipeline_error(
                15954,
                format!("the computed aggregate '{}' must specify exactly one operator", field),
            ));
        }

        let Some((name, argument)) = spec.iter().next() else {
            return Err(pipeline_error(
                15954,
                format!("the computed aggregate '{}' must specify exactly one operator", field),
            ));
        };
        let op = AccumulatorOp::from_name(name)
            .ok_or_else(|| pipeline_error(15952, format!("unknown group operator '{}'", name)))?;

        Ok(Accumulator {
            field: field.to_string(),
            op,
            expression: Expression::parse(argument)?,
        })
    }

    pub(crate) fn field(&self) -> &str {
        &self.field
    }

    pub(crate) fn new_state(&self) -> AccumulatorState {
        match self.op {
            AccumulatorOp::Sum => AccumulatorState::Sum(0.0),
            AccumulatorOp::Avg => AccumulatorState::Avg { sum: 0.0, count: 0 },
            AccumulatorOp::Min => AccumulatorState::Extremum {
                best: None,
                keep: Ordering::Less,
            },
            AccumulatorOp::Max => AccumulatorState::Extremum {
                best: None,
                keep: Ordering::Greater,
            },
            AccumulatorOp::First => AccumulatorState::First(None),
            AccumulatorOp::Last => AccumulatorState::Last(Value::Null),
            AccumulatorOp::Push => AccumulatorState::Push(Vec::new()),
            AccumulatorOp::AddToSet => AccumulatorState::AddToSet(Vec::new()),
        }
    }

    /// Feeds one document of the group into `state`.
    pub(crate) fn accumulate(&self, state: &mut AccumulatorState, doc: &Document) -> BsoniteResult<()> {
        let value = self.expression.evaluate_optional(doc)?;
        state.push(value);
        Ok(())
    }
}

/// Running state of one accumulator for one group.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum AccumulatorState {
    Sum(f64),
    Avg { sum: f64, count: usize },
    /// `keep` is the ordering a new value must have against `best` to replace it.
    Extremum { best: Option<Value>, keep: Ordering },
    First(Option<Value>),
    Last(Value),
    Push(Vec<Value>),
    AddToSet(Vec<Value>),
}

impl AccumulatorState {
    fn push(&mut self, value: Option<Value>) {
        match self {
            AccumulatorState::Sum(total) => {
                if let Some(Value::Number(n)) = value {
                    *total += n;
                }
            }
            AccumulatorState::Avg { sum, count } => {
                if let Some(Value::Number(n)) = value {
                    *sum += n;
                    *count += 1;
                }
            }
            AccumulatorState::Extremum { best, keep } => match value {
                None | Some(Value::Null) => {}
                Some(value) => {
                    let replace = match best {
                        None => true,
                        Some(current) => compare_values(&value, current) == *keep,
                    };
                    if replace {
                        *best = Some(value);
                    }
                }
            },
            AccumulatorState::First(first) => {
                if first.is_none() {
                    *first = Some(value.unwrap_or(Value::Null));
                }
            }
            AccumulatorState::Last(last) => *last = value.unwrap_or(Value::Null),
            AccumulatorState::Push(values) => {
                if let Some(value) = value {
                    values.push(value);
                }
            }
            AccumulatorState::AddToSet(values) => {
                if let Some(value) = value {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
            }
        }
    }

    pub(crate) fn finish(self) -> Value {
        match self {
            AccumulatorState::Sum(total) => Value::Number(total),
            AccumulatorState::Avg { sum, count } => {
                if count == 0 {
                    Value::Null
                } else {
                    Value::Number(sum / count as f64)
                }
            }
            AccumulatorState::Extremum { best, .. } => best.unwrap_or(Value::Null),
            AccumulatorState::First(first) => first.unwrap_or(Value::Null),
            AccumulatorState::Last(last) => last,
            AccumulatorState::Push(values) | AccumulatorState::AddToSet(values) => {
                Value::Array(values)
            }
        }
    }
}
