use crate::collection::Document;
use crate::common::{Value, DOC_ID};
use crate::errors::BsoniteResult;

use super::accumulator::{Accumulator, AccumulatorState};
use super::expression::Expression;
use super::pipeline_error;

/// A parsed `$group` stage.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GroupStage {
    id: Expression,
    accumulators: Vec<Accumulator>,
}

impl GroupStage {
    pub(crate) fn parse(spec: &Value) -> BsoniteResult<GroupStage> {
        let Value::Document(spec) = spec else {
            return Err(pipeline_error(
                15947,
                "a group's fields must be specified in an object".to_string(),
            ));
        };

        let Some(id) = spec.get(DOC_ID) else {
            return Err(pipeline_error(
                15955,
                "a group specification must include an _id".to_string(),
            ));
        };
        let id = Expression::parse(id)?;

        let mut accumulators = Vec::with_capacity(spec.size());
        for (field, accumulator) in spec.iter().filter(|(field, _)| *field != DOC_ID) {
            if field.contains('.') {
                return Err(pipeline_error(
                    16414,
                    format!(
                        "the group aggregate field name '{}' cannot be used because $group's field names cannot contain '.'",
                        field
                    ),
                ));
            }
            accumulators.push(Accumulator::parse(field, accumulator)?);
        }

        Ok(GroupStage { id, accumulators })
    }

    /// Buckets `docs` by the evaluated `_id`, in first-seen order.
    ///
    /// Keys are compared as values, so `1` and `"1"` land in different groups.
    pub(crate) fn run(&self, docs: Vec<Document>) -> BsoniteResult<Vec<Document>> {
        let mut groups: Vec<(Value, Vec<AccumulatorState>)> = Vec::new();

        for doc in &docs {
            let key = self.id.evaluate(doc)?;
            let position = match groups.iter().position(|(existing, _)| *existing == key) {
                Some(position) => position,
                None => {
                    let states = self.accumulators.iter().map(Accumulator::new_state).collect();
                    groups.push((key, states));
                    groups.len() - 1
                }
            };

            let (_, states) = &mut groups[position];
            for (accumulator, state) in self.accumulators.iter().zip(states.iter_mut()) {
                accumulator.accumulate(state, doc)?;
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, states)| {
                let mut result = Document::new();
                result.put(DOC_ID, key);
                for (accumulator, state) in self.accumulators.iter().zip(states) {
                    result.put(accumulator.field(), state.finish());
                }
                result
            })
            .collect())
    }
}
