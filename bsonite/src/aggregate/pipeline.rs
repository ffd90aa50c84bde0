use std::fmt::Display;

use itertools::Itertools;

use crate::collection::Document;
use crate::common::Value;
use crate::errors::BsoniteResult;

use super::stage::Stage;

/// A validated aggregation pipeline.
///
/// Every stage is parsed before any document flows, so an unknown stage or a
/// malformed expression anywhere in the pipeline fails without partial
/// results.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::aggregate::Pipeline;
/// use bsonite::{doc, val};
///
/// let pipeline = Pipeline::parse(&[
///     val!(doc!{ "$match": { status: "A" } }),
///     val!(doc!{ "$group": { _id: "$cust", total: { "$sum": "$amount" } } }),
/// ])?;
/// let results = pipeline.run(documents)?;
/// ```
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn parse(stages: &[Value]) -> BsoniteResult<Pipeline> {
        let stages = stages
            .iter()
            .enumerate()
            .map(|(index, stage)| Stage::parse(index, stage))
            .collect::<BsoniteResult<Vec<_>>>()?;
        Ok(Pipeline { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the stages in order over `docs`.
    pub fn run(&self, docs: Vec<Document>) -> BsoniteResult<Vec<Document>> {
        let mut current = docs;
        for stage in &self.stages {
            log::trace!("Running {} over {} documents", stage, current.len());
            current = stage.run(current)?;
        }
        Ok(current)
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.stages.iter().join(" | "))
    }
}

/// Parses `stages` and runs them over `docs`.
pub fn aggregate(docs: Vec<Document>, stages: &[Value]) -> BsoniteResult<Vec<Document>> {
    Pipeline::parse(stages)?.run(docs)
}
