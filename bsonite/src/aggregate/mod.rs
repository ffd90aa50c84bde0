//! The aggregation pipeline.
//!
//! Supported stages are `$match`, `$group`, `$project`, `$sort`, `$skip` and
//! `$limit`. `$group` evaluates expressions (`$ifNull`, comparisons, `$cmp`,
//! `$size`, `$cond`, object expressions) and the accumulators `$sum`, `$avg`,
//! `$min`, `$max`, `$first`, `$last`, `$push` and `$addToSet`.
//!
//! Structural errors carry the numeric codes drivers expect, see
//! [crate::errors::BsoniteError::code].

mod accumulator;
mod expression;
mod group;
mod pipeline;
mod stage;

pub use pipeline::{aggregate, Pipeline};

use crate::errors::{BsoniteError, ErrorKind};

/// Logs and builds a structural pipeline error with its driver code.
pub(crate) fn pipeline_error(code: i32, message: String) -> BsoniteError {
    log::error!("Invalid aggregation ({}): {}", code, message);
    BsoniteError::new(&message, ErrorKind::PipelineError).with_code(code)
}
