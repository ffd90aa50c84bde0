use std::fmt::Display;

use crate::collection::{Document, FieldPath};
use crate::common::Value;
use crate::errors::BsoniteResult;

use super::condition::Condition;
use super::{FilterProvider, MatchContext};

/// A filter that matches all documents. Parsed from an empty query.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> BsoniteResult<bool> {
        Ok(true)
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// A field expression: a dotted path plus the conditions its value must meet.
///
/// The path is resolved into a [MatchContext] once per document and every
/// condition is evaluated against it.
pub(crate) struct FieldFilter {
    path: FieldPath,
    conditions: Vec<Condition>,
}

impl FieldFilter {
    pub(crate) fn parse(field: &str, expression: &Value) -> BsoniteResult<Self> {
        Ok(FieldFilter {
            path: FieldPath::parse(field),
            conditions: Condition::parse_expression(field, expression)?,
        })
    }
}

impl Display for FieldFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let conditions: Vec<String> = self
            .conditions
            .iter()
            .map(|condition| format!("{} {}", self.path, condition))
            .collect();
        write!(f, "({})", conditions.join(" && "))
    }
}

impl FilterProvider for FieldFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> BsoniteResult<bool> {
        let ctx = MatchContext::resolve(entry, &self.path);
        Ok(self.conditions.iter().all(|condition| condition.matches(&ctx)))
    }
}
