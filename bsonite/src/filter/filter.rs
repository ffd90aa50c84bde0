use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use crate::collection::Document;
use crate::common::Value;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

use super::basic_filters::{AllFilter, FieldFilter};
use super::logical_filters::{AndFilter, NorFilter, OrFilter};

/// Trait for implementing filters.
///
/// A `FilterProvider` decides whether a document matches. Providers are built
/// once by [Filter::parse] and then applied to every candidate document.
pub trait FilterProvider: Send + Sync + Display {
    /// Applies the filter to a document and returns whether it matches.
    ///
    /// # Arguments
    ///
    /// * `entry` - The document to evaluate
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the document matches the filter, `Ok(false)` otherwise
    fn apply(&self, entry: &Document) -> BsoniteResult<bool>;
}

/// A query filter for selecting documents from a collection.
///
/// A `Filter` is the parsed, typed form of a query document. Parsing validates
/// the whole query up front, so a malformed query fails before any document is
/// looked at.
///
/// # Query grammar
///
/// * `{field: value}` - implicit equality (a regex literal is an implicit `$regex`)
/// * `{field: {$op: operand, ...}}` - operator conditions, ANDed together
/// * `{$and: [...]}`, `{$or: [...]}`, `{$nor: [...]}` - logical combinations
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::doc;
/// use bsonite::filter::Filter;
///
/// let filter = Filter::parse(&doc!{ age: { "$gte": 18 }, "$or": [{ a: 1 }, { b: 2 }] })?;
/// assert!(filter.apply(&doc!{ age: 20, b: 2 })?);
/// ```
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    /// Creates a new filter from a filter provider implementation.
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter {
            inner: Arc::new(inner),
        }
    }

    /// Parses a query document into a filter.
    ///
    /// Top-level `$` keys must be `$and`, `$or` or `$nor` with an array of
    /// documents. Every other key is a field expression.
    pub fn parse(query: &Document) -> BsoniteResult<Filter> {
        let mut filters = Vec::with_capacity(query.size());
        for (key, value) in query.iter() {
            let filter = match key.as_str() {
                "$and" => and(parse_branches(key, value)?),
                "$or" => or(parse_branches(key, value)?),
                "$nor" => nor(parse_branches(key, value)?),
                operator if operator.starts_with('$') => {
                    log::error!("Unknown top level query operator {}", operator);
                    return Err(BsoniteError::new(
                        &format!("unknown top level operator: {}", operator),
                        ErrorKind::BadValue,
                    ));
                }
                field => Filter::new(FieldFilter::parse(field, value)?),
            };
            filters.push(filter);
        }

        Ok(match filters.len() {
            0 => all(),
            1 => filters.remove(0),
            _ => and(filters),
        })
    }

    /// Combines this filter with another using logical AND.
    pub fn and(&self, filter: Filter) -> Self {
        and(vec![self.clone(), filter])
    }

    /// Combines this filter with another using logical OR.
    pub fn or(&self, filter: Filter) -> Self {
        or(vec![self.clone(), filter])
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

fn parse_branches(operator: &str, value: &Value) -> BsoniteResult<Vec<Filter>> {
    let Value::Array(branches) = value else {
        log::error!("{} given {} instead of an array", operator, value.type_name());
        return Err(BsoniteError::new(
            &format!("{} must be an array", operator),
            ErrorKind::BadValue,
        ));
    };

    branches
        .iter()
        .map(|branch| match branch {
            Value::Document(query) => Filter::parse(query),
            other => {
                log::error!("{} entry is {} instead of a document", operator, other.type_name());
                Err(BsoniteError::new(
                    &format!("{} entries need to be full objects", operator),
                    ErrorKind::BadValue,
                ))
            }
        })
        .collect()
}

/// Creates a filter that matches all documents.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}

/// Combines multiple filters using logical AND. An empty list matches everything.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Combines multiple filters using logical OR. An empty list matches nothing.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

/// Matches documents that match none of the filters.
pub fn nor(filters: Vec<Filter>) -> Filter {
    Filter::new(NorFilter::new(filters))
}

/// Parses `query` and evaluates it against `doc`.
pub fn matches(doc: &Document, query: &Document) -> BsoniteResult<bool> {
    Filter::parse(query)?.apply(doc)
}
