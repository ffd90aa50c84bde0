use std::fmt::Display;

use crate::{collection::Document, errors::BsoniteResult};

use super::{Filter, FilterProvider};

fn join(filters: &[Filter], separator: &str) -> String {
    let mut joined = String::with_capacity(filters.len() * 16);
    for (i, filter) in filters.iter().enumerate() {
        joined.push_str(&format!("{}", filter));
        if i < filters.len() - 1 {
            joined.push_str(separator);
        }
    }
    joined
}

/// A filter that applies logical AND operation on multiple filters.
///
/// Evaluation short-circuits on the first failing filter. An empty AND matches
/// every document.
pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join(&self.filters, " && "))
    }
}

impl FilterProvider for AndFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> BsoniteResult<bool> {
        for filter in &self.filters {
            if !filter.apply(entry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// A filter that applies logical OR operation on multiple filters.
///
/// Evaluation short-circuits on the first matching filter. An empty OR matches
/// nothing.
pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join(&self.filters, " || "))
    }
}

impl FilterProvider for OrFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> BsoniteResult<bool> {
        for filter in &self.filters {
            if filter.apply(entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A filter that matches documents matching none of its filters.
pub(crate) struct NorFilter {
    inner: OrFilter,
}

impl NorFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        NorFilter {
            inner: OrFilter::new(filters),
        }
    }
}

impl Display for NorFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "!{}", self.inner)
    }
}

impl FilterProvider for NorFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> BsoniteResult<bool> {
        Ok(!self.inner.apply(entry)?)
    }
}
