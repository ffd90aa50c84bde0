use crate::collection::Document;

/// Options for controlling find operations on documents.
///
/// `FindOptions` carries the return-field selector and the paging window of a
/// query. Skip is applied before limit, and projection last.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::collection::{skip_by, FindOptions};
/// use bsonite::doc;
///
/// let options = FindOptions::new()
///     .projection(doc!{ name: 1 })
///     .skip(10)
///     .limit(20);
///
/// let options = skip_by(5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub(crate) projection: Option<Document>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that limits the number of results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

/// Creates `FindOptions` that projects results with `spec`.
pub fn project(spec: Document) -> FindOptions {
    FindOptions::new().projection(spec)
}

impl FindOptions {
    /// Creates a new `FindOptions` with default settings.
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to return. Zero means no limit.
    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    /// Sets the projection applied to each returned document.
    pub fn projection(mut self, spec: Document) -> FindOptions {
        self.projection = Some(spec);
        self
    }

    pub fn get_skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_projection(&self) -> Option<&Document> {
        self.projection.as_ref()
    }
}
